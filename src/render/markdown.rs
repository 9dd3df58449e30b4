//! GitHub-flavored markdown renderer.
//!
//! One page per source file: title, index, then a section per entity kind
//! (modules, submodules, subroutines, functions, derived types).

use crate::model::*;
use crate::render::Renderer;
use crate::toc::{self, Anchors};
use anyhow::Result;

pub struct MarkdownRenderer;

/// Shown for an argument without a docstring.
const NO_DESCRIPTION_TEXT: &str = "No description provided.";

impl Renderer for MarkdownRenderer {
    fn render(&self, model: &DocumentationModel) -> Result<String> {
        let mut output = String::from("# Fortran API Documentation\n\n");
        let mut anchors = Anchors::default();

        let headings: Vec<&str> = model
            .modules
            .iter()
            .map(|m| m.name.as_str())
            .chain(model.submodules.iter().map(|s| s.name.as_str()))
            .chain(model.subroutines.iter().map(|p| p.name.as_str()))
            .chain(model.functions.iter().map(|p| p.name.as_str()))
            .chain(model.types.iter().map(|t| t.name.as_str()))
            .collect();
        if !headings.is_empty() {
            output.push_str("## Index\n\n");
            for name in headings {
                output.push_str(&toc::render_toc_item(name, &anchors.next(name)));
                output.push('\n');
            }
            output.push('\n');
        }

        render_section(&mut output, "Modules", &model.modules, render_module);
        render_section(&mut output, "Submodules", &model.submodules, render_submodule);
        render_section(&mut output, "Subroutines", &model.subroutines, render_procedure);
        render_section(&mut output, "Functions", &model.functions, render_procedure);
        render_section(&mut output, "Derived Types", &model.types, render_type);

        Ok(output)
    }

    fn file_extension(&self) -> &str {
        "md"
    }
}

fn render_section<T>(output: &mut String, title: &str, items: &[T], render: fn(&T) -> String) {
    if items.is_empty() {
        return;
    }
    output.push_str(&format!("## {}\n\n", title));
    for item in items {
        output.push_str(&render(item));
        output.push('\n');
    }
}

fn render_module(module: &ModuleEntity) -> String {
    let mut lines: Vec<String> = vec![format!("### {}\n", module.name)];

    if module.default_visibility == Visibility::Private {
        lines.push("> `private` by default\n".to_string());
    }
    push_doc(&mut lines, module.doc.as_deref());

    if !module.public_names.is_empty() {
        lines.push(format!("**Public:** {}\n", code_list(&module.public_names)));
    }
    if !module.private_names.is_empty() {
        lines.push(format!("**Private:** {}\n", code_list(&module.private_names)));
    }

    lines.join("\n")
}

fn render_submodule(submodule: &SubmoduleEntity) -> String {
    let mut lines: Vec<String> = vec![format!("### {}\n", submodule.name)];
    let parent = match &submodule.ancestor {
        Some(ancestor) => format!("{}:{}", ancestor, submodule.parent),
        None => submodule.parent.clone(),
    };
    lines.push(format!("> submodule of `{}`\n", parent));
    push_doc(&mut lines, submodule.doc.as_deref());
    lines.join("\n")
}

/// Render a subroutine or function documentation block.
fn render_procedure(proc: &ProcedureEntity) -> String {
    let mut lines: Vec<String> = vec![format!("### {}\n", proc.name)];

    let badges = render_badges(
        proc.attributes.iter().map(|a| a.as_str()),
        proc.visibility,
    );
    if !badges.is_empty() {
        lines.push(badges);
        lines.push(String::new());
    }

    push_doc(&mut lines, proc.doc.as_deref());

    let result = proc.result_name();
    let (results, args): (Vec<&Argument>, Vec<&Argument>) = proc
        .args
        .iter()
        .partition(|a| result.is_some_and(|r| a.name.eq_ignore_ascii_case(r)));

    if !args.is_empty() {
        lines.push("#### Arguments\n".to_string());
        for arg in args {
            lines.push(format!("* {}", render_arg(arg)));
        }
        lines.push(String::new());
    }

    if let Some(arg) = results.first() {
        lines.push("#### Returns\n".to_string());
        lines.push(format!("* {}", render_arg(arg)));
        lines.push(String::new());
    }

    lines.join("\n")
}

fn render_type(ty: &DerivedTypeEntity) -> String {
    let mut lines: Vec<String> = vec![format!("### {}\n", ty.name)];

    let badges = render_badges(std::iter::empty(), ty.visibility);
    if !badges.is_empty() {
        lines.push(badges);
        lines.push(String::new());
    }

    push_doc(&mut lines, ty.doc.as_deref());

    if !ty.members.is_empty() {
        lines.push("#### Members\n".to_string());
        for member in &ty.members {
            let mut item = format!("* **{}** ({})", member.name, member.attributes);
            if let Some(doc) = &member.doc {
                item.push_str(": ");
                item.push_str(&indent_continuation(doc));
            }
            lines.push(item);
        }
        lines.push(String::new());
    }

    if !ty.procedures.is_empty() {
        lines.push("#### Type-bound procedures\n".to_string());
        for binding in &ty.procedures {
            let mut item = format!("* **{}** ({})", binding.name, binding.attributes);
            if let Some(target) = &binding.target {
                item.push_str(&format!(" → `{}`", target));
            }
            lines.push(item);
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

fn push_doc(lines: &mut Vec<String>, doc: Option<&str>) {
    if let Some(doc) = doc {
        lines.push(doc.to_string());
        lines.push(String::new());
    }
}

/// `**name** (attributes): description`
fn render_arg(arg: &Argument) -> String {
    let description = if arg.info.is_documented() {
        indent_continuation(&arg.info.description)
    } else {
        NO_DESCRIPTION_TEXT.to_string()
    };
    if arg.info.attributes.is_empty() {
        format!("**{}**: {}", arg.name, description)
    } else {
        format!("**{}** ({}): {}", arg.name, arg.info.attributes, description)
    }
}

/// Badges for procedure attributes and non-default visibility.
///
/// Output: `> `pure` `elemental` *`private`*`
fn render_badges<'a>(attributes: impl Iterator<Item = &'a str>, visibility: Visibility) -> String {
    let mut badges: Vec<String> = attributes.map(|a| format!("`{}`", a)).collect();
    if visibility == Visibility::Private {
        badges.push("*`private`*".to_string());
    }
    if badges.is_empty() {
        return String::new();
    }
    format!("> {}", badges.join(" "))
}

/// Keep paragraph breaks inside a list item.
fn indent_continuation(text: &str) -> String {
    text.replace("\n\n", "\n\n  ")
}

fn code_list<'a>(names: impl IntoIterator<Item = &'a String>) -> String {
    names
        .into_iter()
        .map(|n| format!("`{}`", n))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn arg(name: &str, description: &str, attributes: &str) -> Argument {
        Argument {
            name: name.into(),
            info: ArgumentInfo {
                description: description.into(),
                attributes: attributes.into(),
            },
        }
    }

    fn function() -> ProcedureEntity {
        ProcedureEntity {
            name: "multiply_reals".into(),
            doc: Some("Multiplies two real numbers".into()),
            args: vec![
                arg("x", "The first real number", "real, intent(in)"),
                arg("y", NO_DESCRIPTION, "real, intent(in)"),
                arg("res", "The product", "real"),
            ],
            attributes: BTreeSet::from([ProcAttribute::Elemental]),
            visibility: Visibility::Public,
            result: Some(ResultSpec::Variable("res".into())),
        }
    }

    #[test]
    fn procedure_block() {
        let out = render_procedure(&function());
        assert!(out.starts_with("### multiply_reals\n"));
        assert!(out.contains("> `elemental`"));
        assert!(out.contains("* **x** (real, intent(in)): The first real number"));
        assert!(out.contains("* **y** (real, intent(in)): No description provided."));
        assert!(out.contains("#### Returns\n\n* **res** (real): The product"));
        assert!(!out.contains("#### Arguments\n\n* **res**"));
    }

    #[test]
    fn private_badge() {
        let mut proc = function();
        proc.attributes.clear();
        proc.visibility = Visibility::Private;
        assert!(render_procedure(&proc).contains("> *`private`*"));
    }

    #[test]
    fn page_has_index_and_sections() {
        let model = DocumentationModel {
            modules: vec![ModuleEntity {
                name: "math_utils".into(),
                doc: Some("Utilities".into()),
                default_visibility: Visibility::Public,
                public_names: BTreeSet::new(),
                private_names: BTreeSet::new(),
            }],
            functions: vec![function()],
            ..Default::default()
        };
        let out = MarkdownRenderer.render(&model).unwrap();
        assert!(out.starts_with("# Fortran API Documentation\n\n## Index\n\n"));
        assert!(out.contains("* [math_utils](#math_utils)\n* [multiply_reals](#multiply_reals)\n"));
        assert!(out.contains("## Modules\n\n### math_utils\n\nUtilities\n"));
        assert!(out.contains("## Functions\n\n### multiply_reals"));
        assert!(!out.contains("## Subroutines"));
    }

    #[test]
    fn type_members_and_bindings() {
        let ty = DerivedTypeEntity {
            name: "circle".into(),
            doc: None,
            members: vec![MemberInfo {
                name: "radius".into(),
                attributes: "real".into(),
                doc: Some("Radius".into()),
            }],
            procedures: vec![ProcedureRef {
                name: "area".into(),
                attributes: "procedure, pass(self)".into(),
                target: Some("circle_area".into()),
            }],
            visibility: Visibility::Public,
        };
        let out = render_type(&ty);
        assert!(out.contains("* **radius** (real): Radius"));
        assert!(out.contains("* **area** (procedure, pass(self)) → `circle_area`"));
    }

    #[test]
    fn multi_paragraph_description_stays_in_list_item() {
        let a = arg("n", "first\n\nsecond", "integer, intent(in)");
        assert_eq!(render_arg(&a), "**n** (integer, intent(in)): first\n\n  second");
    }
}
