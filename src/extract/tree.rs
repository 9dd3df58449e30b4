//! Tree-walking strategy.

use super::visibility::VisibilityContext;
use super::{
    build_procedure, build_type, doc_for, Collector, Construct, DeclSite, Extraction, Strategy,
};
use crate::config::DocMarkers;
use crate::docstring::is_comment_line;
use crate::error::Warning;
use crate::model::SubmoduleEntity;
use crate::syntax::stmt::{parse_access, ProcedureHeader, ProcedureKind};
use crate::syntax::{Node, NodeKind, SyntaxTree};

pub struct TreeStrategy<'a> {
    tree: &'a SyntaxTree,
    /// Raw source lines, consulted when the tree carries no comments for a construct
    source: Vec<&'a str>,
}

impl<'a> TreeStrategy<'a> {
    pub fn new(tree: &'a SyntaxTree, source: &'a str) -> Self {
        Self {
            tree,
            source: source.lines().collect(),
        }
    }
}

impl Strategy for TreeStrategy<'_> {
    fn extract(&self, markers: &DocMarkers) -> Extraction {
        let mut walk = Walk {
            source: &self.source,
            markers,
            out: Collector::default(),
        };
        walk.children(self.tree.root(), None);
        walk.out.finish()
    }
}

struct Walk<'s, 'm> {
    source: &'s [&'s str],
    markers: &'m DocMarkers,
    out: Collector,
}

impl Walk<'_, '_> {
    fn children(&mut self, parent: &Node, ctx: Option<&VisibilityContext>) {
        let siblings = parent.children();
        for (i, node) in siblings.iter().enumerate() {
            let leading = leading_comments(&siblings[..i]);
            match Construct::of(node.kind()) {
                Construct::Module => self.module(node, &leading),
                Construct::Submodule => self.submodule(node, &leading),
                Construct::Procedure(kind) => self.procedure(node, kind, &leading, ctx),
                Construct::DerivedType => self.derived_type(node, &leading, ctx),
                Construct::Program => self.parts(node, ctx),
                Construct::Other => {}
            }
        }
    }

    /// Walk the specification and subprogram parts of a program unit.
    fn parts(&mut self, node: &Node, ctx: Option<&VisibilityContext>) {
        if let Some(spec) = node.child(NodeKind::SpecificationPart) {
            self.children(spec, ctx);
        }
        if let Some(sub) = node.child(NodeKind::SubprogramPart) {
            self.children(sub, ctx);
        }
    }

    fn module(&mut self, node: &Node, leading: &[&str]) {
        let Some(name) = node.name() else {
            self.out.warn(Warning::malformed("module", node.line(), "missing name"));
            return;
        };
        let Some(spec) = node.child(NodeKind::SpecificationPart) else {
            self.out.warn(Warning::malformed(
                "module",
                node.line(),
                format!("{name} has no specification section"),
            ));
            return;
        };

        let doc = self.doc(node, spec, leading);
        let statements: Vec<_> = spec
            .children_of(NodeKind::AccessStmt)
            .filter_map(|n| parse_access(n.text()))
            .collect();
        let (ctx, warnings) = VisibilityContext::build(name, &statements);
        self.out.warn_all(warnings);
        self.out.module(ctx.module_entity(name, doc));

        self.parts(node, Some(&ctx));
    }

    fn submodule(&mut self, node: &Node, leading: &[&str]) {
        let (Some(name), Some(parent)) = (node.name(), node.child(NodeKind::ParentName)) else {
            self.out.warn(Warning::malformed(
                "submodule",
                node.line(),
                "missing name or parent",
            ));
            return;
        };
        let Some(spec) = node.child(NodeKind::SpecificationPart) else {
            self.out.warn(Warning::malformed(
                "submodule",
                node.line(),
                format!("{name} has no specification section"),
            ));
            return;
        };

        let doc = self.doc(node, spec, leading);
        self.out.submodule(SubmoduleEntity {
            name: name.to_string(),
            parent: parent.text().to_string(),
            ancestor: node
                .child(NodeKind::AncestorName)
                .map(|n| n.text().to_string()),
            doc,
        });

        // access statements are not allowed in submodules
        self.parts(node, None);
    }

    fn procedure(
        &mut self,
        node: &Node,
        kind: ProcedureKind,
        leading: &[&str],
        ctx: Option<&VisibilityContext>,
    ) {
        let Some(name) = node.name() else {
            self.out.warn(Warning::malformed(kind.as_str(), node.line(), "missing name"));
            return;
        };
        let Some(spec) = node.child(NodeKind::SpecificationPart) else {
            self.out.warn(Warning::malformed(
                kind.as_str(),
                node.line(),
                format!("{name} has no specification section"),
            ));
            return;
        };

        let header = ProcedureHeader {
            kind,
            name: Some(name.to_string()),
            prefix: node
                .child(NodeKind::Prefix)
                .map(|n| n.text().to_string())
                .unwrap_or_default(),
            args: node
                .child(NodeKind::DummyArgList)
                .map(|list| {
                    list.children_of(NodeKind::Name)
                        .map(|n| n.text().to_string())
                        .collect()
                })
                .unwrap_or_default(),
            result: node
                .child(NodeKind::ResultName)
                .map(|n| n.text().to_string()),
        };

        let doc = self.doc(node, spec, leading);
        let sites = decl_sites(spec, |n| n.kind() == NodeKind::Declaration);
        let entity = build_procedure(&header, name, doc, &sites, ctx, self.markers);
        self.out.procedure(kind, entity);

        self.parts(node, ctx);
    }

    fn derived_type(&mut self, node: &Node, leading: &[&str], ctx: Option<&VisibilityContext>) {
        let Some(name) = node.name() else {
            self.out.warn(Warning::malformed("derived type", node.line(), "missing name"));
            return;
        };
        let Some(body) = node.child(NodeKind::Body) else {
            self.out.warn(Warning::malformed(
                "derived type",
                node.line(),
                format!("{name} has no body"),
            ));
            return;
        };

        let attributes: Vec<String> = node
            .children_of(NodeKind::Attribute)
            .map(|n| n.text().to_string())
            .collect();
        let doc = self.doc(node, body, leading);
        let sites = decl_sites(body, |n| {
            !matches!(n.kind(), NodeKind::Comment | NodeKind::Blank | NodeKind::EndStmt)
        });
        let entity = build_type(name, &attributes, doc, &sites, ctx, self.markers);
        self.out.derived_type(entity);
    }

    /// Docstring of a construct: the comment block right before it plus its
    /// header's inline comment and the first comment block of `section`.
    fn doc(&self, node: &Node, section: &Node, leading: &[&str]) -> Option<String> {
        let mut trailing: Vec<&str> = node
            .children_of(NodeKind::Comment)
            .map(Node::text)
            .collect();
        trailing.extend(
            section
                .children()
                .iter()
                .skip_while(|n| n.kind() == NodeKind::Blank)
                .take_while(|n| n.kind() == NodeKind::Comment)
                .map(Node::text),
        );
        if trailing.is_empty() {
            trailing = self.source_comments_after(node.line());
        }
        doc_for(leading, &trailing, self.markers)
    }

    /// Comment lines following 1-based `line` in the raw source.
    fn source_comments_after(&self, line: usize) -> Vec<&str> {
        if line == 0 {
            return Vec::new();
        }
        self.source
            .iter()
            .skip(line)
            .take_while(|l| is_comment_line(l))
            .copied()
            .collect()
    }
}

/// Comment nodes immediately preceding the end of `siblings`, in order.
fn leading_comments(siblings: &[Node]) -> Vec<&str> {
    let start = siblings
        .iter()
        .rposition(|n| n.kind() != NodeKind::Comment)
        .map_or(0, |i| i + 1);
    siblings[start..].iter().map(Node::text).collect()
}

/// Statement sites among `section`'s children selected by `keep`, each with
/// its surrounding comment blocks.
fn decl_sites<'n>(section: &'n Node, keep: impl Fn(&Node) -> bool) -> Vec<DeclSite<'n>> {
    let children = section.children();
    children
        .iter()
        .enumerate()
        .filter(|(_, n)| keep(n))
        .map(|(i, n)| {
            let mut trailing: Vec<&str> = n.children_of(NodeKind::Comment).map(Node::text).collect();
            trailing.extend(
                children[i + 1..]
                    .iter()
                    .take_while(|c| c.kind() == NodeKind::Comment)
                    .map(Node::text),
            );
            DeclSite {
                code: n.text(),
                line: n.line(),
                leading: leading_comments(&children[..i]),
                trailing,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ResultSpec, Visibility};

    fn run(tree: &SyntaxTree, source: &str) -> Extraction {
        TreeStrategy::new(tree, source).extract(&DocMarkers::default())
    }

    #[test]
    fn procedure_without_specification_is_skipped() {
        let broken = Node::new(NodeKind::Function, "function broken(x)", 1)
            .with_child(Node::new(NodeKind::Name, "broken", 1));
        let ok = Node::new(NodeKind::Subroutine, "subroutine ok()", 3)
            .with_child(Node::new(NodeKind::Name, "ok", 3))
            .with_child(Node::new(NodeKind::SpecificationPart, "", 4));
        let tree = SyntaxTree::new(
            Node::new(NodeKind::File, "", 0)
                .with_child(broken)
                .with_child(ok),
        );

        let result = run(&tree, "");
        assert!(result.model.functions.is_empty());
        assert_eq!(result.model.subroutines.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(matches!(
            result.warnings[0],
            Warning::MalformedConstruct { kind: "function", line: 1, .. }
        ));
    }

    #[test]
    fn falls_back_to_source_comments() {
        let source = "module m\n  !> From the source text\nend module m\n";
        let module = Node::new(NodeKind::Module, "module m", 1)
            .with_child(Node::new(NodeKind::Name, "m", 1))
            .with_child(Node::new(NodeKind::SpecificationPart, "", 2));
        let tree = SyntaxTree::new(Node::new(NodeKind::File, "", 0).with_child(module));

        let result = run(&tree, source);
        assert_eq!(
            result.model.modules[0].doc.as_deref(),
            Some("From the source text")
        );
    }

    #[test]
    fn self_named_function_result() {
        let source = "real function area(r)\n  real, intent(in) :: r !> radius\nend function\n";
        let tree = SyntaxTree::parse(source);
        let result = run(&tree, source);
        let func = &result.model.functions[0];
        assert_eq!(func.result, Some(ResultSpec::SelfNamed));
        assert_eq!(func.result_name(), Some("area"));
        assert_eq!(func.arg("area").map(|a| a.attributes.as_str()), Some("real"));
        assert_eq!(func.arg("r").map(|a| a.description.as_str()), Some("radius"));
        assert_eq!(func.visibility, Visibility::Public);
    }

    #[test]
    fn leading_comments_stop_at_statement() {
        let nodes = vec![
            Node::new(NodeKind::Comment, "!> a", 1),
            Node::new(NodeKind::Statement, "x = 1", 2),
            Node::new(NodeKind::Comment, "!> b", 3),
            Node::new(NodeKind::Comment, "!> c", 4),
        ];
        assert_eq!(leading_comments(&nodes), ["!> b", "!> c"]);
        assert!(leading_comments(&nodes[..2]).is_empty());
    }
}
