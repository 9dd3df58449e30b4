//! Structural extractor.
//!
//! Two interchangeable strategies implement [`Strategy`]:
//!
//! - [`tree::TreeStrategy`] walks a [`SyntaxTree`] (precise);
//! - [`text::TextStrategy`] scans raw lines with regex patterns (heuristic).
//!
//! Both share the entity builders in this module, so a construct documented
//! the same way yields the same entity whichever strategy found it.

pub mod args;
pub mod members;
pub mod text;
pub mod tree;
pub mod visibility;

use crate::config::DocMarkers;
use crate::docstring;
use crate::error::Warning;
use crate::model::*;
use crate::syntax::stmt::{build_re, ProcedureHeader, ProcedureKind};
use crate::syntax::{NodeKind, SyntaxTree};
use args::{extract_arguments, ResultSlot};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use visibility::VisibilityContext;

static RE_PREFIX_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"\b(pure|impure|elemental|recursive|non_recursive|module)\b"));

/// Result of extracting one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub model: DocumentationModel,
    pub warnings: Vec<Warning>,
}

/// One way of deriving the documentation model from a source file.
pub trait Strategy {
    fn extract(&self, markers: &DocMarkers) -> Extraction;
}

/// Extract with the tree strategy when a tree is supplied, else with the
/// line-pattern strategy.
pub fn extract(source: &str, tree: Option<&SyntaxTree>, markers: &DocMarkers) -> Extraction {
    match tree {
        Some(tree) => tree::TreeStrategy::new(tree, source).extract(markers),
        None => text::TextStrategy::new(source).extract(markers),
    }
}

/// Parse `source` with the bundled front-end and walk the resulting tree.
pub fn extract_source(source: &str, markers: &DocMarkers) -> Extraction {
    let tree = SyntaxTree::parse(source);
    extract(source, Some(&tree), markers)
}

/// Construct kinds the extractor dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    Module,
    Submodule,
    Procedure(ProcedureKind),
    DerivedType,
    /// Main program: no entity, but its internal procedures are extracted
    Program,
    Other,
}

impl Construct {
    pub fn of(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Module => Construct::Module,
            NodeKind::Submodule => Construct::Submodule,
            NodeKind::Subroutine => Construct::Procedure(ProcedureKind::Subroutine),
            NodeKind::Function => Construct::Procedure(ProcedureKind::Function),
            NodeKind::DerivedType => Construct::DerivedType,
            NodeKind::Program => Construct::Program,
            _ => Construct::Other,
        }
    }
}

/// A declaration statement together with the comments around it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclSite<'a> {
    pub code: &'a str,
    pub line: usize,
    /// Comment lines immediately before the statement
    pub leading: Vec<&'a str>,
    /// Inline comment, then comment lines immediately after the statement
    pub trailing: Vec<&'a str>,
}

impl DeclSite<'_> {
    pub fn doc(&self, markers: &DocMarkers) -> Option<String> {
        doc_for(&self.leading, &self.trailing, markers)
    }
}

/// Resolve a construct's docstring from the comments before and after it.
///
/// Only the run of pre-doc lines closing the leading block counts; earlier
/// lines in that block are the previous statement's trailing doc.
pub fn doc_for(leading: &[&str], trailing: &[&str], markers: &DocMarkers) -> Option<String> {
    let start = leading
        .iter()
        .rposition(|l| docstring::strip_marker(l, markers.leading()).is_none())
        .map_or(0, |i| i + 1);
    docstring::concat(
        docstring::resolve_any(&leading[start..], markers.leading()),
        docstring::resolve_any(trailing, markers.trailing()),
    )
}

/// `pure`, `elemental` and `recursive` keywords in a procedure prefix.
pub fn proc_attributes(prefix: &str) -> BTreeSet<ProcAttribute> {
    let words: Vec<String> = prefix
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .map(str::to_ascii_lowercase)
        .collect();
    ProcAttribute::ALL
        .into_iter()
        .filter(|attr| words.iter().any(|w| w == attr.as_str()))
        .collect()
}

/// Type spec carried by a function prefix, e.g. `real(kind=8)` in
/// `pure real(kind=8) function f(x)`.
pub fn prefix_type(prefix: &str) -> Option<String> {
    let rest = RE_PREFIX_KEYWORD.replace_all(prefix, "");
    let rest = rest.split_whitespace().collect::<Vec<_>>().join(" ");
    (!rest.is_empty()).then_some(rest)
}

/// Append-only sink for entities and warnings of one extraction pass.
#[derive(Debug, Default)]
pub(crate) struct Collector {
    model: DocumentationModel,
    warnings: Vec<Warning>,
}

impl Collector {
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    pub fn warn_all(&mut self, warnings: Vec<Warning>) {
        for w in warnings {
            self.warn(w);
        }
    }

    pub fn module(&mut self, entity: ModuleEntity) {
        tracing::debug!(name = %entity.name, "module");
        self.model.modules.push(entity);
    }

    pub fn submodule(&mut self, entity: SubmoduleEntity) {
        tracing::debug!(name = %entity.name, parent = %entity.parent, "submodule");
        self.model.submodules.push(entity);
    }

    pub fn procedure(&mut self, kind: ProcedureKind, entity: ProcedureEntity) {
        tracing::debug!(name = %entity.name, kind = kind.as_str(), args = entity.args.len(), "procedure");
        match kind {
            ProcedureKind::Subroutine => self.model.subroutines.push(entity),
            ProcedureKind::Function => self.model.functions.push(entity),
        }
    }

    pub fn derived_type(&mut self, entity: DerivedTypeEntity) {
        tracing::debug!(name = %entity.name, members = entity.members.len(), "derived type");
        self.model.types.push(entity);
    }

    pub fn finish(self) -> Extraction {
        Extraction {
            model: self.model,
            warnings: self.warnings,
        }
    }
}

/// Build a procedure entity from its header and specification declarations.
///
/// The header's name must already be checked by the caller.
pub(crate) fn build_procedure(
    header: &ProcedureHeader,
    name: &str,
    doc: Option<String>,
    declarations: &[DeclSite<'_>],
    ctx: Option<&VisibilityContext>,
    markers: &DocMarkers,
) -> ProcedureEntity {
    let (result, slot) = match header.kind {
        ProcedureKind::Subroutine => (None, None),
        ProcedureKind::Function => match &header.result {
            Some(var) => (
                Some(ResultSpec::Variable(var.clone())),
                Some(ResultSlot {
                    name: var.clone(),
                    prefix_type: prefix_type(&header.prefix),
                }),
            ),
            None => (
                Some(ResultSpec::SelfNamed),
                Some(ResultSlot {
                    name: name.to_string(),
                    prefix_type: prefix_type(&header.prefix),
                }),
            ),
        },
    };

    ProcedureEntity {
        name: name.to_string(),
        doc,
        args: extract_arguments(declarations, &header.args, slot.as_ref(), markers),
        attributes: proc_attributes(&header.prefix),
        visibility: ctx.map_or(Visibility::Public, |c| c.lookup(name)),
        result,
    }
}

/// Build a derived-type entity from its header attributes and body.
pub(crate) fn build_type(
    name: &str,
    attributes: &[String],
    doc: Option<String>,
    body: &[DeclSite<'_>],
    ctx: Option<&VisibilityContext>,
    markers: &DocMarkers,
) -> DerivedTypeEntity {
    let (members, procedures) = members::extract_members(body, markers);
    let visibility = attributes
        .iter()
        .find_map(|a| Visibility::from_keyword(a.trim()))
        .unwrap_or_else(|| ctx.map_or(Visibility::Public, |c| c.lookup(name)));
    DerivedTypeEntity {
        name: name.to_string(),
        doc,
        members,
        procedures,
        visibility,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_by_keyword_presence() {
        let attrs = proc_attributes("Pure Elemental");
        assert!(attrs.contains(&ProcAttribute::Pure));
        assert!(attrs.contains(&ProcAttribute::Elemental));
        assert!(!attrs.contains(&ProcAttribute::Recursive));
        assert_eq!(
            proc_attributes("recursive real(8)").into_iter().collect::<Vec<_>>(),
            [ProcAttribute::Recursive]
        );
    }

    #[test]
    fn impure_is_not_pure() {
        assert!(proc_attributes("impure elemental")
            .iter()
            .all(|a| *a != ProcAttribute::Pure));
    }

    #[test]
    fn prefix_type_strips_keywords() {
        assert_eq!(prefix_type("pure real(kind=8)").as_deref(), Some("real(kind=8)"));
        assert_eq!(prefix_type("elemental"), None);
        assert_eq!(prefix_type("module integer").as_deref(), Some("integer"));
        assert_eq!(prefix_type(""), None);
    }

    #[test]
    fn construct_dispatch_is_closed() {
        assert_eq!(Construct::of(NodeKind::Function), Construct::Procedure(ProcedureKind::Function));
        assert_eq!(Construct::of(NodeKind::Interface), Construct::Other);
        assert_eq!(Construct::of(NodeKind::Declaration), Construct::Other);
    }

    #[test]
    fn leading_and_trailing_docs_combine_with_variants() {
        let markers = DocMarkers::from_variants(&["!", "*", ">", "|"]).unwrap();
        let doc = doc_for(&["!> before"], &["!! after"], &markers);
        assert_eq!(doc.as_deref(), Some("before\n\nafter"));
        let doc = doc_for(&["!> before"], &["!> not trailing"], &markers);
        assert_eq!(doc.as_deref(), Some("before"));
    }

    #[test]
    fn leading_doc_is_the_final_pre_doc_run() {
        let markers = DocMarkers::from_variants(&["!", "*", ">", "|"]).unwrap();
        let doc = doc_for(&["!! previous trailing", "!> mine", "!| too"], &[], &markers);
        assert_eq!(doc.as_deref(), Some("mine too"));
        let doc = doc_for(&["!> orphan", "! plain"], &[], &markers);
        assert_eq!(doc, None);
    }

    #[test]
    fn single_marker_ignores_leading_block() {
        let doc = doc_for(&["!> before"], &[], &DocMarkers::default());
        assert_eq!(doc, None);
    }
}
