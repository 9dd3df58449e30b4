//! Line-pattern strategy.
//!
//! A single forward pass over logical lines with a stack of open scopes.
//! No tree is built: procedure and type entities are emitted when their
//! scope closes (or, for procedures, at their `contains`), and declarations
//! are collected by rescanning the lines the scope spanned.

use super::visibility::VisibilityContext;
use super::{build_procedure, build_type, doc_for, Collector, DeclSite, Extraction, Strategy};
use crate::config::DocMarkers;
use crate::error::Warning;
use crate::model::SubmoduleEntity;
use crate::syntax::lines::{logical_lines, LogicalLine};
use crate::syntax::stmt::{self, AccessStmt, EndKind, ProcedureHeader, Statement};
use std::ops::Range;

pub struct TextStrategy<'a> {
    source: &'a str,
}

impl<'a> TextStrategy<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }
}

impl Strategy for TextStrategy<'_> {
    fn extract(&self, markers: &DocMarkers) -> Extraction {
        let lines = logical_lines(self.source);
        let mut scanner = Scanner {
            lines: &lines,
            markers,
            stack: Vec::new(),
            out: Collector::default(),
        };
        scanner.run();
        scanner.out.finish()
    }
}

struct OpenProcedure {
    header: ProcedureHeader,
    name: String,
    doc: Option<String>,
    /// Index of the first line after the header
    start: usize,
}

struct OpenType {
    name: String,
    attributes: Vec<String>,
    doc: Option<String>,
    start: usize,
}

enum Frame {
    Module(VisibilityContext),
    Submodule,
    /// Main program
    Unit,
    /// `None` once the entity has been emitted at `contains`
    Procedure(Option<OpenProcedure>),
    /// `None` for a type whose header had no name
    Type(Option<OpenType>),
    Interface,
    /// Malformed construct: nothing inside is emitted
    Skipped,
}

struct Scanner<'l, 'm> {
    lines: &'l [LogicalLine],
    markers: &'m DocMarkers,
    stack: Vec<Frame>,
    out: Collector,
}

impl<'l> Scanner<'l, '_> {
    fn run(&mut self) {
        let mut i = 0;
        while i < self.lines.len() {
            let code = self.lines[i].code.as_str();
            if code.is_empty() {
                i += 1;
                continue;
            }
            let statement = stmt::classify(code);

            match self.stack.last() {
                Some(Frame::Interface) => {
                    if statement == Statement::End(EndKind::Interface) {
                        self.stack.pop();
                    }
                    i += 1;
                    continue;
                }
                Some(Frame::Type(_)) => {
                    match statement {
                        Statement::End(EndKind::Type) => {
                            self.close(i);
                            i += 1;
                        }
                        // unterminated type: close it, then handle the `end` normally
                        Statement::End(_) => self.close(i),
                        _ => i += 1,
                    }
                    continue;
                }
                _ => {}
            }

            if self.skipping() {
                self.skipped_statement(&statement);
            } else {
                self.statement(i, statement);
            }
            i += 1;
        }

        while !self.stack.is_empty() {
            self.close(self.lines.len());
        }
    }

    fn statement(&mut self, i: usize, statement: Statement) {
        match statement {
            Statement::Module(name) => self.open_module(i, name),
            Statement::Submodule(header) => {
                let Some(name) = header.name else {
                    self.malformed("submodule", i, "missing name or parent");
                    self.stack.push(Frame::Skipped);
                    return;
                };
                let doc = self.header_doc(i);
                self.out.submodule(SubmoduleEntity {
                    name,
                    parent: header.parent,
                    ancestor: header.ancestor,
                    doc,
                });
                self.stack.push(Frame::Submodule);
            }
            Statement::Procedure(header) => {
                let Some(name) = header.name.clone() else {
                    self.malformed(header.kind.as_str(), i, "missing name");
                    self.stack.push(Frame::Skipped);
                    return;
                };
                let doc = self.header_doc(i);
                self.stack.push(Frame::Procedure(Some(OpenProcedure {
                    header,
                    name,
                    doc,
                    start: i + 1,
                })));
            }
            Statement::Program(_) => self.stack.push(Frame::Unit),
            Statement::TypeDef(header) => {
                let open = match header.name {
                    Some(name) => Some(OpenType {
                        name,
                        attributes: header.attributes,
                        doc: self.header_doc(i),
                        start: i + 1,
                    }),
                    None => {
                        self.malformed("derived type", i, "missing name");
                        None
                    }
                };
                self.stack.push(Frame::Type(open));
            }
            Statement::Interface => self.stack.push(Frame::Interface),
            Statement::Contains => {
                if let Some(Frame::Procedure(slot)) = self.stack.last_mut() {
                    if let Some(open) = slot.take() {
                        self.emit_procedure(open, i);
                    }
                }
            }
            Statement::End(_) => self.close(i),
            _ => {}
        }
    }

    /// Inside a malformed construct only scope nesting is tracked.
    fn skipped_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Module(_)
            | Statement::Submodule(_)
            | Statement::Procedure(_)
            | Statement::Program(_)
            | Statement::TypeDef(_)
            | Statement::Interface => self.stack.push(Frame::Skipped),
            Statement::End(_) => {
                self.stack.pop();
            }
            _ => {}
        }
    }

    fn open_module(&mut self, i: usize, name: Option<String>) {
        let Some(name) = name else {
            self.malformed("module", i, "missing name");
            self.stack.push(Frame::Skipped);
            return;
        };
        let doc = self.header_doc(i);
        let (ctx, warnings) = VisibilityContext::build(&name, &self.prescan_access(i + 1));
        self.out.warn_all(warnings);
        self.out.module(ctx.module_entity(&name, doc));
        self.stack.push(Frame::Module(ctx));
    }

    /// Access statements of the module specification starting at `from`.
    fn prescan_access(&self, from: usize) -> Vec<AccessStmt> {
        let mut found = Vec::new();
        let mut k = from;
        while k < self.lines.len() {
            let code = self.lines[k].code.as_str();
            k += 1;
            if code.is_empty() {
                continue;
            }
            match stmt::classify(code) {
                Statement::Access(access) => found.push(access),
                Statement::TypeDef(_) => k = self.skip_block(k, self.lines.len(), EndKind::Type),
                Statement::Interface => {
                    k = self.skip_block(k, self.lines.len(), EndKind::Interface)
                }
                Statement::Contains | Statement::End(_) => break,
                _ => {}
            }
        }
        found
    }

    /// Index just past the `end` closing a block that opened before `from`.
    fn skip_block(&self, from: usize, limit: usize, kind: EndKind) -> usize {
        for k in from..limit {
            match stmt::parse_end(&self.lines[k].code) {
                Some(end) if end == kind => return k + 1,
                // unterminated type
                Some(_) if kind == EndKind::Type => return k,
                _ => {}
            }
        }
        limit
    }

    fn close(&mut self, end: usize) {
        match self.stack.pop() {
            Some(Frame::Procedure(Some(open))) => self.emit_procedure(open, end),
            Some(Frame::Type(Some(open))) => self.emit_type(open, end),
            _ => {}
        }
    }

    fn emit_procedure(&mut self, open: OpenProcedure, end: usize) {
        let sites = self.sites(open.start..end, true, |s| {
            matches!(s, Statement::Declaration(_))
        });
        let entity = build_procedure(
            &open.header,
            &open.name,
            open.doc,
            &sites,
            self.context(),
            self.markers,
        );
        self.out.procedure(open.header.kind, entity);
    }

    fn emit_type(&mut self, open: OpenType, end: usize) {
        let sites = self.sites(open.start..end, false, |_| true);
        let entity = build_type(
            &open.name,
            &open.attributes,
            open.doc,
            &sites,
            self.context(),
            self.markers,
        );
        self.out.derived_type(entity);
    }

    /// Visibility context of the innermost enclosing module, if any.
    fn context(&self) -> Option<&VisibilityContext> {
        self.stack
            .iter()
            .rev()
            .find_map(|frame| match frame {
                Frame::Module(ctx) => Some(Some(ctx)),
                Frame::Submodule => Some(None),
                _ => None,
            })
            .flatten()
    }

    fn skipping(&self) -> bool {
        self.stack.iter().any(|f| matches!(f, Frame::Skipped))
    }

    fn malformed(&mut self, kind: &'static str, i: usize, reason: &str) {
        self.out
            .warn(Warning::malformed(kind, self.lines[i].line, reason));
    }

    /// Statements in `range` accepted by `keep`, optionally stepping over
    /// nested type definitions and interface blocks.
    fn sites(
        &self,
        range: Range<usize>,
        skip_blocks: bool,
        keep: impl Fn(&Statement) -> bool,
    ) -> Vec<DeclSite<'l>> {
        let mut sites = Vec::new();
        let mut k = range.start;
        while k < range.end {
            let code = self.lines[k].code.as_str();
            if code.is_empty() {
                k += 1;
                continue;
            }
            let statement = stmt::classify(code);
            if skip_blocks {
                let block = match statement {
                    Statement::TypeDef(_) => Some(EndKind::Type),
                    Statement::Interface => Some(EndKind::Interface),
                    _ => None,
                };
                if let Some(kind) = block {
                    k = self.skip_block(k + 1, range.end, kind);
                    continue;
                }
            }
            if keep(&statement) {
                sites.push(self.site(k));
            }
            k += 1;
        }
        sites
    }

    fn site(&self, k: usize) -> DeclSite<'l> {
        let lines: &'l [LogicalLine] = self.lines;
        let line = &lines[k];
        DeclSite {
            code: line.code.as_str(),
            line: line.line,
            leading: comments_before(lines, k),
            trailing: line
                .inline_comment()
                .into_iter()
                .chain(comments_after(lines, k, false))
                .collect(),
        }
    }

    /// Docstring of the construct whose header is line `i`.
    fn header_doc(&self, i: usize) -> Option<String> {
        let trailing: Vec<&str> = self.lines[i]
            .inline_comment()
            .into_iter()
            .chain(comments_after(self.lines, i, true))
            .collect();
        doc_for(&comments_before(self.lines, i), &trailing, self.markers)
    }
}

/// Full-line comments directly above line `k`, in source order.
fn comments_before(lines: &[LogicalLine], k: usize) -> Vec<&str> {
    let mut out: Vec<&str> = lines[..k]
        .iter()
        .rev()
        .take_while(|l| l.is_comment())
        .filter_map(|l| l.comment.as_deref())
        .collect();
    out.reverse();
    out
}

/// Full-line comments directly below line `k`, optionally past blank lines.
fn comments_after(lines: &[LogicalLine], k: usize, skip_blank: bool) -> Vec<&str> {
    lines[k + 1..]
        .iter()
        .skip_while(|l| skip_blank && l.is_blank())
        .take_while(|l| l.is_comment())
        .filter_map(|l| l.comment.as_deref())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Visibility;

    fn run(source: &str) -> Extraction {
        TextStrategy::new(source).extract(&DocMarkers::default())
    }

    #[test]
    fn module_with_internal_procedures() {
        let source = r#"
module shapes
  !> Shape helpers
  private
  public :: area

contains

  function area(r) result(a)
    !> Area of a circle
    real, intent(in) :: r !> radius
    real :: a
    a = 3.14 * r * r
  contains
    subroutine helper()
    end subroutine helper
  end function area

  subroutine hidden(x)
    integer, intent(inout) :: x
  end subroutine
end module shapes
"#;
        let result = run(source);
        assert!(result.warnings.is_empty());
        let module = &result.model.modules[0];
        assert_eq!(module.doc.as_deref(), Some("Shape helpers"));
        assert_eq!(module.default_visibility, Visibility::Private);

        let area = &result.model.functions[0];
        assert_eq!(area.doc.as_deref(), Some("Area of a circle"));
        assert_eq!(area.visibility, Visibility::Public);
        assert_eq!(area.arg("r").map(|a| a.description.as_str()), Some("radius"));
        assert_eq!(area.result_name(), Some("a"));

        let subs: Vec<(&str, Visibility)> = result
            .model
            .subroutines
            .iter()
            .map(|s| (s.name.as_str(), s.visibility))
            .collect();
        assert_eq!(
            subs,
            [("helper", Visibility::Private), ("hidden", Visibility::Private)]
        );
    }

    #[test]
    fn interface_bodies_are_not_procedures() {
        let source = "module m\n  interface\n    subroutine cb(x)\n      real, intent(in) :: x\n    end subroutine\n  end interface\nend module m\n";
        let result = run(source);
        assert!(result.model.subroutines.is_empty());
        assert_eq!(result.model.modules.len(), 1);
    }

    #[test]
    fn type_access_in_body_is_not_module_access() {
        let source = "module m\n  type :: t\n    private\n    integer :: n\n  end type\nend module\n";
        let result = run(source);
        assert_eq!(result.model.modules[0].default_visibility, Visibility::Public);
        assert_eq!(result.model.types[0].visibility, Visibility::Public);
        assert_eq!(result.model.types[0].members.len(), 1);
    }

    #[test]
    fn nameless_procedure_is_skipped_with_warning() {
        let source = "subroutine\n  integer, intent(in) :: a\ncontains\n  subroutine inner()\n  end subroutine\nend subroutine\nsubroutine ok()\nend subroutine\n";
        let result = run(source);
        let names: Vec<&str> = result.model.subroutines.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["ok"]);
        assert_eq!(result.warnings.len(), 1);
        assert!(matches!(
            result.warnings[0],
            Warning::MalformedConstruct { kind: "subroutine", line: 1, .. }
        ));
    }

    #[test]
    fn unterminated_file_still_emits() {
        let result = run("module m\ncontains\nsubroutine s(a)\ninteger, intent(in) :: a !> value\n");
        assert_eq!(result.model.subroutines.len(), 1);
        assert_eq!(
            result.model.subroutines[0].arg("a").map(|a| a.description.as_str()),
            Some("value")
        );
    }

    #[test]
    fn comment_blocks_around_line() {
        let lines = logical_lines("! a\n! b\nx = 1\n\n! c\ny = 2\n");
        assert_eq!(comments_before(&lines, 2), ["! a", "! b"]);
        assert_eq!(comments_after(&lines, 2, false), Vec::<&str>::new());
        assert_eq!(comments_after(&lines, 2, true), ["! c"]);
        assert_eq!(comments_before(&lines, 5), ["! c"]);
    }
}
