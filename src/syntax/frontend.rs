//! Statement-level front-end: logical lines → [`SyntaxTree`].
//!
//! Recursive descent over classified statements. Executable constructs are
//! not modelled; only program units, their specification / execution /
//! subprogram parts, derived types and interface blocks get structure.

use super::lines::{logical_lines, LogicalLine};
use super::stmt::{self, EndKind, ProcedureHeader, ProcedureKind, Statement, SubmoduleHeader, TypeHeader};
use super::{Node, NodeKind, SyntaxTree};

pub fn parse(source: &str) -> SyntaxTree {
    let lines = logical_lines(source);
    let mut parser = Parser { lines: &lines, pos: 0 };
    let mut root = Node::new(NodeKind::File, "", 0);
    while let Some(line) = parser.next() {
        let node = parser.top_level(line);
        root.push(node);
    }
    SyntaxTree::new(root)
}

struct Parser<'a> {
    lines: &'a [LogicalLine],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn next(&mut self) -> Option<&'a LogicalLine> {
        let line = self.lines.get(self.pos)?;
        self.pos += 1;
        Some(line)
    }

    fn peek(&self) -> Option<&'a LogicalLine> {
        self.lines.get(self.pos)
    }

    fn top_level(&mut self, line: &'a LogicalLine) -> Node {
        if line.code.is_empty() {
            return leaf(line, NodeKind::Statement);
        }
        match stmt::classify(&line.code) {
            Statement::Module(name) => self.module(line, name),
            Statement::Submodule(header) => self.submodule(line, header),
            Statement::Procedure(header) => self.procedure(line, header),
            Statement::Program(name) => self.program(line, name),
            Statement::TypeDef(header) => self.derived_type(line, header),
            Statement::Interface => self.interface(line),
            other => leaf(line, leaf_kind(&other)),
        }
    }

    fn module(&mut self, line: &'a LogicalLine, name: Option<String>) -> Node {
        let mut node = Node::new(NodeKind::Module, line.code.as_str(), line.line);
        if let Some(name) = name {
            node.push(Node::new(NodeKind::Name, name, line.line));
        }
        push_inline_comment(&mut node, line);
        self.unit_body(&mut node, false);
        node
    }

    fn submodule(&mut self, line: &'a LogicalLine, header: SubmoduleHeader) -> Node {
        let mut node = Node::new(NodeKind::Submodule, line.code.as_str(), line.line);
        if let Some(name) = header.name {
            node.push(Node::new(NodeKind::Name, name, line.line));
        }
        node.push(Node::new(NodeKind::ParentName, header.parent, line.line));
        if let Some(ancestor) = header.ancestor {
            node.push(Node::new(NodeKind::AncestorName, ancestor, line.line));
        }
        push_inline_comment(&mut node, line);
        self.unit_body(&mut node, false);
        node
    }

    fn procedure(&mut self, line: &'a LogicalLine, header: ProcedureHeader) -> Node {
        let kind = match header.kind {
            ProcedureKind::Subroutine => NodeKind::Subroutine,
            ProcedureKind::Function => NodeKind::Function,
        };
        let mut node = Node::new(kind, line.code.as_str(), line.line);
        if let Some(name) = header.name {
            node.push(Node::new(NodeKind::Name, name, line.line));
        }
        if !header.prefix.is_empty() {
            node.push(Node::new(NodeKind::Prefix, header.prefix, line.line));
        }
        if !header.args.is_empty() {
            let mut list = Node::new(NodeKind::DummyArgList, header.args.join(", "), line.line);
            for arg in header.args {
                list.push(Node::new(NodeKind::Name, arg, line.line));
            }
            node.push(list);
        }
        if let Some(result) = header.result {
            node.push(Node::new(NodeKind::ResultName, result, line.line));
        }
        push_inline_comment(&mut node, line);
        self.unit_body(&mut node, true);
        node
    }

    fn program(&mut self, line: &'a LogicalLine, name: String) -> Node {
        let mut node = Node::new(NodeKind::Program, line.code.as_str(), line.line)
            .with_child(Node::new(NodeKind::Name, name, line.line));
        push_inline_comment(&mut node, line);
        self.unit_body(&mut node, true);
        node
    }

    /// Specification part, optional execution part, optional subprogram part
    /// and the closing `end`, appended to `node`.
    fn unit_body(&mut self, node: &mut Node, executable: bool) {
        let first = self.peek().map_or(node.line(), |l| l.line);
        let mut spec = Node::new(NodeKind::SpecificationPart, "", first);
        let mut exec: Option<Node> = None;

        while let Some(line) = self.next() {
            if line.code.is_empty() {
                let target = exec.as_mut().unwrap_or(&mut spec);
                target.push(leaf(line, NodeKind::Statement));
                continue;
            }
            let statement = stmt::classify(&line.code);
            match statement {
                Statement::End(kind) if !matches!(kind, EndKind::Type | EndKind::Interface) => {
                    node.push(spec);
                    node.extend_opt(exec);
                    node.push(leaf(line, NodeKind::EndStmt));
                    return;
                }
                Statement::Contains => {
                    node.push(spec);
                    node.extend_opt(exec);
                    let (part, end) = self.subprograms(line);
                    node.push(part);
                    node.extend_opt(end);
                    return;
                }
                Statement::TypeDef(header) if exec.is_none() => {
                    let ty = self.derived_type(line, header);
                    spec.push(ty);
                }
                Statement::Interface if exec.is_none() => {
                    let iface = self.interface(line);
                    spec.push(iface);
                }
                Statement::Procedure(header) => {
                    // procedure without a preceding `contains`
                    let proc = self.procedure(line, header);
                    exec.as_mut().unwrap_or(&mut spec).push(proc);
                }
                // stays in whichever part is open
                Statement::Directive => {
                    exec.as_mut().unwrap_or(&mut spec).push(leaf(line, NodeKind::Statement));
                }
                ref s if exec.is_none() && (s.is_specification() || !executable) => {
                    spec.push(leaf(line, leaf_kind(s)));
                }
                ref s => {
                    let part = exec.get_or_insert_with(|| {
                        Node::new(NodeKind::ExecutionPart, "", line.line)
                    });
                    part.push(leaf(line, leaf_kind(s)));
                }
            }
        }

        // end of file without `end`
        node.push(spec);
        node.extend_opt(exec);
    }

    fn subprograms(&mut self, contains: &'a LogicalLine) -> (Node, Option<Node>) {
        let mut part = Node::new(NodeKind::SubprogramPart, "", contains.line)
            .with_child(leaf(contains, NodeKind::Contains));

        while let Some(line) = self.next() {
            if line.code.is_empty() {
                part.push(leaf(line, NodeKind::Statement));
                continue;
            }
            match stmt::classify(&line.code) {
                Statement::Procedure(header) => {
                    let proc = self.procedure(line, header);
                    part.push(proc);
                }
                Statement::End(_) => return (part, Some(leaf(line, NodeKind::EndStmt))),
                other => part.push(leaf(line, leaf_kind(&other))),
            }
        }
        (part, None)
    }

    fn derived_type(&mut self, line: &'a LogicalLine, header: TypeHeader) -> Node {
        let mut node = Node::new(NodeKind::DerivedType, line.code.as_str(), line.line);
        if let Some(name) = header.name {
            node.push(Node::new(NodeKind::Name, name, line.line));
        }
        for attr in header.attributes {
            node.push(Node::new(NodeKind::Attribute, attr, line.line));
        }
        push_inline_comment(&mut node, line);

        let mut body = Node::new(NodeKind::Body, "", line.line + 1);
        while let Some(next) = self.peek() {
            if next.code.is_empty() {
                self.pos += 1;
                body.push(leaf(next, NodeKind::Statement));
                continue;
            }
            match stmt::classify(&next.code) {
                Statement::End(EndKind::Type) => {
                    self.pos += 1;
                    node.push(body);
                    node.push(leaf(next, NodeKind::EndStmt));
                    return node;
                }
                // unterminated type: leave the unit's `end` to the caller
                Statement::End(_) => break,
                Statement::Contains => {
                    self.pos += 1;
                    body.push(leaf(next, NodeKind::Contains));
                }
                Statement::Declaration(_) => {
                    self.pos += 1;
                    body.push(leaf(next, NodeKind::Declaration));
                }
                _ => {
                    self.pos += 1;
                    body.push(leaf(next, NodeKind::Statement));
                }
            }
        }
        node.push(body);
        node
    }

    /// Interface blocks are kept opaque: every statement up to `end interface`
    /// becomes a flat child.
    fn interface(&mut self, line: &'a LogicalLine) -> Node {
        let mut node = Node::new(NodeKind::Interface, line.code.as_str(), line.line);
        while let Some(next) = self.next() {
            if !next.code.is_empty()
                && stmt::parse_end(&next.code) == Some(EndKind::Interface)
            {
                node.push(leaf(next, NodeKind::EndStmt));
                break;
            }
            node.push(leaf(next, NodeKind::Statement));
        }
        node
    }
}

impl Node {
    fn extend_opt(&mut self, child: Option<Node>) {
        if let Some(child) = child {
            self.push(child);
        }
    }
}

fn leaf_kind(statement: &Statement) -> NodeKind {
    match statement {
        Statement::Declaration(_) => NodeKind::Declaration,
        Statement::Access(_) => NodeKind::AccessStmt,
        Statement::Contains => NodeKind::Contains,
        Statement::End(_) => NodeKind::EndStmt,
        _ => NodeKind::Statement,
    }
}

/// Leaf node for a logical line. Comment-only and blank lines become
/// `Comment` / `Blank` regardless of `kind`.
fn leaf(line: &LogicalLine, kind: NodeKind) -> Node {
    if line.is_blank() {
        return Node::new(NodeKind::Blank, "", line.line);
    }
    if line.is_comment() {
        let text = line.comment.as_deref().unwrap_or_default();
        return Node::new(NodeKind::Comment, text, line.line);
    }
    let mut node = Node::new(kind, line.code.as_str(), line.line);
    push_inline_comment(&mut node, line);
    node
}

fn push_inline_comment(node: &mut Node, line: &LogicalLine) {
    if let Some(comment) = line.inline_comment() {
        node.push(Node::new(NodeKind::Comment, comment, line.line));
    }
}
