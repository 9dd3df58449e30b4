//! Statement-level syntax tree for Fortran sources.
//!
//! The tree is what the tree-walking extractor consumes. [`frontend`] builds
//! one from source text; an external Fortran front-end can build the same
//! shape through [`Node::new`] / [`Node::with_child`].
//!
//! Shape produced by the front-end:
//!
//! ```text
//! File
//! ├── Comment / Blank / Statement ...
//! ├── Module            Name, Comment?, SpecificationPart, SubprogramPart?, EndStmt
//! ├── Submodule         Name, ParentName, AncestorName?, Comment?, SpecificationPart, ...
//! ├── Subroutine        Name, Prefix?, DummyArgList?, Comment?, SpecificationPart,
//! │                     ExecutionPart?, SubprogramPart?, EndStmt
//! └── Function          ... plus ResultName?
//! DerivedType           Name, Attribute*, Comment?, Body, EndStmt
//! ```
//!
//! A `Comment` directly under a construct is the inline comment of its header
//! statement; a `Comment` under a `Declaration` is that declaration's inline
//! comment.

pub mod frontend;
pub mod lines;
pub mod stmt;

/// Node kinds the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    File,
    Module,
    Submodule,
    Subroutine,
    Function,
    Program,
    DerivedType,
    Interface,
    Name,
    ParentName,
    AncestorName,
    Prefix,
    DummyArgList,
    ResultName,
    Attribute,
    SpecificationPart,
    ExecutionPart,
    SubprogramPart,
    Body,
    Declaration,
    AccessStmt,
    Contains,
    Statement,
    EndStmt,
    Comment,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    text: String,
    line: usize,
    children: Vec<Node>,
}

impl Node {
    /// `line` is 1-based; 0 means "no source position".
    pub fn new(kind: NodeKind, text: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// First direct child of the given kind.
    pub fn child(&self, kind: NodeKind) -> Option<&Node> {
        self.children.iter().find(|c| c.kind == kind)
    }

    pub fn children_of(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    /// Text of the `Name` child.
    pub fn name(&self) -> Option<&str> {
        self.child(NodeKind::Name).map(Node::text)
    }
}

/// Syntax tree of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    root: Node,
}

impl SyntaxTree {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Build a tree with the bundled statement-level front-end.
    pub fn parse(source: &str) -> Self {
        frontend::parse(source)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_lookup_by_kind() {
        let node = Node::new(NodeKind::Module, "module m", 1)
            .with_child(Node::new(NodeKind::Name, "m", 1))
            .with_child(Node::new(NodeKind::SpecificationPart, "", 2));
        assert_eq!(node.name(), Some("m"));
        assert!(node.child(NodeKind::SpecificationPart).is_some());
        assert!(node.child(NodeKind::SubprogramPart).is_none());
        assert_eq!(node.children_of(NodeKind::Name).count(), 1);
    }
}
