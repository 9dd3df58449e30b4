//! Statement classification for free-form Fortran.
//!
//! All regexes are case-insensitive and compiled once on first use.
//! Classification works on the code part of a logical line (comment removed,
//! continuations joined).

use crate::model::Visibility;
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// Build a case-insensitive regex from a compile-time constant pattern.
pub(crate) fn build_re(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .unwrap_or_else(|_| panic!("invalid regex pattern: {pattern}"))
}

// -- Regex patterns -----------------------------------------------------------

static RE_MODULE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"^module(?:\s+(\w+))?$"));

static RE_SUBMODULE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(r"^submodule\s*\(\s*(\w+)\s*(?::\s*(\w+)\s*)?\)\s*(\w+)?$")
});

static RE_PROCEDURE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(concat!(
        r"^(?P<prefix>(?:[\w*]+(?:\s*\([^()]*(?:\([^()]*\)[^()]*)*\))?\s+)*?)",
        r"(?P<kind>subroutine|function)\b\s*(?P<name>\w+)?\s*",
        r"(?:\((?P<args>[^()]*)\))?\s*(?P<suffix>.*)$"
    ))
});

static RE_PROC_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    build_re(r"^(?:(?:result\s*\(\s*\w+\s*\)|bind\s*\([^()]*\))\s*)*$")
});

static RE_RESULT: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"\bresult\s*\(\s*(\w+)\s*\)"));

static RE_PROGRAM: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"^program\s+(\w+)$"));

static RE_TYPE_DEF: LazyLock<Regex> = LazyLock::new(|| {
    build_re(r"^type\b\s*(?:,\s*(?P<attrs>[^:]*?))?\s*(?:::)?\s*(?P<name>\w+)?\s*(?:\(.*\))?$")
});

static RE_INTERFACE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"^(?:abstract\s+)?interface\b"));

static RE_END_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    build_re(r"^end\s*(module|submodule|subroutine|function|program|type|interface)\b(?:\s+.*)?$")
});

static RE_BARE_END: LazyLock<Regex> = LazyLock::new(|| build_re(r"^end$"));

static RE_CONTAINS: LazyLock<Regex> = LazyLock::new(|| build_re(r"^contains$"));

static RE_ACCESS: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"^(public|private)\b\s*(.*)$"));

static RE_TYPE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    build_re(r"^(integer|real|logical|complex|character|double\s+precision|double\s+complex|type|class|procedure)\b")
});

static RE_SPEC_STMT: LazyLock<Regex> = LazyLock::new(|| {
    build_re(concat!(
        r"^(use|implicit|import|include|parameter|dimension|save|external|intrinsic|data|",
        r"common|equivalence|namelist|optional|intent|allocatable|pointer|target|volatile|",
        r"asynchronous|protected|value|bind|sequence|enum|enumerator|end\s*enum|format|",
        r"generic|final)\b"
    ))
});

static RE_TYPE_BOUND: LazyLock<Regex> = LazyLock::new(|| {
    build_re(r"^(procedure|generic|final)\b\s*(\([^()]*\))?\s*(?:,\s*(.*?))?\s*::\s*(.+)$")
});

static RE_LEADING_NAME: LazyLock<Regex> = LazyLock::new(|| build_re(r"^\s*(\w+)"));

// -- Statement shapes ---------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    Subroutine,
    Function,
}

impl ProcedureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcedureKind::Subroutine => "subroutine",
            ProcedureKind::Function => "function",
        }
    }
}

/// `[prefix] subroutine|function name(args) [result(r)] [bind(...)]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureHeader {
    pub kind: ProcedureKind,
    pub name: Option<String>,
    /// Everything before the keyword, e.g. `pure real(kind=8)`
    pub prefix: String,
    pub args: Vec<String>,
    pub result: Option<String>,
}

/// `submodule (ancestor[:parent]) name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmoduleHeader {
    pub ancestor: Option<String>,
    pub parent: String,
    pub name: Option<String>,
}

/// `type[, attr-list] [::] name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHeader {
    pub name: Option<String>,
    pub attributes: Vec<String>,
}

/// `public|private [[::] name-list]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessStmt {
    pub visibility: Visibility,
    /// Empty for a bare statement
    pub names: Vec<String>,
}

impl AccessStmt {
    pub fn is_bare(&self) -> bool {
        self.names.is_empty()
    }
}

/// `type-spec [, attr-list] [::] entity-list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub type_spec: String,
    pub attributes: Vec<String>,
    /// Declared names, stripped of array specs and initializers
    pub entities: Vec<String>,
}

impl Declaration {
    pub fn has_intent(&self) -> bool {
        self.attributes
            .iter()
            .any(|a| a.trim_start().to_ascii_lowercase().starts_with("intent"))
    }

    /// Type spec followed by the attribute list, comma-joined.
    pub fn attribute_text(&self) -> String {
        let mut out = self.type_spec.clone();
        for attr in &self.attributes {
            out.push_str(", ");
            out.push_str(attr);
        }
        out
    }
}

/// Statement after `contains` inside a derived type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeBoundStmt {
    /// `procedure[, attrs] :: name [=> target], ...`
    Specific {
        attributes: Vec<String>,
        bindings: Vec<(String, Option<String>)>,
    },
    /// `procedure(iface), deferred :: name`
    Deferred,
    Generic,
    Final,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndKind {
    Module,
    Submodule,
    Subroutine,
    Function,
    Program,
    Type,
    Interface,
    /// Bare `end`
    Any,
}

/// Classification of one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Module(Option<String>),
    Submodule(SubmoduleHeader),
    Procedure(ProcedureHeader),
    Program(String),
    TypeDef(TypeHeader),
    Interface,
    End(EndKind),
    Contains,
    Access(AccessStmt),
    Declaration(Declaration),
    /// Other specification statement (`use`, `implicit`, ...)
    Specification,
    /// Preprocessor line such as `#ifdef` or `#include`
    Directive,
    Executable,
}

impl Statement {
    /// True for statements allowed in a specification section.
    pub fn is_specification(&self) -> bool {
        matches!(
            self,
            Statement::Access(_) | Statement::Declaration(_) | Statement::Specification
        )
    }
}

// -- Classification -----------------------------------------------------------

pub fn classify(code: &str) -> Statement {
    let code = code.trim();

    if code.starts_with('#') {
        return Statement::Directive;
    }
    if let Some(kind) = parse_end(code) {
        return Statement::End(kind);
    }
    if RE_CONTAINS.is_match(code) {
        return Statement::Contains;
    }
    if let Some(caps) = RE_MODULE.captures(code) {
        return Statement::Module(caps.get(1).map(|m| m.as_str().to_string()));
    }
    if let Some(header) = parse_submodule_header(code) {
        return Statement::Submodule(header);
    }
    if let Some(header) = parse_procedure_header(code) {
        return Statement::Procedure(header);
    }
    if let Some(caps) = RE_PROGRAM.captures(code) {
        return Statement::Program(caps[1].to_string());
    }
    if let Some(header) = parse_type_header(code) {
        return Statement::TypeDef(header);
    }
    if RE_INTERFACE.is_match(code) {
        return Statement::Interface;
    }
    if let Some(access) = parse_access(code) {
        return Statement::Access(access);
    }
    if let Some(decl) = parse_declaration(code) {
        return Statement::Declaration(decl);
    }
    if RE_SPEC_STMT.is_match(code) {
        return Statement::Specification;
    }
    Statement::Executable
}

pub fn parse_end(code: &str) -> Option<EndKind> {
    if RE_BARE_END.is_match(code.trim()) {
        return Some(EndKind::Any);
    }
    let caps = RE_END_UNIT.captures(code.trim())?;
    let kind = match caps[1].to_ascii_lowercase().as_str() {
        "module" => EndKind::Module,
        "submodule" => EndKind::Submodule,
        "subroutine" => EndKind::Subroutine,
        "function" => EndKind::Function,
        "program" => EndKind::Program,
        "type" => EndKind::Type,
        _ => EndKind::Interface,
    };
    Some(kind)
}

pub fn parse_submodule_header(code: &str) -> Option<SubmoduleHeader> {
    let caps = RE_SUBMODULE.captures(code.trim())?;
    let first = caps[1].to_string();
    let (ancestor, parent) = match caps.get(2) {
        Some(parent) => (Some(first), parent.as_str().to_string()),
        None => (None, first),
    };
    Some(SubmoduleHeader {
        ancestor,
        parent,
        name: caps.get(3).map(|m| m.as_str().to_string()),
    })
}

pub fn parse_procedure_header(code: &str) -> Option<ProcedureHeader> {
    let caps = RE_PROCEDURE.captures(code.trim())?;
    let suffix = caps.name("suffix").map_or("", |m| m.as_str()).trim();
    if !RE_PROC_SUFFIX.is_match(suffix) {
        return None;
    }
    let kind = if caps["kind"].eq_ignore_ascii_case("function") {
        ProcedureKind::Function
    } else {
        ProcedureKind::Subroutine
    };
    let args = caps
        .name("args")
        .map(|m| {
            split_top_level(m.as_str())
                .into_iter()
                .map(str::trim)
                .filter(|a| !a.is_empty() && *a != "*")
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Some(ProcedureHeader {
        kind,
        name: caps.name("name").map(|m| m.as_str().to_string()),
        prefix: caps["prefix"].trim().to_string(),
        args,
        result: RE_RESULT.captures(suffix).map(|c| c[1].to_string()),
    })
}

pub fn parse_type_header(code: &str) -> Option<TypeHeader> {
    let code = code.trim();
    // `type(foo) :: x` is a declaration, not a definition
    let after = code.get(4..)?.trim_start();
    if after.starts_with('(') {
        return None;
    }
    let caps = RE_TYPE_DEF.captures(code)?;
    let name = caps.name("name").map(|m| m.as_str().to_string());
    if name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case("is")) {
        return None;
    }
    let attributes = caps
        .name("attrs")
        .map(|m| {
            split_top_level(m.as_str())
                .into_iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect()
        })
        .unwrap_or_default();
    Some(TypeHeader { name, attributes })
}

pub fn parse_access(code: &str) -> Option<AccessStmt> {
    let caps = RE_ACCESS.captures(code.trim())?;
    let visibility = Visibility::from_keyword(&caps[1])?;
    let rest = caps[2].trim();
    let list = match rest.strip_prefix("::") {
        Some(list) => list,
        None if rest.is_empty() => "",
        // `public foo` (no colons) must start with a name
        None if rest.starts_with(|c: char| c.is_ascii_alphabetic()) => rest,
        None => return None,
    };
    let names = split_top_level(list)
        .into_iter()
        .map(|n| n.trim().to_ascii_lowercase())
        .filter(|n| !n.is_empty())
        .collect();
    Some(AccessStmt { visibility, names })
}

pub fn parse_declaration(code: &str) -> Option<Declaration> {
    let code = code.trim();
    let kw = RE_TYPE_KEYWORD.find(code)?;
    let keyword = kw.as_str().to_ascii_lowercase();
    let mut end = kw.end();
    let rest = &code[end..];
    let skipped = rest.len() - rest.trim_start().len();

    match rest.trim_start().chars().next() {
        Some('(') => {
            let open = end + skipped;
            end = open + balanced_paren_len(&code[open..])?;
        }
        Some('*') => {
            // character*10, real*8
            let star = end + skipped;
            let tail = &code[star + 1..];
            let tail_trim = tail.trim_start();
            let len = if tail_trim.starts_with('(') {
                balanced_paren_len(tail_trim)?
            } else {
                tail_trim
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(tail_trim.len())
            };
            end = star + 1 + (tail.len() - tail_trim.len()) + len;
        }
        _ if matches!(keyword.as_str(), "type" | "class" | "procedure") => return None,
        _ => {}
    }

    let type_spec = code[..end].trim().to_string();
    let rest = code[end..].trim();

    let (attr_part, entity_part) = match find_top_level(rest, "::") {
        Some(pos) => (&rest[..pos], &rest[pos + 2..]),
        None if rest.starts_with(',') => return None,
        None if rest.starts_with(|c: char| c.is_ascii_alphabetic()) => ("", rest),
        None => return None,
    };
    let attr_part = attr_part.trim();
    if !attr_part.is_empty() && !attr_part.starts_with(',') {
        return None;
    }

    let attributes = split_top_level(attr_part.trim_start_matches(','))
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    let entities: Vec<String> = split_top_level(entity_part)
        .into_iter()
        .filter_map(|e| RE_LEADING_NAME.captures(e).map(|c| c[1].to_string()))
        .collect();
    if entities.is_empty() {
        return None;
    }

    Some(Declaration {
        type_spec,
        attributes,
        entities,
    })
}

pub fn parse_type_bound(code: &str) -> Option<TypeBoundStmt> {
    let caps = RE_TYPE_BOUND.captures(code.trim())?;
    match caps[1].to_ascii_lowercase().as_str() {
        "generic" => return Some(TypeBoundStmt::Generic),
        "final" => return Some(TypeBoundStmt::Final),
        _ => {}
    }
    let attributes: Vec<String> = caps
        .get(3)
        .map(|m| {
            split_top_level(m.as_str())
                .into_iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect()
        })
        .unwrap_or_default();
    if caps.get(2).is_some()
        || attributes
            .iter()
            .any(|a| a.eq_ignore_ascii_case("deferred"))
    {
        return Some(TypeBoundStmt::Deferred);
    }
    let bindings = split_top_level(&caps[4])
        .into_iter()
        .filter_map(|b| {
            let (name, target) = match b.split_once("=>") {
                Some((n, t)) => (n.trim(), Some(t.trim().to_string())),
                None => (b.trim(), None),
            };
            (!name.is_empty()).then(|| (name.to_string(), target))
        })
        .collect();
    Some(TypeBoundStmt::Specific {
        attributes,
        bindings,
    })
}

pub fn is_contains(code: &str) -> bool {
    RE_CONTAINS.is_match(code.trim())
}

// -- Helpers ------------------------------------------------------------------

/// Split on commas that are not nested in parentheses or character literals.
pub fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' | '[' => depth += 1,
                ')' | ']' => depth -= 1,
                ',' if depth == 0 => {
                    parts.push(&s[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Byte offset of `needle` outside parentheses.
fn find_top_level(s: &str, needle: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ if depth == 0 && s[i..].starts_with(needle) => return Some(i),
            _ => {}
        }
    }
    None
}

/// Length in bytes of the balanced `( ... )` group at the start of `s`.
fn balanced_paren_len(s: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
