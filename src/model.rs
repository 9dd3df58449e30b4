//! Format-agnostic data model for extracted Fortran documentation.

use serde::Serialize;
use std::collections::BTreeSet;

/// Fallback description for a tracked argument without a docstring.
pub const NO_DESCRIPTION: &str = "no description provided";

/// Complete documentation extracted from a single source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentationModel {
    pub modules: Vec<ModuleEntity>,
    pub submodules: Vec<SubmoduleEntity>,
    pub subroutines: Vec<ProcedureEntity>,
    pub functions: Vec<ProcedureEntity>,
    pub types: Vec<DerivedTypeEntity>,
}

impl DocumentationModel {
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
            && self.submodules.is_empty()
            && self.subroutines.is_empty()
            && self.functions.is_empty()
            && self.types.is_empty()
    }
}

/// Accessibility of a module-level entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }

    /// Parse an access-spec keyword (`public` / `private`, any case).
    pub fn from_keyword(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("public") {
            Some(Visibility::Public)
        } else if word.eq_ignore_ascii_case("private") {
            Some(Visibility::Private)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleEntity {
    pub name: String,
    pub doc: Option<String>,
    pub default_visibility: Visibility,
    /// Lower-cased names from `public :: ...` statements
    pub public_names: BTreeSet<String>,
    /// Lower-cased names from `private :: ...` statements
    pub private_names: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmoduleEntity {
    pub name: String,
    /// Direct parent (module or submodule), resolved by the consumer
    pub parent: String,
    /// Ancestor module when the parent is itself a submodule (`ancestor:parent`)
    pub ancestor: Option<String>,
    pub doc: Option<String>,
}

/// Subroutine or function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcedureEntity {
    pub name: String,
    pub doc: Option<String>,
    /// Tracked arguments in declaration order
    pub args: Vec<Argument>,
    pub attributes: BTreeSet<ProcAttribute>,
    pub visibility: Visibility,
    /// `None` for subroutines
    pub result: Option<ResultSpec>,
}

impl ProcedureEntity {
    pub fn arg(&self, name: &str) -> Option<&ArgumentInfo> {
        self.args
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| &a.info)
    }

    /// Name of the variable that carries the function's value.
    pub fn result_name(&self) -> Option<&str> {
        match self.result.as_ref()? {
            ResultSpec::SelfNamed => Some(&self.name),
            ResultSpec::Variable(name) => Some(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcAttribute {
    Pure,
    Elemental,
    Recursive,
}

impl ProcAttribute {
    pub const ALL: [ProcAttribute; 3] = [
        ProcAttribute::Pure,
        ProcAttribute::Elemental,
        ProcAttribute::Recursive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProcAttribute::Pure => "pure",
            ProcAttribute::Elemental => "elemental",
            ProcAttribute::Recursive => "recursive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum ResultSpec {
    /// The function name is both the callable name and the result.
    SelfNamed,
    /// `result(name)` clause.
    Variable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Argument {
    pub name: String,
    #[serde(flatten)]
    pub info: ArgumentInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentInfo {
    /// Docstring, or [`NO_DESCRIPTION`]
    pub description: String,
    /// e.g. "integer, intent(in)"
    pub attributes: String,
}

impl ArgumentInfo {
    pub fn is_documented(&self) -> bool {
        self.description != NO_DESCRIPTION
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedTypeEntity {
    pub name: String,
    pub doc: Option<String>,
    pub members: Vec<MemberInfo>,
    pub procedures: Vec<ProcedureRef>,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberInfo {
    pub name: String,
    pub attributes: String,
    pub doc: Option<String>,
}

/// Type-bound procedure binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcedureRef {
    pub name: String,
    pub attributes: String,
    /// Implementing procedure of a `name => target` binding
    pub target: Option<String>,
}
