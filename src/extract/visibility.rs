//! Module-scoped visibility resolution.
//!
//! A [`VisibilityContext`] is built once per module from its access
//! statements and handed down explicitly to every procedure and derived type
//! extracted inside that module.

use crate::error::Warning;
use crate::model::{ModuleEntity, Visibility};
use crate::syntax::stmt::AccessStmt;
use std::collections::BTreeSet;

/// Default visibility: the last bare access statement, else public.
pub fn resolve_default(statements: &[AccessStmt]) -> Visibility {
    statements
        .iter()
        .filter(|s| s.is_bare())
        .last()
        .map_or(Visibility::Public, |s| s.visibility)
}

/// Names listed by every access statement of the given kind.
pub fn resolve_explicit(statements: &[AccessStmt], kind: Visibility) -> BTreeSet<String> {
    statements
        .iter()
        .filter(|s| s.visibility == kind)
        .flat_map(|s| s.names.iter().map(|n| n.to_ascii_lowercase()))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityContext {
    pub default: Visibility,
    pub public: BTreeSet<String>,
    pub private: BTreeSet<String>,
}

impl VisibilityContext {
    /// Build the context for `module`, reporting conflicting statements.
    pub fn build(module: &str, statements: &[AccessStmt]) -> (Self, Vec<Warning>) {
        let mut warnings = Vec::new();

        let bare: Vec<&str> = statements
            .iter()
            .filter(|s| s.is_bare())
            .map(|s| s.visibility.as_str())
            .collect();
        if bare.len() > 1 {
            warnings.push(Warning::ambiguous(
                module,
                format!(
                    "{} default-visibility statements ({}), the last one wins",
                    bare.len(),
                    bare.join(", ")
                ),
            ));
        }

        let ctx = Self {
            default: resolve_default(statements),
            public: resolve_explicit(statements, Visibility::Public),
            private: resolve_explicit(statements, Visibility::Private),
        };

        for name in ctx.public.intersection(&ctx.private) {
            warnings.push(Warning::ambiguous(
                module,
                format!("{name} is declared both public and private, treating it as private"),
            ));
        }

        (ctx, warnings)
    }

    /// Visibility of a module-level name.
    pub fn lookup(&self, name: &str) -> Visibility {
        let key = name.to_ascii_lowercase();
        let mut visibility = self.default;
        if self.public.contains(&key) {
            visibility = Visibility::Public;
        }
        if self.private.contains(&key) {
            visibility = Visibility::Private;
        }
        visibility
    }

    pub fn module_entity(&self, name: &str, doc: Option<String>) -> ModuleEntity {
        ModuleEntity {
            name: name.to_string(),
            doc,
            default_visibility: self.default,
            public_names: self.public.clone(),
            private_names: self.private.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::stmt::parse_access;

    fn stmts(lines: &[&str]) -> Vec<AccessStmt> {
        lines.iter().filter_map(|l| parse_access(l)).collect()
    }

    #[test]
    fn default_is_public() {
        let (ctx, warnings) = VisibilityContext::build("m", &stmts(&["public :: a"]));
        assert_eq!(ctx.default, Visibility::Public);
        assert_eq!(ctx.lookup("anything"), Visibility::Public);
        assert!(warnings.is_empty());
    }

    #[test]
    fn private_default_with_explicit_public() {
        let (ctx, _) = VisibilityContext::build("m", &stmts(&["private", "public :: foo"]));
        assert_eq!(ctx.lookup("foo"), Visibility::Public);
        assert_eq!(ctx.lookup("FOO"), Visibility::Public);
        assert_eq!(ctx.lookup("bar"), Visibility::Private);
    }

    #[test]
    fn explicit_set_beats_default_either_way() {
        let (ctx, _) = VisibilityContext::build("m", &stmts(&["public", "private :: hidden"]));
        assert_eq!(ctx.lookup("hidden"), Visibility::Private);
        assert_eq!(ctx.lookup("shown"), Visibility::Public);
    }

    #[test]
    fn last_bare_statement_wins_with_warning() {
        let (ctx, warnings) = VisibilityContext::build("m", &stmts(&["private", "public"]));
        assert_eq!(ctx.default, Visibility::Public);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], Warning::AmbiguousVisibility { .. }));
    }

    #[test]
    fn name_in_both_sets_is_private() {
        let (ctx, warnings) =
            VisibilityContext::build("m", &stmts(&["public :: x, y", "private :: x"]));
        assert_eq!(ctx.lookup("x"), Visibility::Private);
        assert_eq!(ctx.lookup("y"), Visibility::Public);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn comma_list_contributes_each_name() {
        let set = resolve_explicit(&stmts(&["public :: a, b", "public c"]), Visibility::Public);
        assert_eq!(set.into_iter().collect::<Vec<_>>(), ["a", "b", "c"]);
    }
}
