//! Error and warning types.
//!
//! Only [`ConfigError`] is fatal. Everything that goes wrong inside a single
//! construct is a [`Warning`] attached to the extraction result.

use thiserror::Error;

/// Invalid docstring-marker configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("doc marker scheme needs exactly 4 variants (doc, doc-alt, pre-doc, pre-doc-alt), got {0}")]
    VariantCount(usize),

    #[error("invalid doc marker {0:?}: must be non-empty and contain no whitespace")]
    InvalidMarker(String),

    #[error("doc marker variants must be distinct, {0:?} is repeated")]
    DuplicateMarker(String),
}

/// Non-fatal problem found while extracting one file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    #[error("line {line}: skipping malformed {kind}: {reason}")]
    MalformedConstruct {
        kind: &'static str,
        line: usize,
        reason: String,
    },

    #[error("module {module}: ambiguous visibility: {detail}")]
    AmbiguousVisibility { module: String, detail: String },
}

impl Warning {
    pub fn malformed(kind: &'static str, line: usize, reason: impl Into<String>) -> Self {
        Warning::MalformedConstruct {
            kind,
            line,
            reason: reason.into(),
        }
    }

    pub fn ambiguous(module: &str, detail: impl Into<String>) -> Self {
        Warning::AmbiguousVisibility {
            module: module.to_string(),
            detail: detail.into(),
        }
    }
}
