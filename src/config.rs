//! Docstring marker configuration.
//!
//! Two schemes are supported:
//!
//! - a single marker (default `!>`) recognized in comments that follow a
//!   declaration;
//! - four variants `doc, doc-alt, pre-doc, pre-doc-alt`: the doc markers are
//!   recognized after a declaration, the pre-doc markers in the comment block
//!   right before it. A one-character variant is shorthand for `!` + char, so
//!   `["!", "*", ">", "|"]` means `!!`, `!*`, `!>` and `!|`.

use crate::error::ConfigError;

pub const DEFAULT_MARKER: &str = "!>";

/// Markers that identify documentation comments, split by placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocMarkers {
    trailing: Vec<String>,
    leading: Vec<String>,
}

impl Default for DocMarkers {
    fn default() -> Self {
        Self {
            trailing: vec![DEFAULT_MARKER.to_string()],
            leading: Vec::new(),
        }
    }
}

impl DocMarkers {
    /// One marker, recognized after declarations.
    pub fn single(marker: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            trailing: vec![validate(marker)?],
            leading: Vec::new(),
        })
    }

    /// The four-variant scheme. Fails unless exactly four variants are given.
    pub fn from_variants<S: AsRef<str>>(variants: &[S]) -> Result<Self, ConfigError> {
        if variants.len() != 4 {
            return Err(ConfigError::VariantCount(variants.len()));
        }
        let markers = variants
            .iter()
            .map(|v| expand_variant(v.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        for (i, m) in markers.iter().enumerate() {
            if markers[..i].contains(m) {
                return Err(ConfigError::DuplicateMarker(m.clone()));
            }
        }
        Ok(Self {
            trailing: markers[..2].to_vec(),
            leading: markers[2..].to_vec(),
        })
    }

    /// Parse a comma-separated variant list such as `"!,*,>,|"`.
    pub fn parse_variants(list: &str) -> Result<Self, ConfigError> {
        let parts: Vec<&str> = list.split(',').map(str::trim).collect();
        Self::from_variants(&parts)
    }

    /// Markers for comments following a declaration.
    pub fn trailing(&self) -> &[String] {
        &self.trailing
    }

    /// Markers for comments preceding a declaration (empty in single-marker mode).
    pub fn leading(&self) -> &[String] {
        &self.leading
    }

    /// True if the line is a comment carrying any configured marker.
    pub fn is_marked(&self, line: &str) -> bool {
        let t = line.trim();
        self.trailing
            .iter()
            .chain(self.leading.iter())
            .any(|m| t.starts_with(m.as_str()))
    }
}

fn validate(marker: &str) -> Result<String, ConfigError> {
    let m = marker.trim();
    if m.is_empty() || m.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidMarker(marker.to_string()));
    }
    Ok(m.to_string())
}

/// A one-character variant is shorthand for `!` followed by it.
fn expand_variant(variant: &str) -> Result<String, ConfigError> {
    let m = validate(variant)?;
    if m.chars().count() == 1 {
        return Ok(format!("!{m}"));
    }
    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_single_trailing_marker() {
        let m = DocMarkers::default();
        assert_eq!(m.trailing(), ["!>"]);
        assert!(m.leading().is_empty());
    }

    #[test]
    fn variants_expand_single_chars() {
        let m = DocMarkers::from_variants(&["!", "*", ">", "|"]).unwrap();
        assert_eq!(m.trailing(), ["!!", "!*"]);
        assert_eq!(m.leading(), ["!>", "!|"]);
    }

    #[test]
    fn variants_wrong_count_fails() {
        assert_eq!(
            DocMarkers::from_variants(&["!", "*", ">"]),
            Err(ConfigError::VariantCount(3))
        );
        assert_eq!(
            DocMarkers::parse_variants("!,*,>,|,#"),
            Err(ConfigError::VariantCount(5))
        );
    }

    #[test]
    fn variants_must_be_distinct() {
        assert!(matches!(
            DocMarkers::from_variants(&["!", "!!", ">", "|"]),
            Err(ConfigError::DuplicateMarker(_))
        ));
    }

    #[test]
    fn single_marker_is_taken_verbatim() {
        assert_eq!(DocMarkers::single("!").unwrap().trailing(), ["!"]);
        assert_eq!(DocMarkers::single(" !* ").unwrap().trailing(), ["!*"]);
    }

    #[test]
    fn empty_marker_rejected() {
        assert!(matches!(
            DocMarkers::single("  "),
            Err(ConfigError::InvalidMarker(_))
        ));
    }

    #[test]
    fn parse_variants_trims() {
        let m = DocMarkers::parse_variants("!!, !*, !>, !|").unwrap();
        assert_eq!(m.leading(), ["!>", "!|"]);
        assert!(m.is_marked("   !| note"));
        assert!(!m.is_marked("! plain"));
    }
}
