//! GitHub-flavored markdown anchor/slug generation for the page index.

use std::collections::HashMap;

/// Hands out heading anchors, numbering repeats the way GitHub does
/// (`area`, `area-1`, `area-2`).
#[derive(Debug, Default)]
pub struct Anchors {
    seen: HashMap<String, usize>,
}

impl Anchors {
    pub fn next(&mut self, heading: &str) -> String {
        let slug = github_slug(heading);
        let count = self.seen.entry(slug.clone()).or_insert(0);
        let anchor = if *count == 0 {
            slug
        } else {
            format!("{slug}-{count}")
        };
        *count += 1;
        anchor
    }
}

/// Generate a TOC list item.
pub fn render_toc_item(title: &str, anchor: &str) -> String {
    format!("* [{title}](#{anchor})")
}

/// GitHub heading anchor slug generation:
/// - lowercase
/// - remove all chars that aren't alphanumeric, space, underscore, or hyphen
/// - replace spaces with hyphens
pub fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_keeps_underscores() {
        assert_eq!(github_slug("add_integers"), "add_integers");
        assert_eq!(github_slug("Math_Utils"), "math_utils");
    }

    #[test]
    fn slug_strips_punctuation() {
        assert_eq!(github_slug("operator(+)"), "operator");
        assert_eq!(github_slug("hello world"), "hello-world");
    }

    #[test]
    fn repeated_headings_are_numbered() {
        let mut anchors = Anchors::default();
        assert_eq!(anchors.next("area"), "area");
        assert_eq!(anchors.next("Area"), "area-1");
        assert_eq!(anchors.next("norm"), "norm");
        assert_eq!(anchors.next("area"), "area-2");
    }

    #[test]
    fn toc_item() {
        assert_eq!(
            render_toc_item("add_integers", "add_integers"),
            "* [add_integers](#add_integers)"
        );
    }
}
