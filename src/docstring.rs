//! Docstring resolution from runs of comment lines.

/// Rendering of a blank marked line.
pub const PARAGRAPH_BREAK: &str = "\n\n";

/// Resolve the docstring carried by `lines` using a single marker.
///
/// Only the maximal prefix of marked lines counts; the first unmarked line
/// ends the docstring. Returns `None` when that prefix has no text.
pub fn resolve<S: AsRef<str>>(lines: &[S], marker: &str) -> Option<String> {
    resolve_any(lines, &[marker])
}

/// Like [`resolve`], but a line is marked if it starts with any of `markers`.
pub fn resolve_any<S, M>(lines: &[S], markers: &[M]) -> Option<String>
where
    S: AsRef<str>,
    M: AsRef<str>,
{
    let mut parts: Vec<Option<&str>> = Vec::new();
    for line in lines {
        let Some(rest) = strip_marker(line.as_ref(), markers) else {
            break;
        };
        let rest = rest.trim();
        parts.push(if rest.is_empty() { None } else { Some(rest) });
    }
    join(&parts)
}

/// Strip the first matching marker from a trimmed line.
///
/// Longer markers are tried first so `!>>` does not shadow `!>`-prefixed text
/// when both are configured.
pub fn strip_marker<'a, M: AsRef<str>>(line: &'a str, markers: &[M]) -> Option<&'a str> {
    let t = line.trim();
    let mut best: Option<&'a str> = None;
    let mut best_len = 0;
    for m in markers {
        let m = m.as_ref();
        if m.len() > best_len {
            if let Some(rest) = t.strip_prefix(m) {
                best = Some(rest);
                best_len = m.len();
            }
        }
    }
    best
}

/// Join resolved fragments: text with spaces, `None` as a paragraph break.
fn join(parts: &[Option<&str>]) -> Option<String> {
    let mut out = String::new();
    let mut pending_break = false;
    for part in parts {
        match part {
            None => pending_break = !out.is_empty(),
            Some(text) => {
                if pending_break {
                    out.push_str(PARAGRAPH_BREAK);
                    pending_break = false;
                } else if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(text);
            }
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Combine a leading (pre-declaration) and a trailing docstring.
pub fn concat(leading: Option<String>, trailing: Option<String>) -> Option<String> {
    match (leading, trailing) {
        (Some(a), Some(b)) => Some(format!("{a}{PARAGRAPH_BREAK}{b}")),
        (a, b) => a.or(b),
    }
}

/// Split a source line into its code and its trailing `!` comment.
///
/// A `!` inside a character literal does not start a comment.
pub fn split_comment(line: &str) -> (&str, Option<&str>) {
    let mut quote: Option<char> = None;
    for (i, c) in line.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == '!' => return (&line[..i], Some(&line[i..])),
            None => {}
        }
    }
    (line, None)
}

/// True for a line that holds nothing but a comment.
pub fn is_comment_line(line: &str) -> bool {
    line.trim_start().starts_with('!')
}
