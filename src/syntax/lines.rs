//! Physical → logical line conversion (free-form source).
//!
//! Joins `&` continuations and separates each statement from its trailing
//! comment. Full-line comments inside a continuation are dropped.

use crate::docstring::split_comment;

/// Maximum number of physical lines joined into one statement.
const MAX_CONTINUATION_LINES: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based number of the first physical line
    pub line: usize,
    /// Statement text with continuations joined, trimmed
    pub code: String,
    /// Trailing (or full-line) comment, starting at `!`
    pub comment: Option<String>,
}

impl LogicalLine {
    pub fn is_blank(&self) -> bool {
        self.code.is_empty() && self.comment.is_none()
    }

    /// Full-line comment.
    pub fn is_comment(&self) -> bool {
        self.code.is_empty() && self.comment.is_some()
    }

    /// Inline comment of a statement line.
    pub fn inline_comment(&self) -> Option<&str> {
        if self.code.is_empty() {
            None
        } else {
            self.comment.as_deref()
        }
    }
}

pub fn logical_lines(source: &str) -> Vec<LogicalLine> {
    let mut out: Vec<LogicalLine> = Vec::new();
    let mut pending: Option<(LogicalLine, usize)> = None;

    for (idx, raw) in source.lines().enumerate() {
        let number = idx + 1;
        let (code, comment) = split_comment(raw);
        let code = code.trim();
        let comment = comment.map(|c| c.trim_end().to_string());

        if let Some((mut cur, count)) = pending.take() {
            if code.is_empty() {
                // comment or blank line between continuation lines
                pending = Some((cur, count));
                continue;
            }
            let piece = code.strip_prefix('&').unwrap_or(code).trim_start();
            let (piece, continues) = strip_continuation(piece);
            if !cur.code.is_empty() && !piece.is_empty() {
                cur.code.push(' ');
            }
            cur.code.push_str(piece);
            if cur.comment.is_none() {
                cur.comment = comment;
            }
            if continues && count < MAX_CONTINUATION_LINES {
                pending = Some((cur, count + 1));
            } else {
                out.push(cur);
            }
            continue;
        }

        let (code, continues) = strip_continuation(code);
        let line = LogicalLine {
            line: number,
            code: code.to_string(),
            comment,
        };
        if continues {
            pending = Some((line, 1));
        } else {
            out.push(line);
        }
    }

    if let Some((cur, _)) = pending {
        out.push(cur);
    }
    out
}

fn strip_continuation(code: &str) -> (&str, bool) {
    match code.strip_suffix('&') {
        Some(rest) => (rest.trim_end(), true),
        None => (code, false),
    }
}
