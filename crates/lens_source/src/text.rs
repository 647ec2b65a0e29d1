//! Plain-text helpers for documentation fallbacks.
//!
//! When the analysis engine has no structured comment for a symbol, hover
//! text is recovered from the raw file: the comment block directly above the
//! declaration, or a short snippet of the declaration itself.

use crate::line_index::LineIndex;

const MAX_COMMENT_LEN: usize = 8192;
const MAX_SNIPPET_LEN: usize = 4096;
const MAX_SCAN_LINES: usize = 1000;

fn truncate_with_ellipsis(out: &mut String, max: usize) {
    if out.len() > max {
        let mut cut = max;
        while !out.is_char_boundary(cut) {
            cut -= 1;
        }
        out.truncate(cut);
        out.push_str("...");
    }
}

fn trim_newlines(s: &str) -> &str {
    s.trim_matches(|c| c == '\n' || c == '\r')
}

/// Extracts the comment block immediately above a 1-indexed declaration line.
///
/// Consecutive `//` lines and a single `/* ... */` block are collected upward
/// until a blank line or code. Comment markers and a leading `*` are stripped.
/// Returns an empty string when no comment is attached.
pub fn comment_block_above(text: &str, decl_line: u32) -> String {
    if decl_line <= 1 {
        return String::new();
    }
    let index = LineIndex::new(text);
    let decl_line = (decl_line as usize).min(index.line_count());

    let mut collected: Vec<&str> = Vec::new();
    let mut in_block = false;
    for ln in (1..decl_line).rev().take(MAX_SCAN_LINES) {
        let raw = index.line(ln).unwrap_or("");
        let t = raw.trim();
        if in_block {
            collected.push(raw);
            if t.contains("/*") {
                in_block = false;
            }
            continue;
        }
        if t.is_empty() {
            break;
        }
        if t.starts_with("//") {
            collected.push(raw);
            continue;
        }
        if t.contains("*/") {
            collected.push(raw);
            in_block = !t.contains("/*");
            continue;
        }
        break;
    }

    if collected.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    for raw in collected.iter().rev() {
        let s = raw.trim_start();
        let cleaned = if let Some(rest) = s.strip_prefix("//") {
            rest.strip_prefix(' ').unwrap_or(rest).to_string()
        } else {
            let mut line = s.replacen("/*", "", 1).replacen("*/", "", 1);
            line = line.trim_start().to_string();
            if let Some(rest) = line.strip_prefix('*') {
                line = rest.strip_prefix(' ').unwrap_or(rest).to_string();
            }
            line
        };
        out.push_str(cleaned.trim_end());
        out.push('\n');
    }

    let mut out = trim_newlines(&out).to_string();
    truncate_with_ellipsis(&mut out, MAX_COMMENT_LEN);
    out
}

/// Returns the first non-empty line of a comment, used as its brief form.
pub fn brief_from_full(full: &str) -> String {
    full.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
        .to_string()
}

/// Returns the source lines `from_line..=to_line` (1-indexed).
///
/// Ranges longer than six lines are abbreviated to their first and last three
/// lines around a `...` marker.
pub fn body_snippet(text: &str, from_line: u32, to_line: u32) -> String {
    if from_line == 0 || to_line == 0 || to_line < from_line {
        return String::new();
    }
    let index = LineIndex::new(text);
    let count = index.line_count() as u32;
    if from_line > count {
        return String::new();
    }
    let to_line = to_line.min(count);
    let get = |ln: u32| index.line(ln as usize).unwrap_or("");

    let total = to_line - from_line + 1;
    let lines: Vec<&str> = if total <= 6 {
        (from_line..=to_line).map(get).collect()
    } else {
        let head = (from_line..from_line + 3).map(get);
        let tail = (to_line - 2..=to_line).map(get);
        head.chain(std::iter::once("...")).chain(tail).collect()
    };

    let mut out = lines.join("\n");
    truncate_with_ellipsis(&mut out, MAX_SNIPPET_LEN);
    trim_newlines(&out).to_string()
}

/// Re-indents a code block so its least-indented line starts at `indent` spaces.
///
/// Blank lines are kept as they are. A block with no visible text is
/// returned unchanged.
pub fn normalize_indent(code: &str, indent: usize) -> String {
    let is_ws = |c: char| c == ' ' || c == '\t' || c == '\r';
    let is_blank = |line: &str| line.trim_end_matches('\n').chars().all(is_ws);
    let lines: Vec<&str> = code.split_inclusive('\n').collect();

    let min_indent = lines
        .iter()
        .filter(|&&l| !is_blank(l))
        .map(|&l| l.chars().take_while(|&c| is_ws(c)).count())
        .min();
    let Some(min_indent) = min_indent else {
        return code.to_string();
    };

    let prefix = " ".repeat(indent);
    let mut out = String::with_capacity(code.len() + lines.len() * indent);
    for line in lines {
        if is_blank(line) {
            out.push_str(line);
            continue;
        }
        let stripped: usize = line
            .chars()
            .take(min_indent)
            .take_while(|&c| is_ws(c))
            .map(char::len_utf8)
            .sum();
        out.push_str(&prefix);
        out.push_str(&line[stripped..]);
    }
    out
}
