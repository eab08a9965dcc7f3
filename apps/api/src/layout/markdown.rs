//! Markdown-to-plain-text reduction for `MarkdownMode::Stripped` exports.
//!
//! Line-oriented: block markers are handled per source line, inline markers
//! within it. Line structure is kept so wrapping sees the same paragraphs the
//! author wrote. Not a full CommonMark implementation; nested or malformed
//! emphasis is left as typed.

use once_cell::sync::Lazy;
use regex::Regex;

static THEMATIC_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s{0,3}(?:(?:-\s*){3,}|(?:\*\s*){3,}|(?:_\s*){3,})$").unwrap());
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s{0,3}(```|~~~)").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s{0,3}#{1,6}(?:\s+|$)").unwrap());
static BLOCKQUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s{0,3}>\s?").unwrap());
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)[-*+]\s+").unwrap());

static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static STRONG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*|__([^_]+)__").unwrap());
static EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*\s][^*]*)\*").unwrap());

/// Removes markdown syntax from `text`, keeping one output line per input line
/// (code fences and thematic breaks become empty lines).
pub fn strip_markdown(text: &str) -> String {
    text.split('\n')
        .map(|line| strip_line(line.strip_suffix('\r').unwrap_or(line)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_line(line: &str) -> String {
    if THEMATIC_BREAK.is_match(line) || CODE_FENCE.is_match(line) {
        return String::new();
    }

    let line = HEADING.replace(line, "");
    let line = BLOCKQUOTE.replace(&line, "");
    let line = BULLET.replace(&line, "${1}\u{2022} ");

    let line = IMAGE.replace_all(&line, "$1");
    let line = LINK.replace_all(&line, "$1 ($2)");
    let line = INLINE_CODE.replace_all(&line, "$1");
    let line = STRONG.replace_all(&line, "$1$2");
    let line = EMPHASIS.replace_all(&line, "$1");
    line.into_owned()
}
