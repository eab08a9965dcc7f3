//! Greedy word wrap against a font metric table.
//!
//! # Rules
//! - Source lines (split on `\n`) always start a new wrapped line; an empty
//!   source line becomes an empty wrapped line.
//! - Within a source line, words are separated by single spaces whatever the
//!   original run of whitespace was.
//! - A word is never split. A word wider than `max_width` sits alone on its
//!   own line and is the only case where a line exceeds `max_width`.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::FontMetricTable;
use crate::layout::geometry::PageGeometry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrappedLine {
    pub text: String,
    /// Measured width in millimetres.
    pub width: f32,
}

impl WrappedLine {
    /// True if the line holds exactly one whitespace-free token.
    pub fn is_single_token(&self) -> bool {
        !self.text.is_empty() && !self.text.contains(' ')
    }
}

/// Wraps `text` into lines no wider than `geometry.max_width`.
pub fn wrap_text(
    text: &str,
    metrics: &FontMetricTable,
    geometry: &PageGeometry,
) -> Vec<WrappedLine> {
    let em = geometry.font_size_mm();
    let max_width_em = geometry.max_width / em;

    let mut lines = Vec::new();
    for source_line in text.split('\n') {
        let source_line = source_line.strip_suffix('\r').unwrap_or(source_line);
        wrap_source_line(source_line, metrics, max_width_em, &mut |text: String, width_em: f32| {
            lines.push(WrappedLine {
                text,
                width: width_em * em,
            })
        });
    }
    lines
}

fn wrap_source_line(
    line: &str,
    metrics: &FontMetricTable,
    max_width_em: f32,
    emit: &mut dyn FnMut(String, f32),
) {
    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for word in line.split_whitespace() {
        let word_w = metrics.measure_str(word);

        if current.is_empty() {
            current.push_str(word);
            current_width = word_w;
        } else if current_width + metrics.space_width + word_w > max_width_em {
            // Current line is full; flush it and start the next with this word.
            emit(std::mem::take(&mut current), current_width);
            current.push_str(word);
            current_width = word_w;
        } else {
            current.push(' ');
            current.push_str(word);
            current_width += metrics.space_width + word_w;
        }
    }

    // Flush the final (possibly partial, possibly empty) line.
    emit(current, current_width);
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::{get_metrics, FontFamily};

    fn geometry(max_width: f32) -> PageGeometry {
        PageGeometry::a4_export().with_max_width(max_width)
    }

    fn wrap(text: &str, max_width: f32) -> Vec<WrappedLine> {
        let g = geometry(max_width);
        wrap_text(text, get_metrics(&g.font), &g)
    }

    fn texts(lines: &[WrappedLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_short_text_is_one_line() {
        let lines = wrap("Hello world", 180.0);
        assert_eq!(texts(&lines), vec!["Hello world"]);
    }

    #[test]
    fn test_every_line_fits_or_is_single_oversize_token() {
        let text = "Architected a distributed caching layer using Redis and consistent hashing, \
                    reducing p99 latency by 40% under 50k RPS peak load. \
                    Supercalifragilisticexpialidociousprojectnamethatisverylong ok \
                    and then some more ordinary words to keep the wrap going for a while.";
        for max_width in [20.0, 45.0, 90.0, 180.0] {
            for line in wrap(text, max_width) {
                assert!(
                    line.width <= max_width + 1e-3 || line.is_single_token(),
                    "line {:?} is {}mm wide at max {max_width}mm",
                    line.text,
                    line.width
                );
            }
        }
    }

    #[test]
    fn test_oversize_token_is_kept_whole_on_its_own_line() {
        let long = "x".repeat(200);
        let text = format!("before {long} after");
        let lines = wrap(&text, 30.0);
        assert_eq!(texts(&lines), vec!["before", long.as_str(), "after"]);
        assert!(lines[1].width > 30.0);
    }

    #[test]
    fn test_words_are_never_split_or_lost() {
        let text = "one two three four five six seven eight nine ten eleven twelve";
        let lines = wrap(text, 25.0);
        assert!(lines.len() > 1);
        let rejoined = texts(&lines).join(" ");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn test_newlines_and_blank_lines_are_preserved() {
        let lines = wrap("# Title\n\nFirst paragraph\r\nSecond", 180.0);
        assert_eq!(
            texts(&lines),
            vec!["# Title", "", "First paragraph", "Second"]
        );
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        let lines = wrap("a\t\tb    c", 180.0);
        assert_eq!(texts(&lines), vec!["a b c"]);
    }

    #[test]
    fn test_wrapping_is_deterministic() {
        let text = "lorem ipsum dolor sit amet ".repeat(40);
        assert_eq!(wrap(&text, 60.0), wrap(&text, 60.0));
    }

    #[test]
    fn test_line_width_matches_measured_text() {
        let g = geometry(180.0);
        let metrics = get_metrics(&g.font);
        let lines = wrap_text("Resume body", metrics, &g);
        let expected = metrics.measure_str("Resume body") * g.font_size_mm();
        assert!((lines[0].width - expected).abs() < 1e-4);
    }

    #[test]
    fn test_single_token_detection() {
        let line = WrappedLine {
            text: "token".to_string(),
            width: 1.0,
        };
        assert!(line.is_single_token());
        let empty = WrappedLine {
            text: String::new(),
            width: 0.0,
        };
        assert!(!empty.is_single_token());
    }
}
