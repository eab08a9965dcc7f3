//! Text → pages. Wraps a text blob and flows the wrapped lines onto
//! fixed-size pages.
//!
//! Rendering is pure and CPU-bound; async callers run it inside
//! `tokio::task::spawn_blocking`.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::layout::font_metrics::{get_metrics, win_ansi_byte};
use crate::layout::geometry::{MarkdownMode, PageGeometry};
use crate::layout::markdown::strip_markdown;
use crate::layout::wrap::{wrap_text, WrappedLine};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// One page of laid-out text. `lines[i]` sits on the baseline
/// `origin.y + i * line_height`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    pub origin: Point,
    pub max_width: f32,
    pub line_height: f32,
    pub lines: Vec<String>,
}

impl Page {
    pub fn baseline(&self, line_index: usize) -> f32 {
        self.origin.y + line_index as f32 * self.line_height
    }
}

/// Non-fatal conditions reported alongside the rendered pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderWarning {
    /// Text was empty or whitespace-only; no pages were produced.
    EmptyInput,
    /// Laid-out characters the standard fonts cannot encode (CJK, emoji, ...).
    /// They are printed as `?`.
    UnencodableCharacters { count: usize },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid page geometry: {0}")]
    InvalidGeometry(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rendered {
    pub pages: Vec<Page>,
    pub warnings: Vec<RenderWarning>,
}

impl Rendered {
    /// All lines in reading order across every page.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .flat_map(|p| p.lines.iter().map(String::as_str))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

/// Wraps `text` to `geometry.max_width` and lays it out on pages.
///
/// Empty input is not an error: it yields zero pages and `RenderWarning::EmptyInput`.
pub fn render(text: &str, geometry: &PageGeometry) -> Result<Rendered, RenderError> {
    geometry.validate()?;

    if text.trim().is_empty() {
        warn!("Render called with empty text; producing zero pages");
        return Ok(Rendered {
            pages: Vec::new(),
            warnings: vec![RenderWarning::EmptyInput],
        });
    }

    let source = match geometry.markdown {
        MarkdownMode::Literal => Cow::Borrowed(text),
        MarkdownMode::Stripped => Cow::Owned(strip_markdown(text)),
    };

    let lines = wrap_text(&source, get_metrics(&geometry.font), geometry);
    let unencodable = count_unencodable(&lines);
    let pages = paginate(lines, geometry);

    let mut warnings = Vec::new();
    if unencodable > 0 {
        warn!(count = unencodable, "Text contains characters the PDF font cannot encode");
        warnings.push(RenderWarning::UnencodableCharacters { count: unencodable });
    }

    debug!(
        chars = text.len(),
        pages = pages.len(),
        markdown = ?geometry.markdown,
        "Rendered text to pages"
    );

    Ok(Rendered { pages, warnings })
}

fn count_unencodable(lines: &[WrappedLine]) -> usize {
    lines
        .iter()
        .flat_map(|l| l.text.chars())
        .filter(|&c| c != '\t' && win_ansi_byte(c).is_none())
        .count()
}

/// Flows wrapped lines onto pages, `geometry.lines_per_page()` per page, each
/// page starting at the top-left margin.
pub fn paginate(lines: Vec<WrappedLine>, geometry: &PageGeometry) -> Vec<Page> {
    let per_page = geometry.lines_per_page().max(1);
    let origin = Point {
        x: geometry.margin_left,
        y: geometry.margin_top,
    };

    let mut pages: Vec<Page> = Vec::new();
    for line in lines {
        let needs_new_page = pages.last().map_or(true, |p| p.lines.len() >= per_page);
        if needs_new_page {
            pages.push(Page {
                number: pages.len() + 1,
                origin,
                max_width: geometry.max_width,
                line_height: geometry.line_height(),
                lines: Vec::new(),
            });
        }
        if let Some(page) = pages.last_mut() {
            page.lines.push(line.text);
        }
    }
    pages
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn narrow() -> PageGeometry {
        PageGeometry::a4_export().with_max_width(20.0)
    }

    #[test]
    fn test_empty_text_yields_zero_pages_and_warning() {
        let rendered = render("", &PageGeometry::a4_export()).unwrap();
        assert!(rendered.pages.is_empty());
        assert_eq!(rendered.warnings, vec![RenderWarning::EmptyInput]);
    }

    #[test]
    fn test_whitespace_only_text_is_empty_input() {
        let rendered = render("  \n\t ", &PageGeometry::a4_export()).unwrap();
        assert!(rendered.pages.is_empty());
        assert_eq!(rendered.warnings, vec![RenderWarning::EmptyInput]);
    }

    #[test]
    fn test_repeated_words_on_narrow_width_span_multiple_pages() {
        let text = "a ".repeat(500);
        let rendered = render(&text, &narrow()).unwrap();
        assert!(
            rendered.pages.len() > 1,
            "expected several pages, got {}",
            rendered.pages.len()
        );
        assert!(rendered.warnings.is_empty());
    }

    #[test]
    fn test_long_text_at_export_geometry_paginates() {
        let paragraph = "Built and operated a multi-region event pipeline in Rust. ";
        let text = paragraph.repeat(120);
        let rendered = render(&text, &PageGeometry::a4_export()).unwrap();
        assert!(rendered.pages.len() >= 2);
        let per_page = PageGeometry::a4_export().lines_per_page();
        for page in &rendered.pages[..rendered.pages.len() - 1] {
            assert_eq!(page.lines.len(), per_page, "non-final pages are full");
        }
    }

    #[test]
    fn test_pagination_is_total() {
        let geometry = narrow();
        let text = "The quick brown fox jumps over the lazy dog.\n\n".repeat(60);
        let expected: Vec<String> =
            wrap_text(&text, get_metrics(&geometry.font), &geometry)
                .into_iter()
                .map(|l| l.text)
                .collect();

        let rendered = render(&text, &geometry).unwrap();
        let actual: Vec<String> = rendered.lines().map(str::to_string).collect();
        assert_eq!(actual, expected, "no line dropped or duplicated");
    }

    #[test]
    fn test_pages_numbered_and_start_at_margins() {
        let geometry = narrow();
        let rendered = render(&"word ".repeat(300), &geometry).unwrap();
        for (i, page) in rendered.pages.iter().enumerate() {
            assert_eq!(page.number, i + 1);
            assert_eq!(page.origin, Point { x: 10.0, y: 10.0 });
            assert_eq!(page.max_width, 20.0);
        }
    }

    #[test]
    fn test_baselines_stay_within_printable_height() {
        let geometry = narrow();
        let rendered = render(&"word ".repeat(300), &geometry).unwrap();
        for page in &rendered.pages {
            let last = page.baseline(page.lines.len() - 1);
            assert!(last <= geometry.printable_bottom() + 1e-3);
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let text = "Dear team,\n\nI build reliable systems. ".repeat(50);
        let geometry = PageGeometry::a4_export();
        assert_eq!(
            render(&text, &geometry).unwrap(),
            render(&text, &geometry).unwrap()
        );
    }

    #[test]
    fn test_literal_mode_keeps_markdown_syntax() {
        let rendered = render("# Jane Doe\n- **Rust**", &PageGeometry::a4_export()).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines, vec!["# Jane Doe", "- **Rust**"]);
    }

    #[test]
    fn test_stripped_mode_lays_out_plain_text() {
        let geometry = PageGeometry::a4_export().with_markdown(MarkdownMode::Stripped);
        let rendered = render("# Jane Doe\n- **Rust**", &geometry).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines, vec!["Jane Doe", "\u{2022} Rust"]);
    }

    #[test]
    fn test_invalid_geometry_is_an_error() {
        let geometry = PageGeometry::a4_export().with_max_width(-5.0);
        assert!(matches!(
            render("text", &geometry),
            Err(RenderError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_unencodable_characters_are_reported() {
        let rendered = render("Résumé \u{2014} 日本語 🚀", &PageGeometry::a4_export()).unwrap();
        assert_eq!(
            rendered.warnings,
            vec![RenderWarning::UnencodableCharacters { count: 4 }]
        );
        assert_eq!(rendered.lines().collect::<Vec<_>>(), vec!["Résumé \u{2014} 日本語 🚀"]);
    }

    #[test]
    fn test_win_ansi_text_renders_without_warnings() {
        let rendered = render("\u{0160}koda \u{0152}uvre \u{2122}", &PageGeometry::a4_export()).unwrap();
        assert!(rendered.warnings.is_empty());
    }

    #[test]
    fn test_tiny_font_is_rejected_not_allocated() {
        let mut geometry = PageGeometry::a4_export();
        geometry.font_size_pt = 1e-12;
        assert!(matches!(
            render("hello world", &geometry),
            Err(RenderError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_paginate_with_huge_page_capacity_only_allocates_used_lines() {
        let mut geometry = PageGeometry::a4_export();
        geometry.font_size_pt = 1e-12;
        let lines = vec![
            WrappedLine { text: "hello".to_string(), width: 1.0 },
            WrappedLine { text: "world".to_string(), width: 1.0 },
        ];
        let pages = paginate(lines, &geometry);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].lines, vec!["hello", "world"]);
    }

    #[test]
    fn test_paginate_empty_lines_produces_no_pages() {
        assert!(paginate(Vec::new(), &PageGeometry::a4_export()).is_empty());
    }
}
