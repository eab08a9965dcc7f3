//! Page geometry for text export. All lengths are millimetres.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::FontFamily;
use crate::layout::RenderError;

/// Millimetres per PostScript point.
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// Smallest baseline distance `validate` accepts (about 1.4pt).
pub const MIN_LINE_HEIGHT_MM: f32 = 0.5;

pub fn mm_to_pt(mm: f32) -> f32 {
    mm / MM_PER_PT
}

/// How markdown syntax in the source text is treated when laying out pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkdownMode {
    /// Syntax characters (`#`, `**`, `- `) are printed as-is.
    #[default]
    Literal,
    /// Block and inline markers are removed before wrapping.
    Stripped,
}

/// Layout parameters for one exported document.
///
/// Text starts at `(margin_left, margin_top)`; each wrapped line is at most
/// `max_width` wide and baselines advance by `line_height()`. A page is full
/// once the next baseline would pass `page_height - margin_bottom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_left: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub max_width: f32,
    pub font: FontFamily,
    pub font_size_pt: f32,
    /// Baseline distance as a multiple of the font size.
    pub line_height_factor: f32,
    pub markdown: MarkdownMode,
}

impl PageGeometry {
    /// Fixed geometry for `downloadPdfs`: A4 portrait, 10mm margins, 180mm
    /// line width, Helvetica 16pt with 1.15 line spacing.
    pub fn a4_export() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin_left: 10.0,
            margin_top: 10.0,
            margin_bottom: 10.0,
            max_width: 180.0,
            font: FontFamily::Helvetica,
            font_size_pt: 16.0,
            line_height_factor: 1.15,
            markdown: MarkdownMode::Literal,
        }
    }

    pub fn with_max_width(mut self, max_width: f32) -> Self {
        self.max_width = max_width;
        self
    }

    pub fn with_markdown(mut self, markdown: MarkdownMode) -> Self {
        self.markdown = markdown;
        self
    }

    /// Size of one em in millimetres.
    pub fn font_size_mm(&self) -> f32 {
        self.font_size_pt * MM_PER_PT
    }

    pub fn line_height(&self) -> f32 {
        self.font_size_mm() * self.line_height_factor
    }

    /// Lowest y a baseline may occupy.
    pub fn printable_bottom(&self) -> f32 {
        self.page_height - self.margin_bottom
    }

    /// Number of baselines that fit between the top margin and the printable bottom.
    pub fn lines_per_page(&self) -> usize {
        let span = self.printable_bottom() - self.margin_top;
        // float-to-int casts saturate; a degenerate line height must not overflow
        ((span / self.line_height()).floor() as usize).saturating_add(1)
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        let positive = [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("max_width", self.max_width),
            ("font_size_pt", self.font_size_pt),
            ("line_height_factor", self.line_height_factor),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(RenderError::InvalidGeometry(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if !(self.line_height() >= MIN_LINE_HEIGHT_MM) {
            return Err(RenderError::InvalidGeometry(format!(
                "line height {}mm is below the {MIN_LINE_HEIGHT_MM}mm minimum",
                self.line_height()
            )));
        }
        if self.margin_left < 0.0 || self.margin_top < 0.0 || self.margin_bottom < 0.0 {
            return Err(RenderError::InvalidGeometry(
                "margins must not be negative".to_string(),
            ));
        }
        if self.printable_bottom() < self.margin_top {
            return Err(RenderError::InvalidGeometry(format!(
                "no printable height: top margin {} is below bottom limit {}",
                self.margin_top,
                self.printable_bottom()
            )));
        }
        Ok(())
    }
}
