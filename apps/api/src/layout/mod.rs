// Text layout for PDF export: font metrics, greedy word wrap, pagination.
// CPU-bound rendering must run inside tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod geometry;
pub mod markdown;
pub mod pages;
pub mod wrap;

// Re-export the public API consumed by the exporter and handlers.
pub use font_metrics::FontFamily;
pub use geometry::{mm_to_pt, MarkdownMode, PageGeometry};
pub use pages::{render, Page, RenderError, RenderWarning, Rendered};
