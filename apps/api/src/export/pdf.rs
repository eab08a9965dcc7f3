//! PDF encoding of laid-out pages with `lopdf`.
//!
//! One content stream per page, one shared standard Type1 font, WinAnsi
//! encoding. No timestamps or IDs are written, so identical pages encode to
//! identical bytes.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document as PdfDocument, Object, Stream};

use crate::export::ExportError;
use crate::layout::font_metrics::win_ansi_byte;
use crate::layout::{mm_to_pt, Page, PageGeometry};

const FONT_RESOURCE: &str = "F1";

/// Encodes `pages` as a single PDF. An empty slice yields one blank page so the
/// artifact is always a valid document.
pub fn encode_pdf(pages: &[Page], geometry: &PageGeometry) -> Result<Vec<u8>, ExportError> {
    let mut pdf = PdfDocument::with_version("1.5");
    let pages_id = pdf.new_object_id();

    let font_id = pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => geometry.font.base_font_name(),
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = pdf.add_object(dictionary! {
        "Font" => dictionary! { FONT_RESOURCE => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len().max(1));
    let blank: &[String] = &[];
    let page_lines: Vec<&[String]> = if pages.is_empty() {
        vec![blank]
    } else {
        pages.iter().map(|p| p.lines.as_slice()).collect()
    };

    for (index, lines) in page_lines.into_iter().enumerate() {
        let content = page_content(lines, pages.get(index), geometry);
        let content_id = pdf.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = pdf.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    pdf.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                mm_to_pt(geometry.page_width).into(),
                mm_to_pt(geometry.page_height).into(),
            ],
        }),
    );

    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    pdf.trailer.set("Root", catalog_id);
    pdf.compress();

    let mut bytes = Vec::new();
    pdf.save_to(&mut bytes)?;
    Ok(bytes)
}

/// Builds the content stream for one page: one text object per line, each
/// positioned absolutely at its baseline. PDF y grows upwards, layout y downwards.
fn page_content(lines: &[String], page: Option<&Page>, geometry: &PageGeometry) -> Content {
    let mut operations = Vec::with_capacity(lines.len() * 5);
    let page_height_pt = mm_to_pt(geometry.page_height);

    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let baseline = match page {
            Some(p) => p.baseline(i),
            None => geometry.margin_top,
        };
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![FONT_RESOURCE.into(), geometry.font_size_pt.into()],
        ));
        operations.push(Operation::new(
            "Td",
            vec![
                mm_to_pt(geometry.margin_left).into(),
                (page_height_pt - mm_to_pt(baseline)).into(),
            ],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(line))],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    Content { operations }
}

/// Maps text to WinAnsi bytes. Tabs print as spaces; characters the encoding
/// lacks become `?` (`render` has already reported them).
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' => b' ',
            _ => win_ansi_byte(c).unwrap_or(b'?'),
        })
        .collect()
}
