//! Document (PDF) report writer. Compiled only with the `document-export`
//! feature.
//!
//! Single A4 page with ASCII-only static labels, the price statistics as plain
//! text lines, and a bordered two-column table of the report projection
//! (hospital name truncated to 30 characters, right-aligned comma-grouped
//! price). The writer first tries the configured Hangul-capable font file; when
//! that is unreadable it falls back to built-in Helvetica, which can only
//! render Latin text. Hospital names may then render incorrectly; that is an
//! accepted, environment-dependent limitation.

use crate::{DocumentReport, ExportError, ExportResult};
use npay_core::constants::DOCUMENT_HOSPITAL_NAME_WIDTH;
use npay_core::format::{format_krw, format_price_plain, truncate_chars};
use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const ROW_HEIGHT_MM: f32 = 7.0;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 10.0;

/// Approximate advance width of one glyph in millimetres, used to right-align
/// prices without shaping the text. Digits in both fonts are close to 0.55 em.
fn glyph_advance_mm(font_size: f32) -> f32 {
    font_size * 0.55 * 0.3528
}

/// Render the single-page PDF report.
///
/// Rows that do not fit on the page are omitted; the report is defined as a
/// single page.
pub fn render(report: &DocumentReport<'_>) -> ExportResult<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        "Non-covered Medical Items Analysis Report",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let layer = doc.get_page(page).get_layer(layer);

    let font = match std::fs::File::open(report.font_path) {
        Ok(mut file) => doc
            .add_external_font(&mut file)
            .map_err(|e| ExportError::Document(e.to_string()))?,
        Err(error) => {
            tracing::warn!(
                path = %report.font_path.display(),
                %error,
                "document font unavailable; using Latin-only fallback"
            );
            doc.add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| ExportError::Document(e.to_string()))?
        }
    };

    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;
    layer.use_text(
        "Non-covered Medical Items Analysis Report",
        TITLE_SIZE,
        Mm(MARGIN_MM),
        Mm(y),
        &font,
    );
    y -= 12.0;
    layer.use_text(
        format!("Item: {}", report.item_name),
        BODY_SIZE + 2.0,
        Mm(MARGIN_MM),
        Mm(y),
        &font,
    );

    y -= 12.0;
    layer.use_text("Price Statistics", BODY_SIZE + 2.0, Mm(MARGIN_MM), Mm(y), &font);
    y -= 8.0;
    let stats = report.stats;
    let lines = [
        format!("Average price: {}", format_krw(stats.mean)),
        format!("Median price: {}", format_krw(stats.median)),
        format!("Lowest price: {}", format_krw(stats.min)),
        format!("Highest price: {}", format_krw(stats.max)),
        format!("Hospital count: {}", stats.count),
    ];
    for line in &lines {
        layer.use_text(line.as_str(), BODY_SIZE, Mm(MARGIN_MM), Mm(y), &font);
        y -= 6.0;
    }

    y -= 6.0;
    layer.use_text("Hospital Price List", BODY_SIZE + 2.0, Mm(MARGIN_MM), Mm(y), &font);
    y -= 8.0;

    draw_table(&layer, &font, report, y)?;

    doc.save_to_bytes()
        .map_err(|e| ExportError::Document(e.to_string()))
}

fn draw_table(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    report: &DocumentReport<'_>,
    top: f32,
) -> ExportResult<()> {
    let left = MARGIN_MM;
    let right = PAGE_WIDTH_MM - MARGIN_MM;
    let divider = left + 110.0;

    let capacity = ((top - MARGIN_MM) / ROW_HEIGHT_MM).floor() as usize;
    let row_count = report.rows.len().min(capacity.saturating_sub(1));

    // Header row.
    let mut y = top;
    layer.use_text("Hospital", BODY_SIZE, Mm(left + 2.0), Mm(y - 5.0), font);
    layer.use_text("Price", BODY_SIZE, Mm(divider + 2.0), Mm(y - 5.0), font);

    for record in report.rows.iter().take(row_count) {
        y -= ROW_HEIGHT_MM;
        let name = truncate_chars(&record.hospital_name, DOCUMENT_HOSPITAL_NAME_WIDTH);
        layer.use_text(name, BODY_SIZE, Mm(left + 2.0), Mm(y - 5.0), font);

        let price = format_price_plain(record.price);
        let text_width = price.chars().count() as f32 * glyph_advance_mm(BODY_SIZE);
        layer.use_text(price, BODY_SIZE, Mm(right - 2.0 - text_width), Mm(y - 5.0), font);
    }

    // Borders: horizontal rule per row plus the three verticals.
    layer.set_outline_thickness(0.5);
    let bottom = top - (row_count as f32 + 1.0) * ROW_HEIGHT_MM;
    let mut rule_y = top;
    while rule_y >= bottom - 0.01 {
        draw_line(layer, (left, rule_y), (right, rule_y));
        rule_y -= ROW_HEIGHT_MM;
    }
    for x in [left, divider, right] {
        draw_line(layer, (x, top), (x, bottom));
    }

    Ok(())
}

fn draw_line(layer: &PdfLayerReference, from: (f32, f32), to: (f32, f32)) {
    let line = Line {
        points: vec![
            (Point::new(Mm(from.0), Mm(from.1)), false),
            (Point::new(Mm(to.0), Mm(to.1)), false),
        ],
        is_closed: false,
    };
    layer.add_line(line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use npay_core::{aggregate, report_projection, Record};
    use std::path::Path;

    fn record(hospital: &str, price: f64) -> Record {
        Record {
            item_name: "도수치료".into(),
            hospital_name: hospital.into(),
            price,
            item_code: None,
        }
    }

    #[test]
    fn test_render_falls_back_without_font_file() {
        let records = [record("Seoul Medical", 150_000.0), record("Busan Clinic", 90_000.0)];
        let rows: Vec<&Record> = records.iter().collect();
        let projected = report_projection(&rows);
        let stats = aggregate(&rows).unwrap();

        let report = DocumentReport {
            item_name: "도수치료",
            stats: &stats,
            rows: &projected,
            font_path: Path::new("definitely/not/a/font.ttf"),
        };
        let bytes = render(&report).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_handles_long_hospital_names() {
        let long_name = "H".repeat(60);
        let records = [record(&long_name, 1_000.0)];
        let rows: Vec<&Record> = records.iter().collect();
        let projected = report_projection(&rows);
        let stats = aggregate(&rows).unwrap();

        let report = DocumentReport {
            item_name: "주사",
            stats: &stats,
            rows: &projected,
            font_path: Path::new("missing.ttf"),
        };
        assert!(render(&report).is_ok());
    }
}
