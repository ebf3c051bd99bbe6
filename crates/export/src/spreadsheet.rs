//! Spreadsheet (xlsx) report writer.
//!
//! One sheet, two regions: a key/value summary block at the top, one blank
//! separator row, then the full report projection table. The table's price
//! column is number-formatted with thousands separators, and every column is
//! sized to its widest cell or header plus two character-widths.

use crate::ExportResult;
use npay_core::format::{format_count, format_won};
use npay_core::{ItemStats, Record};
use rust_xlsxwriter::{Format, Workbook};

/// Sheet name shared by both regions.
const SHEET_NAME: &str = "분석 리포트";

/// Labels of the summary block, in row order.
const SUMMARY_LABELS: [&str; 6] = [
    "분석 항목명",
    "평균 가격",
    "중앙값",
    "최저가",
    "최고가",
    "취급 병원 수",
];

/// Extra character-widths added to every auto-sized column.
const COLUMN_PADDING: f64 = 2.0;

/// Build the xlsx report for one analysed item.
///
/// `rows` must already be the report projection (price descending, stable);
/// the writer does not reorder them, so the exported table matches the
/// on-screen table row for row.
pub fn render(item_name: &str, stats: &ItemStats, rows: &[&Record]) -> ExportResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    // Summary region: header at row 0, six key/value pairs below it.
    let values = [
        item_name.to_owned(),
        format_won(stats.mean),
        format_won(stats.median),
        format_won(stats.min),
        format_won(stats.max),
        format_count(stats.count),
    ];
    worksheet.write_string(0, 0, "항목")?;
    worksheet.write_string(0, 1, "값")?;
    for (i, (label, value)) in SUMMARY_LABELS.iter().zip(values.iter()).enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, *label)?;
        worksheet.write_string(row, 1, value)?;
    }

    // Table region starts after the summary and one blank separator row.
    let with_codes = rows.iter().any(|r| r.item_code.is_some());
    let mut headers = vec!["item_name", "hospital_name", "price"];
    if with_codes {
        headers.push("npay_code");
    }

    let table_start = (SUMMARY_LABELS.len() + 2) as u32;
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(table_start, col as u16, *header)?;
    }

    let price_format = Format::new().set_num_format("#,##0");
    for (i, record) in rows.iter().enumerate() {
        let row = table_start + 1 + i as u32;
        worksheet.write_string(row, 0, &record.item_name)?;
        worksheet.write_string(row, 1, &record.hospital_name)?;
        worksheet.write_number_with_format(row, 2, record.price, &price_format)?;
        if with_codes {
            worksheet.write_string(row, 3, record.item_code.as_deref().unwrap_or(""))?;
        }
    }

    // Auto-size from the table region, widest cell or header per column.
    for (col, header) in headers.iter().enumerate() {
        let widest = rows
            .iter()
            .map(|r| cell_text(r, col).chars().count())
            .max()
            .unwrap_or(0)
            .max(header.chars().count());
        worksheet.set_column_width(col as u16, widest as f64 + COLUMN_PADDING)?;
    }

    let bytes = workbook.save_to_buffer()?;
    tracing::debug!(item = item_name, rows = rows.len(), "spreadsheet report built");
    Ok(bytes)
}

fn cell_text(record: &Record, col: usize) -> String {
    match col {
        0 => record.item_name.clone(),
        1 => record.hospital_name.clone(),
        2 => record.price.to_string(),
        _ => record.item_code.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx};
    use npay_core::{aggregate, report_projection};

    fn record(item: &str, hospital: &str, price: f64) -> Record {
        Record {
            item_name: item.into(),
            hospital_name: hospital.into(),
            price,
            item_code: None,
        }
    }

    fn render_sample() -> (Vec<&'static Record>, Vec<u8>) {
        // Leak a tiny fixture so the projection can borrow it for the test's
        // lifetime without a self-referential struct.
        let records: &'static [Record] = Box::leak(Box::new([
            record("도수치료", "A병원", 100_000.0),
            record("도수치료", "삼성서울병원", 150_000.0),
            record("도수치료", "B병원", 80_000.0),
        ]));
        let rows: Vec<&Record> = records.iter().collect();
        let projected = report_projection(&rows);
        let stats = aggregate(&rows).unwrap();
        let bytes = render("도수치료", &stats, &projected).unwrap();
        (projected, bytes)
    }

    #[test]
    fn test_round_trip_preserves_report_projection_order() {
        let (projected, bytes) = render_sample();

        let mut workbook = Xlsx::new(std::io::Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range("분석 리포트").unwrap();

        // Table header sits after 7 summary rows and 1 blank row.
        let rows: Vec<_> = range.rows().collect();
        let header_idx = rows
            .iter()
            .position(|r| r.first() == Some(&Data::String("item_name".into())))
            .expect("table header present");
        assert_eq!(header_idx, 8);

        let exported: Vec<(String, f64)> = rows[header_idx + 1..]
            .iter()
            .map(|r| {
                let hospital = match &r[1] {
                    Data::String(s) => s.clone(),
                    other => panic!("unexpected cell: {other:?}"),
                };
                let price = match &r[2] {
                    Data::Float(f) => *f,
                    Data::Int(i) => *i as f64,
                    other => panic!("unexpected cell: {other:?}"),
                };
                (hospital, price)
            })
            .collect();

        let expected: Vec<(String, f64)> = projected
            .iter()
            .map(|r| (r.hospital_name.clone(), r.price))
            .collect();
        assert_eq!(exported, expected);
    }

    #[test]
    fn test_summary_block_is_formatted_and_truncated() {
        let records = [
            record("주사", "A병원", 10_500.9),
            record("주사", "B병원", 20_000.0),
        ];
        let rows: Vec<&Record> = records.iter().collect();
        let stats = aggregate(&rows).unwrap();
        let bytes = render("주사", &stats, &report_projection(&rows)).unwrap();

        let mut workbook = Xlsx::new(std::io::Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range("분석 리포트").unwrap();
        let cell = |row: u32, col: u32| match range.get_value((row, col)) {
            Some(Data::String(s)) => s.clone(),
            other => panic!("unexpected cell at ({row},{col}): {other:?}"),
        };

        assert_eq!(cell(0, 0), "항목");
        assert_eq!(cell(1, 1), "주사");
        // mean = 15,250.45 → truncated, not rounded
        assert_eq!(cell(2, 1), "15,250 원");
        assert_eq!(cell(6, 1), "2 곳");
    }

    #[test]
    fn test_code_column_only_present_when_codes_exist() {
        let (_, bytes) = render_sample();
        let mut workbook = Xlsx::new(std::io::Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range("분석 리포트").unwrap();
        let header_row: Vec<_> = range.rows().nth(8).unwrap().to_vec();
        assert_eq!(header_row.len(), 3);
    }
}
