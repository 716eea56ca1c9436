//! Report writers: CSV, JSON and the styled XLSX workbook.

use csv::Writer;
use rust_xlsxwriter::{Format, FormatAlign, Workbook, XlsxError};
use serde_json::{Map, Value};

use super::resource::Cell;
use crate::config::EXPORT_SHEET_NAME;
use crate::errors::{AppError, AppResult};

fn xlsx_error(err: XlsxError) -> AppError {
    AppError::Export(format!("XLSX export failed: {}", err))
}

/// CSV with a header row
pub fn write_csv(headers: &[&str], rows: &[Vec<Cell>]) -> AppResult<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());

    writer
        .write_record(headers)
        .map_err(|e| AppError::Export(format!("Failed to write CSV headers: {}", e)))?;
    for row in rows {
        let values: Vec<String> = row.iter().map(Cell::display).collect();
        writer
            .write_record(&values)
            .map_err(|e| AppError::Export(format!("Failed to write CSV row: {}", e)))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Export(format!("Failed to get CSV output: {}", e)))
}

/// Array of objects keyed by column header, in column order
pub fn write_json(headers: &[&str], rows: &[Vec<Cell>]) -> AppResult<Vec<u8>> {
    let records: Vec<Value> = rows
        .iter()
        .map(|row| {
            let object: Map<String, Value> = headers
                .iter()
                .zip(row)
                .map(|(header, cell)| {
                    let value = match cell {
                        Cell::Number(n) => Value::from(*n),
                        Cell::Text(s) => Value::from(s.as_str()),
                        Cell::Empty => Value::Null,
                    };
                    (header.to_string(), value)
                })
                .collect();
            Value::Object(object)
        })
        .collect();

    serde_json::to_vec_pretty(&records)
        .map_err(|e| AppError::Export(format!("JSON export failed: {}", e)))
}

/// Single-sheet workbook: bold centered header, frozen first row and
/// columns sized to their longest value.
pub fn write_xlsx(headers: &[&str], rows: &[Vec<Cell>]) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new()
        .set_bold()
        .set_font_size(12)
        .set_align(FormatAlign::Center);

    let sheet = workbook.add_worksheet();
    sheet.set_name(EXPORT_SHEET_NAME).map_err(xlsx_error)?;

    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(xlsx_error)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let row_num = (index + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                Cell::Number(n) => {
                    sheet
                        .write_number(row_num, col as u16, *n as f64)
                        .map_err(xlsx_error)?;
                }
                Cell::Text(s) => {
                    sheet
                        .write_string(row_num, col as u16, s.as_str())
                        .map_err(xlsx_error)?;
                }
                Cell::Empty => {}
            }
        }
    }

    for (col, width) in column_widths(headers, rows).into_iter().enumerate() {
        sheet
            .set_column_width(col as u16, width as f64)
            .map_err(xlsx_error)?;
    }
    sheet.set_freeze_panes(1, 0).map_err(xlsx_error)?;

    workbook.save_to_buffer().map_err(xlsx_error)
}

/// Longest value per column (header included) plus two characters
pub fn column_widths(headers: &[&str], rows: &[Vec<Cell>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let longest = rows
                .iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.display().chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0);
            longest + 2
        })
        .collect()
}
