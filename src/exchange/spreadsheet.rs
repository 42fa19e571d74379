//! xlsx import and export with a "Источник" / "Температура" column pair.

use crate::{
    TcwError, TcwResult, Temperature,
    config::{EXPORT_SHEET_NAME, SOURCE_COLUMN, TEMPERATURE_COLUMN},
    core::domain::model::pending_update::TemperatureInput,
};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::{DateTime, TimeZone};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};
use std::path::{Path, PathBuf};

/// One exported row; a source without a value exports a blank cell.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureRow {
    pub source: String,
    pub temperature: Option<f64>,
}

impl TemperatureRow {
    pub fn new(source: impl Into<String>, temperature: Option<f64>) -> Self {
        Self {
            source: source.into(),
            temperature,
        }
    }
}

/// Reads source temperatures from the first sheet of a workbook.
///
/// Rows with a missing, non-numeric or out-of-range temperature are skipped.
///
/// # Errors
/// `TcwError::Spreadsheet` if the file cannot be read or a header is missing.
pub fn import_temperatures(path: &Path) -> TcwResult<Vec<TemperatureInput>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| TcwError::Spreadsheet(format!("Cannot open {}: {}", path.display(), e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TcwError::Spreadsheet("Workbook has no sheets".to_string()))?
        .map_err(|e| TcwError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| TcwError::Spreadsheet("Sheet is empty".to_string()))?;
    let source_col = column_index(header, SOURCE_COLUMN)?;
    let temperature_col = column_index(header, TEMPERATURE_COLUMN)?;

    let mut inputs = Vec::new();
    let mut skipped = 0usize;
    for row in rows {
        let source = row
            .get(source_col)
            .map(|cell| cell.to_string().trim().to_string())
            .unwrap_or_default();
        let temperature = row
            .get(temperature_col)
            .and_then(cell_number)
            .and_then(|value| Temperature::from_value(value).ok());

        match temperature {
            Some(temperature) if !source.is_empty() => {
                inputs.push(TemperatureInput::new(source, temperature));
            }
            _ => skipped += 1,
        }
    }

    tracing::info!(
        path = %path.display(),
        imported = inputs.len(),
        skipped,
        "Temperatures imported"
    );
    Ok(inputs)
}

/// Writes `rows` to an xlsx file, appending the `.xlsx` extension when missing.
///
/// Returns the path actually written.
pub fn export_temperatures(rows: &[TemperatureRow], path: &Path) -> TcwResult<PathBuf> {
    let path = with_xlsx_extension(path);
    write_workbook(rows, &path).map_err(|e| TcwError::Spreadsheet(e.to_string()))?;
    tracing::info!(path = %path.display(), rows = rows.len(), "Temperatures exported");
    Ok(path)
}

/// `temperature_data_YYYYmmdd_HHMMSS.xlsx` for the given moment.
pub fn default_export_file_name<Tz>(now: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    now.format("temperature_data_%Y%m%d_%H%M%S.xlsx").to_string()
}

fn write_workbook(rows: &[TemperatureRow], path: &Path) -> Result<(), XlsxError> {
    let header_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_background_color(Color::RGB(0xE0E0E0))
        .set_border(FormatBorder::Thin);
    let data_format = Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin);
    let number_format = data_format.clone().set_num_format("0.00");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(EXPORT_SHEET_NAME)?;

    worksheet.write_string_with_format(0, 0, SOURCE_COLUMN, &header_format)?;
    worksheet.write_string_with_format(0, 1, TEMPERATURE_COLUMN, &header_format)?;

    for (row_num, row) in (1u32..).zip(rows) {
        worksheet.write_string_with_format(row_num, 0, &row.source, &data_format)?;
        match row.temperature {
            Some(value) => {
                worksheet.write_number_with_format(row_num, 1, value, &number_format)?;
            }
            None => {
                worksheet.write_blank(row_num, 1, &data_format)?;
            }
        }
    }

    worksheet.set_column_width(0, 30)?;
    worksheet.set_column_width(1, 15)?;
    workbook.save(path)
}

fn column_index(header: &[Data], name: &str) -> TcwResult<usize> {
    header
        .iter()
        .position(|cell| cell.to_string().trim() == name)
        .ok_or_else(|| TcwError::Spreadsheet(format!("Column '{}' not found", name)))
}

fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(value) => Some(*value),
        Data::Int(value) => Some(*value as f64),
        Data::String(text) => text.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

fn with_xlsx_extension(path: &Path) -> PathBuf {
    let has_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    if has_extension {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".xlsx");
        PathBuf::from(name)
    }
}
