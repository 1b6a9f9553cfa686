use crate::cell::CellValue;
use crate::error::{Result, TableError};
use crate::table::{unique_headers, Row, Table};
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use std::path::Path;

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::empty(),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Int(i) => CellValue::from(*i),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(dt) => excel_serial_to_text(dt.as_f64())
            .map(CellValue::Text)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// Render an Excel serial date as `yyyy-mm-dd`, adding the time of day when
/// it is not midnight.
///
/// Excel stores dates as days since 1899-12-30.
fn excel_serial_to_text(serial: f64) -> Option<String> {
    let epoch: NaiveDateTime = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round();
    if !millis.is_finite() {
        return None;
    }
    let moment = epoch.checked_add_signed(TimeDelta::try_milliseconds(millis as i64)?)?;

    if moment.num_seconds_from_midnight() == 0 {
        Some(moment.format("%Y-%m-%d").to_string())
    } else {
        Some(moment.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

fn is_blank(cells: &[Data]) -> bool {
    cells.iter().all(|d| match d {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    })
}

/// Build a table from a worksheet range.
///
/// The first row names the columns; fully blank rows are skipped.
pub fn table_from_range(range: &Range<Data>) -> Table {
    let mut rows = range.rows();

    let Some(header_row) = rows.next() else {
        return Table::default();
    };
    let headers = unique_headers(header_row.iter().map(|d| data_to_cell_value(d).as_text()));

    let records: Vec<Row> = rows
        .filter(|cells| !is_blank(cells))
        .map(|cells| {
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| {
                    let value = cells.get(i).map(data_to_cell_value).unwrap_or_default();
                    (h.clone(), value)
                })
                .collect()
        })
        .collect();

    Table::from_records(headers, records)
}

impl Table {
    /// Load a table from the first worksheet of an `.xlsx` or `.xls` file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened, has no worksheets, or the
    /// first worksheet cannot be read.
    pub fn from_spreadsheet<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut workbook =
            open_workbook_auto(path).map_err(|e| TableError::Decode(e.to_string()))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(TableError::NoWorksheets)?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| TableError::Decode(e.to_string()))?;

        let table = table_from_range(&range);
        tracing::info!(
            path = %path.display(),
            sheet = %sheet_name,
            columns = table.col_count(),
            rows = table.row_count(),
            "Decoded spreadsheet"
        );
        Ok(table)
    }
}
