// 📂 Source Reader
// Loads the rows of a sales export (CSV or Excel) into memory as plain string cells

use calamine::{open_workbook_auto, Data, Range, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::debug;

use crate::config::ColumnRef;
use crate::error::{ImportError, Result};

// ============================================================================
// CORE TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    /// 1-based line (CSV) or row (spreadsheet) number in the original file
    pub line_number: usize,
    pub cells: Vec<String>,
}

impl SourceRow {
    pub fn new(line_number: usize, cells: Vec<String>) -> Self {
        SourceRow { line_number, cells }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }
}

/// Every row of one export, plus its header row when it has one.
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub headers: Option<Vec<String>>,
    pub rows: Vec<SourceRow>,
}

impl SourceTable {
    pub fn new(headers: Option<Vec<String>>, rows: Vec<SourceRow>) -> Self {
        SourceTable { headers, rows }
    }

    /// Turn a column reference into a cell index. Header names compare
    /// case-insensitively after trimming.
    pub fn resolve_column(&self, column: &ColumnRef) -> Result<usize> {
        match column {
            ColumnRef::Index(index) => Ok(*index),
            ColumnRef::Name(name) => {
                let headers = self.headers.as_ref().ok_or_else(|| {
                    ImportError::Config(format!(
                        "memo column '{}' is a header name but the source has no header row",
                        name
                    ))
                })?;

                headers
                    .iter()
                    .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
                    .ok_or_else(|| ImportError::Config(format!("no column named '{}'", name)))
            }
        }
    }
}

// ============================================================================
// READERS
// ============================================================================

/// Read a CSV or spreadsheet export, picked by file extension.
pub fn read_rows(path: &Path, has_headers: bool) -> Result<SourceTable> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => read_csv(path, has_headers),
        "xlsx" | "xlsm" | "xls" | "ods" => read_workbook(path, has_headers),
        _ => Err(ImportError::UnsupportedFile(path.display().to_string())),
    }
}

pub fn read_csv(path: &Path, has_headers: bool) -> Result<SourceTable> {
    let file = File::open(path).map_err(|e| ImportError::io(path, e))?;

    // Sales exports have section rows with fewer columns than line rows
    let mut reader = ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .from_reader(file);

    let headers = if has_headers {
        Some(reader.headers()?.iter().map(str::to_string).collect())
    } else {
        None
    };

    let offset = if has_headers { 2 } else { 1 };
    let mut rows = Vec::new();

    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let line_number = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(index + offset);

        rows.push(SourceRow::new(
            line_number,
            record.iter().map(str::to_string).collect(),
        ));
    }

    debug!(path = %path.display(), rows = rows.len(), "read csv export");
    Ok(SourceTable::new(headers, rows))
}

pub fn read_workbook(path: &Path, has_headers: bool) -> Result<SourceTable> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportError::EmptyWorkbook(path.to_path_buf()))?;

    let range = workbook.worksheet_range(&sheet_name)?;
    let table = table_from_range(&range, has_headers);

    debug!(path = %path.display(), sheet = %sheet_name, rows = table.rows.len(), "read workbook export");
    Ok(table)
}

/// Rows of a worksheet range, anchored at A1. calamine trims leading empty
/// rows and columns, so cells are padded back to their sheet column and
/// line numbers shifted to the sheet row.
fn table_from_range(range: &Range<Data>, has_headers: bool) -> SourceTable {
    let (first_row, first_col) = range
        .start()
        .map(|(row, col)| (row as usize, col as usize))
        .unwrap_or((0, 0));

    let mut cells = range.rows().map(|row| {
        let mut cells = vec![String::new(); first_col];
        cells.extend(row.iter().map(cell_to_string));
        cells
    });

    let headers = if has_headers { cells.next() } else { None };
    let offset = first_row + if has_headers { 2 } else { 1 };

    let rows: Vec<SourceRow> = cells
        .enumerate()
        .map(|(index, row)| SourceRow::new(index + offset, row))
        .collect();

    SourceTable::new(headers, rows)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{:.0}", f)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERROR: {:?}", e),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
