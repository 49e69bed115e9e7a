// Evaluation row extraction and results/template emission
//
// Import: scan the first sheet row by row from row 1 (row 0 is the
// header), stopping at the first fully blank row. Export: one
// single-sheet workbook, every data cell written as text so identifiers
// like "03" survive Excel's numeric auto-formatting.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use rust_xlsxwriter::Workbook as XlsxWorkbook;

use haengbal_model::{validate, ColumnLayout, EvaluationRecord, SchoolCategory, HEADER_SENTINEL};

use crate::error::{ParseError, WriteError};
use crate::layout;

/// Number of pre-numbered blank rows in an input template
pub const TEMPLATE_ROWS: u32 = 30;

/// Row number substituted when the very first data row has a blank
/// number cell
const INITIAL_NUMBER: &str = "1";

/// What the writer needs from an uploaded workbook to echo its look:
/// sheet name, header labels of the input columns, column widths.
#[derive(Debug, Clone)]
pub struct SourceSheet {
    pub name: String,
    /// Header-row label per input column, in `input_cols()` order.
    /// None where the source header cell was empty.
    pub header_labels: Vec<Option<String>>,
    /// Zero-based column index → Excel character-width units,
    /// recovered from the raw worksheet XML.
    pub col_widths: HashMap<usize, f64>,
}

/// Result of reading an uploaded workbook
#[derive(Debug)]
pub struct ImportResult {
    /// Emitted records, in file row order
    pub records: Vec<EvaluationRecord>,
    /// Source metadata for a later `write_results` call
    pub source: SourceSheet,
    /// Rows skipped inside the data area (blank characteristics or an
    /// embedded duplicate header row)
    pub rows_skipped: usize,
    /// Rows dropped by the minimum-length filter
    pub rows_rejected: usize,
}

/// Read options
#[derive(Debug, Default, Clone)]
pub struct ReadOptions {
    /// Drop rows whose characteristics are shorter than this many
    /// characters. None disables the filter.
    pub min_characteristics_chars: Option<usize>,
}

/// Read an uploaded workbook into ordered evaluation records.
pub fn read(bytes: &[u8], category: SchoolCategory) -> Result<ImportResult, ParseError> {
    read_with_options(bytes, category, &ReadOptions::default())
}

pub fn read_with_options(
    bytes: &[u8],
    category: SchoolCategory,
    options: &ReadOptions,
) -> Result<ImportResult, ParseError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ParseError::Decode(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ParseError::NoSheets)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ParseError::SheetRead {
            sheet: sheet_name.clone(),
            message: e.to_string(),
        })?;

    let col_layout = category.layout();
    let mut records = Vec::new();
    let mut rows_skipped = 0;
    let mut last_number = INITIAL_NUMBER.to_string();
    let mut row: u32 = 1;

    loop {
        // Blank-row probe over columns 0-2 terminates ingestion; rows
        // past the first blank one are never read. Presence is checked
        // on the raw cell, untrimmed: a whitespace-only row keeps
        // ingestion going and falls to the skip rule below instead.
        let all_empty = ColumnLayout::EMPTY_PROBE_COLS
            .clone()
            .all(|col| cell_is_absent(&range, row, col as u32));
        if all_empty {
            break;
        }

        // Rows with no characteristics, and duplicated header rows
        // pasted into the data area, are skipped without emitting.
        // Carry-forward only updates from emitted rows.
        let characteristics = cell_text(&range, row, col_layout.characteristics as u32);
        if characteristics.is_empty() || characteristics == HEADER_SENTINEL {
            rows_skipped += 1;
            row += 1;
            continue;
        }

        let number_cell = cell_text(&range, row, col_layout.number as u32);
        let number = if number_cell.is_empty() {
            last_number.clone()
        } else {
            number_cell
        };

        let mut record = EvaluationRecord {
            number,
            characteristics,
            activity: None,
            result: cell_text(&range, row, col_layout.result_in as u32),
        };
        if let Some(activity_col) = col_layout.activity {
            record.activity = Some(cell_text(&range, row, activity_col as u32));
        }

        last_number = record.number.clone();
        records.push(record);
        row += 1;
    }

    let rows_rejected = match options.min_characteristics_chars {
        Some(min) => {
            let before = records.len();
            records.retain(|r| validate(r, min).is_ok());
            before - records.len()
        }
        None => 0,
    };

    let header_labels = col_layout
        .input_cols()
        .iter()
        .map(|&col| {
            let label = cell_text(&range, 0, col as u32);
            if label.is_empty() {
                None
            } else {
                Some(label)
            }
        })
        .collect();

    Ok(ImportResult {
        records,
        source: SourceSheet {
            name: sheet_name,
            header_labels,
            col_widths: layout::read_col_widths(bytes),
        },
        rows_skipped,
        rows_rejected,
    })
}

/// Stringify and trim one cell; absent cells read as "".
fn cell_text(range: &Range<Data>, row: u32, col: u32) -> String {
    match range.get_value((row, col)) {
        Some(Data::Empty) | None => String::new(),
        Some(value) => value.to_string().trim().to_string(),
    }
}

/// Raw absence check for the blank-row probe. No trimming here, so a
/// cell holding only whitespace still counts as present.
fn cell_is_absent(range: &Range<Data>, row: u32, col: u32) -> bool {
    match range.get_value((row, col)) {
        Some(Data::Empty) | None => true,
        Some(Data::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Write a results workbook: one row per record, placed per the
/// category's column layout, data starting at row 1.
///
/// With a source sheet, its name, input-column header labels and column
/// widths are echoed (matching the original tool, which copies only the
/// input-column headers from an upload and leaves the result header to
/// the synthesized branch). Without one, headers and widths come from
/// the category tables.
pub fn write_results(
    source: Option<&SourceSheet>,
    records: &[EvaluationRecord],
    category: SchoolCategory,
    path: &Path,
) -> Result<(), WriteError> {
    let col_layout = category.layout();
    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook.add_worksheet();

    let sheet_name = source
        .map(|s| s.name.as_str())
        .unwrap_or_else(|| category.sheet_name());
    worksheet
        .set_name(sheet_name)
        .map_err(|e| WriteError::Sheet(e.to_string()))?;

    // Header row
    let input_cols = col_layout.input_cols();
    let default_headers = category.input_headers();
    for (i, &col) in input_cols.iter().enumerate() {
        let label = source
            .and_then(|s| s.header_labels.get(i).cloned().flatten())
            .unwrap_or_else(|| default_headers[i].to_string());
        write_text(worksheet, 0, col as u16, &label)?;
    }
    if source.is_none() {
        write_text(worksheet, 0, col_layout.result_out as u16, "생성결과")?;
    }

    // Column widths: source widths where known, category defaults
    // elsewhere (80 for the result column)
    let mut written_cols = input_cols.clone();
    written_cols.push(col_layout.result_out);
    let default_widths = category.result_col_widths();
    for (i, &col) in written_cols.iter().enumerate() {
        let width = source
            .and_then(|s| s.col_widths.get(&col).copied())
            .unwrap_or(default_widths[i]);
        worksheet
            .set_column_width(col as u16, width)
            .map_err(|e| WriteError::Sheet(e.to_string()))?;
    }

    // Data rows
    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;
        write_text(worksheet, row, col_layout.number as u16, &record.number)?;
        write_text(
            worksheet,
            row,
            col_layout.characteristics as u16,
            &record.characteristics,
        )?;
        if let Some(activity_col) = col_layout.activity {
            write_text(
                worksheet,
                row,
                activity_col as u16,
                record.activity.as_deref().unwrap_or(""),
            )?;
        }
        write_text(worksheet, row, col_layout.result_out as u16, &record.result)?;
    }

    workbook
        .save(path)
        .map_err(|e| WriteError::Save(e.to_string()))
}

/// Write a blank input scaffold: header row plus 30 numbered empty rows.
/// No result column.
pub fn write_template(category: SchoolCategory, path: &Path) -> Result<(), WriteError> {
    let col_layout = category.layout();
    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook.add_worksheet();

    for (&col, label) in col_layout
        .input_cols()
        .iter()
        .zip(category.input_headers())
    {
        write_text(worksheet, 0, col as u16, label)?;
    }
    for (&col, width) in col_layout
        .input_cols()
        .iter()
        .zip(category.input_col_widths())
    {
        worksheet
            .set_column_width(col as u16, width)
            .map_err(|e| WriteError::Sheet(e.to_string()))?;
    }

    for i in 1..=TEMPLATE_ROWS {
        write_text(worksheet, i, col_layout.number as u16, &i.to_string())?;
        write_text(worksheet, i, col_layout.characteristics as u16, "")?;
        if let Some(activity_col) = col_layout.activity {
            write_text(worksheet, i, activity_col as u16, "")?;
        }
    }

    workbook
        .save(path)
        .map_err(|e| WriteError::Save(e.to_string()))
}

fn write_text(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    col: u16,
    text: &str,
) -> Result<(), WriteError> {
    worksheet
        .write_string(row, col, text)
        .map(|_| ())
        .map_err(|e| WriteError::Cell {
            row,
            col,
            message: e.to_string(),
        })
}

/// Results workbook path: `<dir>/유아행동발달사항.xlsx` or
/// `<dir>/행발생성결과.xlsx` depending on category.
pub fn results_path(dir: &Path, category: SchoolCategory) -> PathBuf {
    dir.join(category.results_filename())
}

/// Template workbook path: `<dir>/행발입력자료.xlsx`.
pub fn template_path(dir: &Path) -> PathBuf {
    dir.join(SchoolCategory::template_filename())
}

// ── Tests ───────────────────────────────────────────────────────────
