use std::fmt;

/// Failure to decode an uploaded workbook.
#[derive(Debug)]
pub enum ParseError {
    /// The byte buffer is not a decodable workbook.
    Decode(String),
    /// The workbook decoded but contains no sheets.
    NoSheets,
    /// The first sheet could not be read.
    SheetRead { sheet: String, message: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(msg) => write!(f, "cannot decode workbook: {msg}"),
            Self::NoSheets => write!(f, "workbook contains no sheets"),
            Self::SheetRead { sheet, message } => {
                write!(f, "cannot read sheet '{sheet}': {message}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Failure to produce an output workbook.
#[derive(Debug)]
pub enum WriteError {
    /// Worksheet setup failed (bad sheet name, etc.).
    Sheet(String),
    /// A cell could not be written.
    Cell { row: u32, col: u16, message: String },
    /// The workbook could not be saved.
    Save(String),
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sheet(msg) => write!(f, "worksheet error: {msg}"),
            Self::Cell { row, col, message } => {
                write!(f, "cannot write cell ({row}, {col}): {message}")
            }
            Self::Save(msg) => write!(f, "cannot save workbook: {msg}"),
        }
    }
}

impl std::error::Error for WriteError {}
