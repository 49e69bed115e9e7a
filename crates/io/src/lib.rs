// Workbook I/O
//
// Reading: first decodable sheet of an uploaded workbook into ordered
// evaluation records. Writing: results workbooks and blank input
// templates. Only xlsx/xls byte buffers, single sheet, per the tool's
// upload contract.

mod error;
pub mod layout;
pub mod xlsx;

pub use error::{ParseError, WriteError};
pub use xlsx::{
    read, read_with_options, results_path, template_path, write_results, write_template,
    ImportResult, ReadOptions, SourceSheet, TEMPLATE_ROWS,
};
