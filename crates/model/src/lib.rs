// Row schema shared by the reader, writer and generation loop

pub mod category;
pub mod length;
pub mod record;

pub use category::{ColumnLayout, SchoolCategory};
pub use length::{LengthDirective, LengthMode};
pub use record::{validate, EvaluationRecord, ValidationError, HEADER_SENTINEL};
