// Evaluation records and validation

use serde::{Deserialize, Serialize};

/// The characteristics header label that can appear duplicated inside the
/// data area when users paste sheets together. Rows carrying it are
/// skipped by the reader.
pub const HEADER_SENTINEL: &str = "학생특성";

/// One student row: the unit the reader emits, the generation loop
/// mutates, and the writer serializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Row identifier. Blank cells inherit the previous emitted row's
    /// number ("1" when there is no previous row).
    pub number: String,

    /// Free-text student characteristics. Required.
    pub characteristics: String,

    /// Play activity — kindergarten only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,

    /// Generated narrative. Empty until the generation loop fills it;
    /// always ends with a period once set.
    #[serde(default)]
    pub result: String,
}

impl EvaluationRecord {
    pub fn new(number: impl Into<String>, characteristics: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            characteristics: characteristics.into(),
            activity: None,
            result: String::new(),
        }
    }

    pub fn with_activity(mut self, activity: impl Into<String>) -> Self {
        self.activity = Some(activity.into());
        self
    }

    pub fn has_result(&self) -> bool {
        !self.result.is_empty()
    }
}

/// Why a record was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Characteristics cell is empty or whitespace.
    EmptyCharacteristics,
    /// Characteristics shorter than the configured minimum.
    CharacteristicsTooShort { len: usize, min: usize },
    /// Number missing on the manual-add path (bulk ingestion
    /// carry-forward never produces this).
    EmptyNumber,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCharacteristics => write!(f, "characteristics must not be empty"),
            Self::CharacteristicsTooShort { len, min } => {
                write!(f, "characteristics too short: {len} chars, minimum {min}")
            }
            Self::EmptyNumber => write!(f, "number must not be empty"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a record against required-field and minimum-length rules.
/// Length is counted in characters, not bytes — the inputs are Korean.
pub fn validate(record: &EvaluationRecord, min_chars: usize) -> Result<(), ValidationError> {
    if record.number.trim().is_empty() {
        return Err(ValidationError::EmptyNumber);
    }
    let chars = record.characteristics.trim();
    if chars.is_empty() {
        return Err(ValidationError::EmptyCharacteristics);
    }
    let len = chars.chars().count();
    if len < min_chars {
        return Err(ValidationError::CharacteristicsTooShort { len, min: min_chars });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ok() {
        let rec = EvaluationRecord::new("1", "발표를 좋아하고 친구를 잘 돕는다");
        assert!(validate(&rec, 5).is_ok());
    }

    #[test]
    fn test_validate_empty_characteristics() {
        let rec = EvaluationRecord::new("1", "   ");
        assert_eq!(validate(&rec, 0), Err(ValidationError::EmptyCharacteristics));
    }

    #[test]
    fn test_validate_too_short_counts_chars_not_bytes() {
        // 4 Korean chars = 12 UTF-8 bytes; must fail a min of 5, pass a min of 4
        let rec = EvaluationRecord::new("1", "성실하다");
        assert_eq!(
            validate(&rec, 5),
            Err(ValidationError::CharacteristicsTooShort { len: 4, min: 5 })
        );
        assert!(validate(&rec, 4).is_ok());
    }

    #[test]
    fn test_validate_empty_number() {
        let rec = EvaluationRecord::new("", "열심히 참여한다");
        assert_eq!(validate(&rec, 0), Err(ValidationError::EmptyNumber));
    }

    #[test]
    fn test_json_omits_absent_activity() {
        let rec = EvaluationRecord::new("1", "특성");
        let json = serde_json::to_string(&rec).unwrap();
        assert!(!json.contains("activity"));

        let rec = rec.with_activity("블록놀이");
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("블록놀이"));
    }
}
