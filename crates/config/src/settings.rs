// Generation settings
//
// Nothing here is persisted; the CLI layers flag overrides on top of
// these defaults per invocation.

use serde::{Deserialize, Serialize};

/// Default generation model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default minimum characteristics length (characters). Shorter rows are
/// filtered out of bulk ingestion with a warning.
pub const DEFAULT_MIN_CHARACTERISTICS_CHARS: usize = 5;

/// Generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenSettings {
    /// Model identifier
    pub model: String,

    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f32,

    /// Minimum characteristics length in characters
    pub min_characteristics_chars: usize,
}

impl Default for GenSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            min_characteristics_chars: DEFAULT_MIN_CHARACTERISTICS_CHARS,
        }
    }
}

impl GenSettings {
    /// Get the effective model (user-specified or default)
    pub fn effective_model(&self) -> &str {
        if self.model.is_empty() {
            DEFAULT_MODEL
        } else {
            &self.model
        }
    }
}
