// Length directives for generated text
//
// The builder only assembles text; which directive applies is decided by
// the caller, once per batch (see the orchestrator).

use serde::{Deserialize, Serialize};

/// User-facing length selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthMode {
    Concise,
    #[default]
    Moderate,
    Detailed,
    /// Pick one of the three directives at random, once per batch.
    Random,
}

/// A concrete length instruction embedded in the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthDirective {
    Concise,
    Moderate,
    Detailed,
}

impl LengthDirective {
    pub const ALL: [LengthDirective; 3] = [
        LengthDirective::Concise,
        LengthDirective::Moderate,
        LengthDirective::Detailed,
    ];

    /// The literal instruction appended to every prompt.
    pub fn instruction(&self) -> &'static str {
        match self {
            LengthDirective::Concise => "3문장 내외로 간결하게 작성해 주세요.",
            LengthDirective::Moderate => "5~8문장 분량으로 작성해 주세요.",
            LengthDirective::Detailed => "10~15문장 분량으로 자세하게 작성해 주세요.",
        }
    }
}

impl LengthMode {
    /// Fixed modes map straight to a directive; `Random` has no fixed
    /// mapping and returns None (the orchestrator rolls it per batch).
    pub fn fixed_directive(&self) -> Option<LengthDirective> {
        match self {
            LengthMode::Concise => Some(LengthDirective::Concise),
            LengthMode::Moderate => Some(LengthDirective::Moderate),
            LengthMode::Detailed => Some(LengthDirective::Detailed),
            LengthMode::Random => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_directives() {
        assert_eq!(LengthMode::Concise.fixed_directive(), Some(LengthDirective::Concise));
        assert_eq!(LengthMode::Moderate.fixed_directive(), Some(LengthDirective::Moderate));
        assert_eq!(LengthMode::Detailed.fixed_directive(), Some(LengthDirective::Detailed));
        assert_eq!(LengthMode::Random.fixed_directive(), None);
    }

    #[test]
    fn test_instructions_are_distinct() {
        let texts: Vec<_> = LengthDirective::ALL.iter().map(|d| d.instruction()).collect();
        assert_eq!(texts.len(), 3);
        assert_ne!(texts[0], texts[1]);
        assert_ne!(texts[1], texts[2]);
    }
}
