// Sequential generation loop
//
// One call per record, in row order, each awaited to completion before
// the next begins. The seriality is deliberate: rate-limit safety and a
// usage log whose entries land in input order. Progress is published
// after every completed record, so observers see a non-decreasing
// sequence. First failure aborts the run; completed records keep their
// results, the rest stay empty, and no file is written.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;

use haengbal_io::{write_results, SourceSheet, WriteError};
use haengbal_model::{EvaluationRecord, LengthDirective, LengthMode, SchoolCategory};

use crate::client::{GeminiClient, GenError};
use crate::prompt;

/// Run lifecycle, owned by the caller and updated by the loop.
/// Idle → Running(0→100) → Done | Failed; any terminal state returns to
/// Idle on the next submit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running {
        progress: u8,
    },
    Done,
    Failed {
        message: String,
    },
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running { .. })
    }

    pub fn progress(&self) -> Option<u8> {
        match self {
            RunState::Running { progress } => Some(*progress),
            _ => None,
        }
    }
}

/// Cooperative cancellation flag, checked between records. Cancelling
/// mid-call lets the in-flight request finish; the loop stops before
/// the next one.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One audit line per completed record, delivered in input row order.
#[derive(Debug)]
pub struct UsageEntry<'a> {
    pub row: usize,
    pub prompt: &'a str,
    pub result: &'a str,
    pub at: DateTime<Utc>,
}

/// Audit/analytics sink. Fire-and-forget: the loop ignores errors from
/// `record` — a lost audit line must not abort a half-finished batch.
pub trait UsageLog {
    fn record(&mut self, entry: &UsageEntry<'_>) -> Result<(), String>;
}

/// Why a run stopped early.
#[derive(Debug)]
pub enum RunError {
    /// The call for `row` (zero-based) failed; rows before it keep
    /// their results.
    Generation { row: usize, source: GenError },
    /// Cancelled between records after `completed` successful calls.
    Cancelled { completed: usize },
    /// Generation succeeded but the results workbook could not be
    /// written.
    Export(WriteError),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Generation { row, source } => {
                write!(f, "generation failed at row {}: {}", row + 1, source)
            }
            RunError::Cancelled { completed } => {
                write!(f, "cancelled after {} records", completed)
            }
            RunError::Export(e) => write!(f, "failed to write results: {}", e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Generation { source, .. } => Some(source),
            RunError::Export(e) => Some(e),
            RunError::Cancelled { .. } => None,
        }
    }
}

/// Resolve the length directive once per batch. `Random` rolls here,
/// before the loop, so the whole batch reads with one voice.
fn resolve_directive(mode: LengthMode) -> LengthDirective {
    mode.fixed_directive().unwrap_or_else(|| {
        let mut rng = rand::thread_rng();
        LengthDirective::ALL
            .choose(&mut rng)
            .copied()
            .unwrap_or(LengthDirective::Moderate)
    })
}

/// Generate results for every record, in order, mutating `records` in
/// place. Progress is `round((i+1)/total*100)` after each completed
/// record, published through `on_progress` and mirrored into `state`.
#[allow(clippy::too_many_arguments)]
pub fn generate_all(
    client: &GeminiClient,
    records: &mut [EvaluationRecord],
    category: SchoolCategory,
    length_mode: LengthMode,
    cancel: &CancelToken,
    mut usage: Option<&mut dyn UsageLog>,
    state: &mut RunState,
    mut on_progress: impl FnMut(u8),
) -> Result<(), RunError> {
    let total = records.len();
    *state = RunState::Running { progress: 0 };
    if total == 0 {
        *state = RunState::Done;
        return Ok(());
    }

    let directive = resolve_directive(length_mode);

    for (i, record) in records.iter_mut().enumerate() {
        if cancel.is_cancelled() {
            *state = RunState::Failed {
                message: "cancelled".to_string(),
            };
            return Err(RunError::Cancelled { completed: i });
        }

        let prompt = prompt::build_prompt(
            category,
            &record.characteristics,
            record.activity.as_deref(),
            directive,
        );

        match client.generate(&prompt) {
            Ok(text) => record.result = text,
            Err(source) => {
                *state = RunState::Failed {
                    message: source.to_string(),
                };
                return Err(RunError::Generation { row: i, source });
            }
        }

        if let Some(log) = usage.as_deref_mut() {
            let _ = log.record(&UsageEntry {
                row: i,
                prompt: &prompt,
                result: &record.result,
                at: Utc::now(),
            });
        }

        let progress = (((i + 1) as f64 / total as f64) * 100.0).round() as u8;
        *state = RunState::Running { progress };
        on_progress(progress);
    }

    *state = RunState::Done;
    Ok(())
}

/// Full pipeline tail: run `generate_all`, and only on full success
/// write the results workbook (echoing the uploaded sheet's layout when
/// one was captured). A failed or cancelled run writes nothing.
#[allow(clippy::too_many_arguments)]
pub fn generate_to_file(
    client: &GeminiClient,
    records: &mut [EvaluationRecord],
    category: SchoolCategory,
    length_mode: LengthMode,
    source: Option<&SourceSheet>,
    out_path: &Path,
    cancel: &CancelToken,
    usage: Option<&mut dyn UsageLog>,
    state: &mut RunState,
    on_progress: impl FnMut(u8),
) -> Result<(), RunError> {
    generate_all(
        client,
        records,
        category,
        length_mode,
        cancel,
        usage,
        state,
        on_progress,
    )?;
    write_results(source, records, category, out_path).map_err(RunError::Export)
}
