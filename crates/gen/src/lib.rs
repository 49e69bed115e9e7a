// Narrative generation
//
// One prompt per record, one blocking API call per prompt, strictly in
// row order. The run loop lives in `run`, the wire client in `client`,
// prompt assembly in `prompt`.

pub mod client;
pub mod prompt;
pub mod run;

pub use client::{GeminiClient, GenError, GEMINI_API_BASE};
pub use run::{
    generate_all, generate_to_file, CancelToken, RunError, RunState, UsageEntry, UsageLog,
};
