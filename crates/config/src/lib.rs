// Configuration: API credentials and generation settings
//
// There is no settings file — the only environment-level input is the
// Gemini API credential, resolved from the keychain or the environment.

pub mod ai;
pub mod settings;

pub use ai::{get_api_key, keychain_available, KeyLookup, KeySource};
pub use settings::GenSettings;
