//! CLI Exit Code Registry
//!
//! Single source of truth for all exit codes. Exit codes are part of
//! the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                              |
//! |---------|-----------|------------------------------------------|
//! | 0       | Universal | Success                                  |
//! | 1       | Universal | General error (unspecified)              |
//! | 2       | Universal | CLI usage error (bad args, missing file) |
//! | 3-9     | workbook  | File read/decode codes                   |
//! | 10-19   | ai        | API key / generation codes               |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// File could not be read or written.
pub const EXIT_IO: u8 = 3;

/// Uploaded file is not a decodable workbook.
pub const EXIT_PARSE: u8 = 4;

/// No Gemini API key available (flag, keychain, environment).
pub const EXIT_AI_MISSING_KEY: u8 = 11;

/// Keychain error (cannot read/write credentials).
pub const EXIT_AI_KEYCHAIN_ERR: u8 = 12;

/// A generation call failed; the run was aborted and no results file
/// was written.
pub const EXIT_GEN_FAILED: u8 = 13;

/// Run cancelled between records.
pub const EXIT_CANCELLED: u8 = 14;
