//! # Shell Constants
//!
//! This module centralizes the constants the shell's components agree on.
//!
//! ## Dependency Graph
//!
//! ```text
//! STATEMENT_DELIMITER (';')
//!       │
//!       ├─> Statement accumulator (line termination)
//!       └─> Session controller (splitting `--command` strings)
//!
//! COMMENT_MARKER ("--")
//!       │
//!       ├─> Statement accumulator (drops comment lines)
//!       └─> Command dispatcher (ignores comment statements)
//!
//! NULL_TOKEN ("NULL")
//!       │
//!       └─> Table formatter (placeholder, counts as 4 columns)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use crate::config::{PRIMARY_PROMPT, STATEMENT_DELIMITER};
//! ```

use std::time::Duration;

// ============================================================================
// INPUT HANDLING
// ============================================================================

/// Prompt shown when no statement is pending.
pub const PRIMARY_PROMPT: &str = "cr> ";

/// Prompt shown while a multi-line statement is being accumulated.
pub const CONTINUATION_PROMPT: &str = "... ";

/// Terminates a logical statement.
pub const STATEMENT_DELIMITER: char = ';';

/// Lines starting with this marker (after leading whitespace) are dropped.
pub const COMMENT_MARKER: &str = "--";

// ============================================================================
// RESULT RENDERING
// ============================================================================

pub const NULL_TOKEN: &str = "NULL";
pub const TRUE_TOKEN: &str = "TRUE";
pub const FALSE_TOKEN: &str = "FALSE";

pub const LOCALE_WARNING: &str =
    "WARNING: Unicode characters found that cannot be displayed. Check your system locale.";

// ============================================================================
// HISTORY
// ============================================================================

/// Maximum number of entries kept in the history file.
pub const MAX_HISTORY_LENGTH: usize = 10_000;

/// Directory under the platform data dir holding the history file.
pub const USER_DATA_DIR_NAME: &str = "Crate";

pub const HISTORY_FILE_NAME: &str = "crash_history";

/// Overrides the history location when `--history` is not given.
/// An empty value disables history persistence.
pub const HISTORY_ENV_VAR: &str = "CRASH_HISTORY";

// ============================================================================
// BACKEND
// ============================================================================

/// Server used when no host is given on the command line or to `connect`.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:4200";

/// Endpoint receiving SQL statements.
pub const SQL_PATH: &str = "/_sql";

/// Applies to both connect and read phases of every backend request.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const _: () = assert!(
    !COMMENT_MARKER.is_empty(),
    "an empty comment marker would drop every line"
);
