//! # Shell Configuration
//!
//! Runtime configuration assembled once at startup from command-line
//! arguments and the environment, then handed to the session controller.
//!
//! ## Verbosity
//!
//! The `-v` flag is repeatable:
//!
//! | Count | Log level | Error traces |
//! |-------|-----------|--------------|
//! | 0     | ERROR     | off          |
//! | 1     | INFO      | on           |
//! | 2+    | DEBUG     | on           |
//!
//! ## History Location
//!
//! Resolved in this order:
//! 1. `--history <PATH>`
//! 2. `CRASH_HISTORY` environment variable (empty disables history)
//! 3. `<data dir>/Crate/crash_history`

pub mod constants;
pub use constants::*;

use crate::cli::history::history_path;
use std::path::PathBuf;
use tracing::Level;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub verbosity: u8,
    pub history: Option<PathBuf>,
    pub command: Option<String>,
    pub hosts: Vec<String>,
}

impl ShellConfig {
    pub fn new(
        verbosity: u8,
        history_override: Option<PathBuf>,
        command: Option<String>,
        hosts: Vec<String>,
    ) -> Self {
        Self {
            verbosity,
            history: history_override.or_else(history_path),
            command,
            hosts,
        }
    }

    pub fn log_level(&self) -> Level {
        match self.verbosity {
            0 => Level::ERROR,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    }

    pub fn error_trace(&self) -> bool {
        self.verbosity > 0
    }
}
