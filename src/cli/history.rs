//! # History File Management
//!
//! Manages the location of the interactive history file. By default it
//! lives in the per-user data directory:
//!
//! | Platform | Default path                                            |
//! |----------|---------------------------------------------------------|
//! | Linux    | `~/.local/share/Crate/crash_history`                    |
//! | macOS    | `~/Library/Application Support/Crate/crash_history`     |
//! | Windows  | `%APPDATA%\Crate\crash_history`                         |
//!
//! ## Configuration
//!
//! `--history <PATH>` wins over everything. Without it, the `CRASH_HISTORY`
//! environment variable overrides the default location:
//!
//! ```bash
//! export CRASH_HISTORY=/custom/path/history
//! crash --hosts localhost:4200
//! ```
//!
//! Setting `CRASH_HISTORY` to an empty string disables persistence.
//!
//! ## Implementation
//!
//! The path is resolved once at startup. rustyline does the file I/O; this
//! module only makes sure the parent directory exists before loading.

use crate::config::{HISTORY_ENV_VAR, HISTORY_FILE_NAME, USER_DATA_DIR_NAME};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub fn history_path() -> Option<PathBuf> {
    if let Ok(custom_path) = env::var(HISTORY_ENV_VAR) {
        if custom_path.is_empty() {
            return None;
        }
        return Some(PathBuf::from(custom_path));
    }

    dirs::data_dir().map(|dir| dir.join(USER_DATA_DIR_NAME).join(HISTORY_FILE_NAME))
}

pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The environment is process-wide, so every env-dependent check lives
    // in this one test.
    #[test]
    fn history_path_respects_environment() {
        env::remove_var(HISTORY_ENV_VAR);
        if let Some(path) = history_path() {
            assert!(path.ends_with("Crate/crash_history"));
        }

        env::set_var(HISTORY_ENV_VAR, "/custom/path");
        assert_eq!(history_path(), Some(PathBuf::from("/custom/path")));

        env::set_var(HISTORY_ENV_VAR, "");
        assert_eq!(history_path(), None);

        env::remove_var(HISTORY_ENV_VAR);
    }

    #[test]
    fn ensure_parent_dir_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("history");

        ensure_parent_dir(&path).unwrap();

        assert!(dir.path().join("a").join("b").is_dir());
    }

    #[test]
    fn ensure_parent_dir_accepts_bare_file_name() {
        ensure_parent_dir(Path::new("history")).unwrap();
    }
}
