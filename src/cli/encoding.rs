//! # Output Encoding
//!
//! Rust writes UTF-8 bytes no matter what the terminal expects. A terminal
//! running under a non-UTF-8 locale shows mojibake instead of failing, so
//! the shell checks representability itself before writing a block.
//!
//! ## Detection
//!
//! The first non-empty variable among `LC_ALL`, `LC_CTYPE` and `LANG`
//! decides. A value naming UTF-8 (`en_US.UTF-8`, `C.utf8`) selects UTF-8;
//! `C`, `POSIX` or any other charset selects ASCII. With no locale set at
//! all the shell assumes UTF-8.
//!
//! ## Degradation
//!
//! ```text
//! strict ──(unrepresentable)──> replace each such character with '?'
//!                                      │
//!                                      └──> locale warning
//! ```
//!
//! Both supported encodings can represent `?`, so replacement is the only
//! fallback.

use crate::config::LOCALE_WARNING;
use std::env;
use std::io::{self, Write};
use tracing::warn;

const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_CTYPE", "LANG"];
const REPLACEMENT: char = '?';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEncoding {
    Utf8,
    Ascii,
}

impl OutputEncoding {
    pub fn detect() -> Self {
        let locale = LOCALE_VARS
            .iter()
            .filter_map(|var| env::var(var).ok())
            .find(|value| !value.is_empty());
        Self::from_locale(locale.as_deref())
    }

    pub fn from_locale(locale: Option<&str>) -> Self {
        let Some(locale) = locale else {
            return OutputEncoding::Utf8;
        };
        let charset = locale
            .split('@')
            .next()
            .and_then(|l| l.split('.').nth(1))
            .unwrap_or("")
            .to_ascii_lowercase()
            .replace('-', "");
        if charset == "utf8" {
            OutputEncoding::Utf8
        } else {
            OutputEncoding::Ascii
        }
    }

    pub fn can_encode(self, c: char) -> bool {
        match self {
            OutputEncoding::Utf8 => true,
            OutputEncoding::Ascii => c.is_ascii(),
        }
    }

    pub fn can_encode_str(self, s: &str) -> bool {
        s.chars().all(|c| self.can_encode(c))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    Exact(String),
    Degraded(String),
}

pub fn encode(text: &str, encoding: OutputEncoding) -> Encoded {
    if encoding.can_encode_str(text) {
        return Encoded::Exact(text.to_string());
    }

    Encoded::Degraded(
        text.chars()
            .map(|c| if encoding.can_encode(c) { c } else { REPLACEMENT })
            .collect(),
    )
}

/// Writes `text` followed by a newline, degrading unrepresentable output
/// and appending the locale warning when that happened.
pub fn write_block<W: Write>(out: &mut W, text: &str, encoding: OutputEncoding) -> io::Result<()> {
    match encode(text, encoding) {
        Encoded::Exact(text) => writeln!(out, "{}", text),
        Encoded::Degraded(text) => {
            warn!(?encoding, "output contains characters the terminal cannot display");
            writeln!(out, "{}", text)?;
            writeln!(out, "{}", LOCALE_WARNING)
        }
    }
}
