//! # Statement Accumulator
//!
//! Reassembles raw input lines into logical statements.
//!
//! ## Rules
//!
//! - A line ending with the delimiter (after trailing whitespace) completes
//!   the pending statement. Buffered lines are joined with single spaces.
//! - Any other line is buffered and the caller is told to show the
//!   continuation prompt.
//! - Comment lines (`--` after leading whitespace) are dropped wherever
//!   they appear, including in the middle of a multi-line statement.
//! - Blank lines are ignored while nothing is pending.
//!
//! ```text
//! cr> select name        -> Continuation
//! ... -- the name column -> (dropped)
//! ... from sys.cluster;  -> Statement("select name from sys.cluster")
//! ```
//!
//! ## End of Input
//!
//! Interactive sessions discard a pending statement at end of input. Batch
//! sessions flush it through [`StatementAccumulator::finish`] and still
//! dispatch it, even without a delimiter. [`Statements`] implements the
//! batch behaviour over any line source.

use crate::config::{COMMENT_MARKER, STATEMENT_DELIMITER};
use std::io;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    Statement(String),
    Continuation,
    Ignored,
}

#[derive(Debug)]
pub struct StatementAccumulator {
    delimiter: char,
    partial: Vec<String>,
}

impl Default for StatementAccumulator {
    fn default() -> Self {
        Self::new(STATEMENT_DELIMITER)
    }
}

impl StatementAccumulator {
    pub fn new(delimiter: char) -> Self {
        Self {
            delimiter,
            partial: Vec::new(),
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.partial.is_empty()
    }

    pub fn push_line(&mut self, line: &str) -> Feed {
        if is_comment(line) {
            return if self.is_pending() {
                Feed::Continuation
            } else {
                Feed::Ignored
            };
        }

        let line = line.trim_end();
        if line.is_empty() && !self.is_pending() {
            return Feed::Ignored;
        }

        match line.strip_suffix(self.delimiter) {
            Some(body) => {
                let body = body.trim_end_matches(self.delimiter);
                self.partial.push(body.to_string());
                Feed::Statement(self.take())
            }
            None => {
                self.partial.push(line.to_string());
                Feed::Continuation
            }
        }
    }

    pub fn finish(&mut self) -> Option<String> {
        if self.is_pending() {
            Some(self.take())
        } else {
            None
        }
    }

    pub fn discard(&mut self) {
        self.partial.clear();
    }

    fn take(&mut self) -> String {
        let statement = self.partial.join(" ");
        self.partial.clear();
        statement
    }
}

pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with(COMMENT_MARKER)
}

/// Lazily yields complete statements from a line source, flushing any
/// unterminated statement once the source is exhausted.
pub struct Statements<I> {
    lines: I,
    accumulator: StatementAccumulator,
    exhausted: bool,
}

impl<I> Statements<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            accumulator: StatementAccumulator::default(),
            exhausted: false,
        }
    }
}

impl<I> Iterator for Statements<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        loop {
            match self.lines.next() {
                Some(Ok(line)) => {
                    if let Feed::Statement(statement) = self.accumulator.push_line(&line) {
                        return Some(Ok(statement));
                    }
                }
                Some(Err(err)) => {
                    self.exhausted = true;
                    return Some(Err(err));
                }
                None => {
                    self.exhausted = true;
                    return self.accumulator.finish().map(Ok);
                }
            }
        }
    }
}

pub fn statements<I>(lines: I) -> Statements<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    Statements::new(lines)
}
