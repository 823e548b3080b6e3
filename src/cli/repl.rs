//! # REPL - Read-Eval-Print Loop
//!
//! The interactive loop of the shell. Handles:
//!
//! - Reading input with rustyline (history, line editing, completion)
//! - Feeding lines to the statement accumulator
//! - Dispatching each completed statement
//!
//! ## Prompts
//!
//! `cr> ` is shown while nothing is pending and `... ` while a multi-line
//! statement is being accumulated.
//!
//! ## Execution Flow
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 Read Line (cr> / ...)                    │
//! └──────────────────────────────────────────────────────────┘
//!      │ line                 │ Ctrl+D              │ Ctrl+C
//!      ▼                      ▼                     ▼
//! ┌────────────────┐  ┌────────────────┐  ┌─────────────────────────┐
//! │  Accumulator   │  │ discard buffer │  │ discard buffer          │
//! └────────────────┘  │ "Bye", exit 0  │  │ "interrupted exiting..."│
//!      │ Statement    └────────────────┘  │ exit 0                  │
//!      ▼                                  └─────────────────────────┘
//! ┌────────────────┐                                   ▲
//! │   Dispatcher   │──── Ctrl+C while running ─────────┘
//! └────────────────┘
//!      │ Continue                  Exit ──> leave loop, exit 0
//!      ▼
//!   [Loop]
//! ```
//!
//! ## Interrupts
//!
//! While rustyline owns the terminal, Ctrl+C arrives as
//! `ReadlineError::Interrupted`. While a statement runs, it arrives as
//! SIGINT instead; the handler installed by [`InterruptFlag::install`] only
//! raises a flag, and the loop checks it once the statement returns. Both
//! paths end the same way.
//!
//! ## History
//!
//! History is loaded when the REPL is created and saved when it is
//! dropped, so every way out of the loop persists it, including error
//! returns and interrupts.
//!
//! ## Exit Status
//!
//! Interactive sessions always end with status 0, even when individual
//! statements failed.

use crate::cli::accumulator::{Feed, StatementAccumulator};
use crate::cli::commands::{CommandResult, Dispatcher};
use crate::cli::completion::KeywordCompletion;
use crate::cli::history::ensure_parent_dir;
use crate::config::{CONTINUATION_PROMPT, MAX_HISTORY_LENGTH, PRIMARY_PROMPT};
use eyre::{Result, WrapErr};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

const INTERRUPTED_MESSAGE: &str = "interrupted exiting...";

/// Set from the SIGINT handler, consumed by the loop between statements.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn install() -> Result<Self> {
        let flag = Self::default();
        let handler_flag = flag.clone();
        ctrlc::set_handler(move || handler_flag.raise())
            .wrap_err("failed to set Ctrl+C handler")?;
        Ok(flag)
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

pub fn prompt_for(accumulator: &StatementAccumulator) -> &'static str {
    if accumulator.is_pending() {
        CONTINUATION_PROMPT
    } else {
        PRIMARY_PROMPT
    }
}

pub struct Repl<'a, W: Write> {
    dispatcher: &'a mut Dispatcher<W>,
    editor: Editor<KeywordCompletion, DefaultHistory>,
    accumulator: StatementAccumulator,
    history: Option<PathBuf>,
    interrupt: InterruptFlag,
}

impl<'a, W: Write> Repl<'a, W> {
    pub fn new(
        dispatcher: &'a mut Dispatcher<W>,
        history: Option<PathBuf>,
        interrupt: InterruptFlag,
    ) -> Result<Self> {
        let config = Config::builder()
            .max_history_size(MAX_HISTORY_LENGTH)
            .wrap_err("invalid history size")?
            .auto_add_history(false)
            .build();
        let mut editor: Editor<KeywordCompletion, DefaultHistory> =
            Editor::with_config(config).wrap_err("failed to initialize line editor")?;
        editor.set_helper(Some(KeywordCompletion::new(dispatcher.commands().names())));

        if let Some(history_file) = &history {
            if let Err(e) = ensure_parent_dir(history_file) {
                warn!(path = %history_file.display(), error = %e, "cannot create history directory");
            }
            if let Err(e) = editor.load_history(history_file) {
                debug!(path = %history_file.display(), error = %e, "no history loaded");
            }
        }

        Ok(Self {
            dispatcher,
            editor,
            accumulator: StatementAccumulator::default(),
            history,
            interrupt,
        })
    }

    pub fn run(&mut self) -> Result<i32> {
        loop {
            let read = self.editor.readline(prompt_for(&self.accumulator));
            if self.step(read)? == LoopControl::Stop {
                break;
            }
        }

        Ok(0)
    }

    pub fn prompt(&self) -> &'static str {
        prompt_for(&self.accumulator)
    }

    /// Applies one result of `readline` to the session.
    pub fn step(&mut self, read: Result<String, ReadlineError>) -> Result<LoopControl> {
        match read {
            Ok(line) => {
                let control = self.handle_line(&line)?;
                if control == LoopControl::Continue && self.interrupt.take() {
                    return self.interrupted();
                }
                Ok(control)
            }
            Err(ReadlineError::Interrupted) => self.interrupted(),
            Err(ReadlineError::Eof) => {
                self.accumulator.discard();
                self.dispatcher.dispatch("exit")?;
                Ok(LoopControl::Stop)
            }
            Err(err) => Err(err).wrap_err("error reading input"),
        }
    }

    fn interrupted(&mut self) -> Result<LoopControl> {
        self.accumulator.discard();
        self.dispatcher.write_line(INTERRUPTED_MESSAGE)?;
        Ok(LoopControl::Stop)
    }

    fn handle_line(&mut self, line: &str) -> Result<LoopControl> {
        match self.accumulator.push_line(line) {
            Feed::Statement(statement) => {
                self.editor.add_history_entry(format!("{};", statement)).ok();
                match self.dispatcher.dispatch(&statement)? {
                    CommandResult::Continue => Ok(LoopControl::Continue),
                    CommandResult::Exit => Ok(LoopControl::Stop),
                }
            }
            Feed::Continuation | Feed::Ignored => Ok(LoopControl::Continue),
        }
    }

    fn save_history(&mut self) {
        if let Some(history_file) = &self.history {
            if let Err(e) = self.editor.save_history(history_file) {
                warn!(path = %history_file.display(), error = %e, "could not save history");
            }
        }
    }
}

impl<W: Write> Drop for Repl<'_, W> {
    fn drop(&mut self) {
        self.save_history();
    }
}
