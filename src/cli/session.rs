//! # Session Controller
//!
//! Owns one shell session from startup to exit status.
//!
//! ## Startup
//!
//! Every session starts with an implicit `connect` to the configured hosts
//! (the connector substitutes the default server when none are given). The
//! connection table is printed in every mode.
//!
//! ## Mode Selection
//!
//! Exactly one mode runs, chosen in this order:
//!
//! | Mode        | Trigger                            | Input source          |
//! |-------------|------------------------------------|-----------------------|
//! | Command     | `-c/--command <SQL>`               | the argument          |
//! | Piped       | stdin has data at startup          | stdin, line by line   |
//! | Interactive | otherwise                          | rustyline prompt      |
//!
//! ## Exit Status
//!
//! Command and piped sessions return the dispatcher's accumulated status:
//! 1 if any statement failed, 0 otherwise. An `exit` statement skips the
//! rest of the batch and ends the session with 0, whatever failed before
//! it. Interactive sessions always return 0.

use crate::cli::accumulator::statements;
use crate::cli::commands::{CommandResult, Dispatcher};
use crate::cli::input::stdin_has_piped_data;
use crate::cli::repl::{InterruptFlag, Repl};
use crate::config::{ShellConfig, STATEMENT_DELIMITER};
use eyre::{Result, WrapErr};
use std::io::{self, BufRead, Write};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Command(String),
    Piped,
    Interactive,
}

impl Mode {
    pub fn select(command: Option<&str>, piped: bool) -> Self {
        match command {
            Some(command) => Mode::Command(command.to_string()),
            None if piped => Mode::Piped,
            None => Mode::Interactive,
        }
    }

    pub fn detect(config: &ShellConfig) -> Self {
        let command = config.command.as_deref();
        // Only probe stdin when no command was given.
        let piped = command.is_none() && stdin_has_piped_data();
        Self::select(command, piped)
    }
}

pub fn run_session<W: Write>(config: &ShellConfig, dispatcher: &mut Dispatcher<W>) -> Result<i32> {
    let mode = Mode::detect(config);
    debug!(?mode, "session mode selected");

    dispatcher.connect(&config.hosts)?;

    match mode {
        Mode::Command(command) => run_command(dispatcher, &command),
        Mode::Piped => {
            let stdin = io::stdin();
            run_batch(dispatcher, stdin.lock())
        }
        Mode::Interactive => {
            let interrupt = InterruptFlag::install()?;
            let mut repl = Repl::new(dispatcher, config.history.clone(), interrupt)?;
            repl.run()
        }
    }
}

pub fn run_command<W: Write>(dispatcher: &mut Dispatcher<W>, command: &str) -> Result<i32> {
    for statement in command.split(STATEMENT_DELIMITER) {
        if dispatcher.dispatch(statement)? == CommandResult::Exit {
            return Ok(0);
        }
    }
    Ok(dispatcher.exit_code())
}

pub fn run_batch<W: Write, R: BufRead>(dispatcher: &mut Dispatcher<W>, input: R) -> Result<i32> {
    for statement in statements(input.lines()) {
        let statement = statement.wrap_err("failed to read statements from input")?;
        if dispatcher.dispatch(&statement)? == CommandResult::Exit {
            return Ok(0);
        }
    }
    Ok(dispatcher.exit_code())
}
