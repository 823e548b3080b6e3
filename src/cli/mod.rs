//! # Shell Front End
//!
//! Everything between the terminal and the backend traits: reading input,
//! reassembling statements, dispatching them and printing results.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CLI Entry Point                        │
//! │                      (bin/crash.rs)                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     Session Controller                      │
//! │  - Implicit connect at startup                              │
//! │  - Picks command, piped or interactive mode                 │
//! ├──────────────────────────────┬──────────────────────────────┤
//! │  Batch loop (command/piped)  │  REPL (rustyline, history,   │
//! │                              │  completion)                 │
//! ├──────────────────────────────┴──────────────────────────────┤
//! │                   Statement Accumulator                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    Command Dispatcher                       │
//! ├───────────────────┬─────────────────────┬───────────────────┤
//! │  Table Formatter  │   Output Encoder    │  backend traits   │
//! └───────────────────┴─────────────────────┴───────────────────┘
//! ```
//!
//! ## Table Display
//!
//! Query results are displayed in ASCII box format, numeric columns
//! aligned on the decimal point:
//!
//! ```text
//! +-----------+---------+
//! | name      |    load |
//! +-----------+---------+
//! | Algol     |    1.5  |
//! | Aldebaran |   12.25 |
//! | NULL      | NULL    |
//! +-----------+---------+
//! SELECT 3 rows in set (0.004 sec)
//! ```
//!
//! ## Module Organization
//!
//! - `accumulator`: multi-line input to logical statements
//! - `commands`: keyword table and statement dispatch
//! - `completion`: rustyline helper completing keywords
//! - `encoding`: terminal encoding detection and output degradation
//! - `history`: history file path resolution
//! - `input`: piped stdin detection
//! - `repl`: interactive read-eval-print loop
//! - `session`: mode selection and batch execution
//! - `table`: field rendering and ASCII table formatting

pub mod accumulator;
pub mod commands;
pub mod completion;
pub mod encoding;
pub mod history;
pub mod input;
pub mod repl;
pub mod session;
pub mod table;

pub use accumulator::{statements, Feed, StatementAccumulator};
pub use commands::{CommandResult, Dispatcher};
pub use repl::Repl;
pub use session::{run_batch, run_command, run_session, Mode};
pub use table::{render_field, TableFormatter};
