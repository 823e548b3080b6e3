//! # crash - Interactive SQL Shell for CrateDB
//!
//! crash reads SQL statements from a prompt, a pipe or a single command
//! argument, sends them to a CrateDB cluster over its HTTP endpoint and
//! prints the results as ASCII tables.
//!
//! ## Quick Start
//!
//! ```ignore
//! use crash::backend::HttpConnector;
//! use crash::cli::{run_command, Dispatcher};
//!
//! let mut dispatcher = Dispatcher::new(std::io::stdout(), Box::new(HttpConnector::new(false)), false);
//! dispatcher.connect(&["localhost:4200".to_string()])?;
//! let exit_code = run_command(&mut dispatcher, "select name from sys.cluster")?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │       bin/crash.rs (clap args)      │
//! ├─────────────────────────────────────┤
//! │   cli: session, repl, accumulator   │
//! ├─────────────────────────────────────┤
//! │   cli: dispatcher, table, encoding  │
//! ├─────────────────────────────────────┤
//! │  backend traits (Connector, Conn.)  │
//! ├─────────────────────────────────────┤
//! │     backend::http (ureq, /_sql)     │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`backend`]: connection traits and the HTTP client
//! - [`cli`]: input handling, dispatch and result formatting
//! - [`config`]: constants and runtime configuration

pub mod backend;
pub mod cli;
pub mod config;

pub use backend::{BackendError, Connection, Connector, StatementResult};
pub use config::ShellConfig;
