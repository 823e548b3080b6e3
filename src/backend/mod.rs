//! # Backend Collaborator
//!
//! The shell never talks to a server directly. Everything it needs from the
//! query-executing service goes through two traits:
//!
//! - [`Connector`]: turns host specifications into a [`Connection`]
//! - [`Connection`]: executes statements and probes individual servers
//!
//! ```text
//! ┌────────────────────┐   connect(hosts)   ┌────────────────────┐
//! │ Command Dispatcher │ ─────────────────> │     Connector      │
//! │                    │                    └────────────────────┘
//! │                    │   execute(stmt)    ┌────────────────────┐
//! │                    │ ─────────────────> │     Connection     │
//! │                    │ <───────────────── │  (HTTP, or a fake  │
//! └────────────────────┘  StatementResult   │   in tests)        │
//!                                           └────────────────────┘
//! ```
//!
//! ## Results
//!
//! A [`StatementResult`] carries everything the dispatcher reports after a
//! statement: column names and rows for queries, the affected or returned
//! row count, and the server-side duration. Values are JSON values because
//! that is what the backend speaks; the field renderer turns them into text.
//!
//! ## Errors
//!
//! [`BackendError`] separates connectivity failures (no server reachable)
//! from execution failures (the server rejected the statement). The
//! dispatcher reports the two differently.

pub mod http;

pub use http::{HttpConnection, HttpConnector};

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BackendError {
    #[error("{0}")]
    Connection(String),
    #[error("{message}")]
    Execution {
        message: String,
        error_trace: Option<String>,
    },
}

impl BackendError {
    pub fn is_connection(&self) -> bool {
        matches!(self, BackendError::Connection(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementResult {
    pub column_names: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub row_count: i64,
    /// Server-side duration; `None` when the backend does not report one.
    pub duration_millis: Option<f64>,
}

impl StatementResult {
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_millis.map(|ms| ms / 1000.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub server_url: String,
    pub node_name: String,
}

pub trait Connector {
    fn connect(&self, hosts: &[String]) -> Result<Box<dyn Connection>, BackendError>;
}

pub trait Connection {
    fn execute(&mut self, statement: &str) -> Result<StatementResult, BackendError>;

    fn active_servers(&self) -> Vec<String>;

    fn server_info(&self, server: &str) -> Result<ServerInfo, BackendError>;
}
