//! # Command Dispatcher
//!
//! Routes one logical statement to its handler by the leading keyword.
//!
//! ## Supported Commands
//!
//! | Keyword                                    | Category  | Output after success          |
//! |--------------------------------------------|-----------|-------------------------------|
//! | `select`                                   | query     | table + `SELECT n rows in set`|
//! | `insert`, `update`, `delete`, `copy`       | mutation  | `INSERT OK, n rows affected`  |
//! | `create` (`crate`), `drop`, `alter`,       | status    | `CREATE OK`                   |
//! | `refresh`, `set`, `reset`                  |           |                               |
//! | `connect host[:port] ...`                  | shell     | per-server table              |
//! | `help [topic]`                             | shell     | command help                  |
//! | `exit`, `quit`                             | shell     | `Bye`                         |
//!
//! ## Parsing
//!
//! The keyword is the first whitespace-delimited token, matched
//! case-insensitively by lower-casing it before the table lookup. SQL
//! keywords put their canonical keyword back in front of the remainder and
//! send the whole statement to the backend, so `SELECT 1` runs as `select 1`
//! and `crate table t (...)` runs as `create table t (...)`.
//!
//! ## Failure Handling
//!
//! Nothing a statement does ends the session. Missing connections, backend
//! errors and unknown keywords are printed and set the exit code to 1; the
//! next statement runs regardless. Only write errors on the output stream
//! propagate.

use crate::backend::{BackendError, Connection, Connector, StatementResult};
use crate::cli::accumulator::is_comment;
use crate::cli::encoding::{self, OutputEncoding};
use crate::cli::table::TableFormatter;
use eyre::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::io::Write;
use tracing::{debug, warn};

const NOT_CONNECTED: &str = "Use \"connect <hostname:port>\" to connect to a server first";
const CONNECT_COLUMNS: [&str; 4] = ["server_url", "node_name", "connected", "message"];

#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Query,
    Mutation,
    Status,
    Connect,
    Help,
    Exit,
}

#[derive(Debug)]
pub struct CommandSpec {
    pub name: &'static str,
    /// Keyword sent to the backend; differs from `name` only for aliases.
    pub keyword: &'static str,
    pub kind: StatementKind,
    pub summary: &'static str,
    pub example: Option<&'static str>,
}

const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "select",
        keyword: "select",
        kind: StatementKind::Query,
        summary: "execute a SQL select statement",
        example: Some("select name from locations where name = 'Algol'"),
    },
    CommandSpec {
        name: "insert",
        keyword: "insert",
        kind: StatementKind::Mutation,
        summary: "execute a SQL insert statement",
        example: Some("insert into locations (name) values ('Algol')"),
    },
    CommandSpec {
        name: "update",
        keyword: "update",
        kind: StatementKind::Mutation,
        summary: "execute a SQL update statement",
        example: Some("update locations set name = 'newName' where name = 'Algol'"),
    },
    CommandSpec {
        name: "delete",
        keyword: "delete",
        kind: StatementKind::Mutation,
        summary: "execute a SQL delete statement",
        example: Some("delete from locations where name = 'Algol'"),
    },
    CommandSpec {
        name: "copy",
        keyword: "copy",
        kind: StatementKind::Mutation,
        summary: "execute a SQL copy statement",
        example: Some("copy locations from 'path/to/import/data.json'"),
    },
    CommandSpec {
        name: "create",
        keyword: "create",
        kind: StatementKind::Status,
        summary: "execute a SQL create statement",
        example: Some("create table locations (id integer, name string)"),
    },
    CommandSpec {
        name: "crate",
        keyword: "create",
        kind: StatementKind::Status,
        summary: "alias for create",
        example: None,
    },
    CommandSpec {
        name: "drop",
        keyword: "drop",
        kind: StatementKind::Status,
        summary: "execute a SQL drop statement",
        example: Some("drop table locations"),
    },
    CommandSpec {
        name: "alter",
        keyword: "alter",
        kind: StatementKind::Status,
        summary: "execute a SQL alter statement",
        example: Some("alter table locations set (number_of_replicas=2)"),
    },
    CommandSpec {
        name: "refresh",
        keyword: "refresh",
        kind: StatementKind::Status,
        summary: "execute a SQL refresh statement",
        example: Some("refresh table locations"),
    },
    CommandSpec {
        name: "set",
        keyword: "set",
        kind: StatementKind::Status,
        summary: "execute a SQL set statement",
        example: Some("set global persistent stats.enabled=true"),
    },
    CommandSpec {
        name: "reset",
        keyword: "reset",
        kind: StatementKind::Status,
        summary: "execute a SQL reset statement",
        example: Some("reset global stats.enabled"),
    },
    CommandSpec {
        name: "connect",
        keyword: "connect",
        kind: StatementKind::Connect,
        summary: "connect to one or more servers",
        example: Some("connect servername:port [servername:port ...]"),
    },
    CommandSpec {
        name: "help",
        keyword: "help",
        kind: StatementKind::Help,
        summary: "list available commands, or describe one",
        example: Some("help select"),
    },
    CommandSpec {
        name: "exit",
        keyword: "exit",
        kind: StatementKind::Exit,
        summary: "exit the shell",
        example: None,
    },
    CommandSpec {
        name: "quit",
        keyword: "quit",
        kind: StatementKind::Exit,
        summary: "exit the shell",
        example: None,
    },
];

pub struct CommandTable {
    handlers: HashMap<&'static str, &'static CommandSpec>,
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandTable {
    pub fn new() -> Self {
        let handlers = COMMANDS.iter().map(|spec| (spec.name, spec)).collect();
        Self { handlers }
    }

    pub fn lookup(&self, keyword: &str) -> Option<&'static CommandSpec> {
        self.handlers.get(keyword.to_lowercase().as_str()).copied()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// Splits a statement into its keyword and the remaining text.
pub fn split_keyword(statement: &str) -> Option<(&str, &str)> {
    let statement = statement.trim();
    if statement.is_empty() {
        return None;
    }
    match statement.find(char::is_whitespace) {
        Some(pos) => Some((&statement[..pos], statement[pos..].trim_start())),
        None => Some((statement, "")),
    }
}

pub struct Dispatcher<W: Write> {
    out: W,
    connector: Box<dyn Connector>,
    connection: Option<Box<dyn Connection>>,
    commands: CommandTable,
    exit_code: i32,
    error_trace: bool,
    encoding: OutputEncoding,
}

impl<W: Write> Dispatcher<W> {
    pub fn new(out: W, connector: Box<dyn Connector>, error_trace: bool) -> Self {
        Self {
            out,
            connector,
            connection: None,
            commands: CommandTable::new(),
            exit_code: 0,
            error_trace,
            encoding: OutputEncoding::detect(),
        }
    }

    pub fn with_encoding(mut self, encoding: OutputEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn write_line(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}", text)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn dispatch(&mut self, statement: &str) -> Result<CommandResult> {
        if is_comment(statement) {
            return Ok(CommandResult::Continue);
        }
        let Some((keyword, remainder)) = split_keyword(statement) else {
            return Ok(CommandResult::Continue);
        };

        let Some(spec) = self.commands.lookup(keyword) else {
            self.exit_code = 1;
            writeln!(self.out, "*** Unknown syntax: {}", statement.trim())?;
            return Ok(CommandResult::Continue);
        };
        debug!(command = spec.name, "dispatching statement");

        let result = match spec.kind {
            StatementKind::Query => {
                if let Some(result) = self.execute(spec.keyword, remainder)? {
                    self.print_table(result.column_names.clone(), &result.rows)?;
                    self.print_rows_selected(&result)?;
                }
                CommandResult::Continue
            }
            StatementKind::Mutation => {
                if let Some(result) = self.execute(spec.keyword, remainder)? {
                    self.print_rows_affected(spec.keyword, &result)?;
                }
                CommandResult::Continue
            }
            StatementKind::Status => {
                if let Some(result) = self.execute(spec.keyword, remainder)? {
                    self.print_success(spec.keyword, result.duration_secs())?;
                }
                CommandResult::Continue
            }
            StatementKind::Connect => {
                let hosts: Vec<String> = remainder.split_whitespace().map(String::from).collect();
                self.connect(&hosts)?;
                CommandResult::Continue
            }
            StatementKind::Help => {
                self.print_help(remainder)?;
                CommandResult::Continue
            }
            StatementKind::Exit => {
                writeln!(self.out, "Bye")?;
                CommandResult::Exit
            }
        };

        self.out.flush()?;
        Ok(result)
    }

    pub fn connect(&mut self, hosts: &[String]) -> Result<()> {
        let connection = match self.connector.connect(hosts) {
            Ok(connection) => connection,
            Err(err) => {
                self.exit_code = 1;
                writeln!(self.out, "{}", err)?;
                return self.print_error("connect", None);
            }
        };

        let mut rows = Vec::new();
        let mut failed = 0;
        for server in connection.active_servers() {
            match connection.server_info(&server) {
                Ok(info) => {
                    debug!(server = %info.server_url, node = %info.node_name, "server reachable");
                    rows.push(vec![
                        Value::String(info.server_url),
                        Value::String(info.node_name),
                        Value::Bool(true),
                        Value::String("OK".to_string()),
                    ]);
                }
                Err(err) => {
                    warn!(server = %server, error = %err, "server unreachable");
                    failed += 1;
                    rows.push(vec![
                        Value::String(server),
                        Value::Null,
                        Value::Bool(false),
                        Value::String(err.to_string()),
                    ]);
                }
            }
        }
        self.connection = Some(connection);

        let headers = CONNECT_COLUMNS.iter().map(|c| c.to_string()).collect();
        self.print_table(headers, &rows)?;

        if failed == rows.len() {
            self.exit_code = 1;
            self.print_error("connect", None)
        } else {
            self.print_success("connect", None)
        }
    }

    fn execute(&mut self, keyword: &str, remainder: &str) -> Result<Option<StatementResult>> {
        let statement = if remainder.is_empty() {
            keyword.to_string()
        } else {
            format!("{} {}", keyword, remainder)
        };

        let Some(connection) = self.connection.as_mut() else {
            self.exit_code = 1;
            writeln!(self.out, "{}", NOT_CONNECTED)?;
            return Ok(None);
        };

        match connection.execute(&statement) {
            Ok(result) => Ok(Some(result)),
            Err(BackendError::Connection(message)) => {
                warn!(%message, "statement could not reach any server");
                self.exit_code = 1;
                writeln!(self.out, "{}", NOT_CONNECTED)?;
                Ok(None)
            }
            Err(BackendError::Execution {
                message,
                error_trace,
            }) => {
                self.exit_code = 1;
                writeln!(self.out, "{}", message)?;
                if let Some(trace) = error_trace.filter(|_| self.error_trace) {
                    writeln!(self.out, "{}", trace)?;
                }
                Ok(None)
            }
        }
    }

    fn print_table(&mut self, headers: Vec<String>, rows: &[Vec<Value>]) -> Result<()> {
        let table = TableFormatter::new(headers, rows).render();
        if !table.is_empty() {
            encoding::write_block(&mut self.out, &table, self.encoding)?;
        }
        Ok(())
    }

    fn print_rows_selected(&mut self, result: &StatementResult) -> Result<()> {
        let count = result.row_count;
        match result.duration_secs() {
            Some(secs) => writeln!(
                self.out,
                "SELECT {} row{} in set ({:.3} sec)",
                count,
                plural(count),
                secs
            )?,
            None => writeln!(self.out, "SELECT {} row{} in set", count, plural(count))?,
        }
        Ok(())
    }

    fn print_rows_affected(&mut self, command: &str, result: &StatementResult) -> Result<()> {
        let command = command.to_uppercase();
        let count = result.row_count;
        match result.duration_secs() {
            Some(secs) => writeln!(
                self.out,
                "{} OK, {} row{} affected ({:.3} sec)",
                command,
                count,
                plural(count),
                secs
            )?,
            None => writeln!(
                self.out,
                "{} OK, {} row{} affected",
                command,
                count,
                plural(count)
            )?,
        }
        Ok(())
    }

    fn print_success(&mut self, command: &str, duration_secs: Option<f64>) -> Result<()> {
        let command = command.to_uppercase();
        match duration_secs {
            Some(secs) => writeln!(self.out, "{} OK ({:.3} sec)", command, secs)?,
            None => writeln!(self.out, "{} OK", command)?,
        }
        Ok(())
    }

    fn print_error(&mut self, command: &str, duration_secs: Option<f64>) -> Result<()> {
        let command = command.to_uppercase();
        match duration_secs {
            Some(secs) => writeln!(self.out, "{} ERROR ({:.3} sec)", command, secs)?,
            None => writeln!(self.out, "{} ERROR", command)?,
        }
        Ok(())
    }

    fn print_help(&mut self, topic: &str) -> Result<()> {
        let topic = topic.trim();
        if topic.is_empty() {
            let header = "Documented commands (type help <topic>):";
            writeln!(self.out, "{}", header)?;
            writeln!(self.out, "{}", "=".repeat(header.len()))?;
            writeln!(self.out, "{}", self.commands.names().join("  "))?;
            return Ok(());
        }

        match self.commands.lookup(topic) {
            Some(spec) => {
                writeln!(self.out, "{}", spec.summary)?;
                if let Some(example) = spec.example {
                    writeln!(self.out)?;
                    writeln!(self.out, "E.g.:")?;
                    writeln!(self.out, "    {}", example)?;
                }
            }
            None => writeln!(self.out, "*** No help on {}", topic)?,
        }
        Ok(())
    }
}

fn plural(count: i64) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
