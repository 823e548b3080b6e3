//! # Shell Session Tests
//!
//! Drives the dispatcher and the batch session loops through the public API
//! against an in-process backend. Covers:
//!
//! - Multi-line statement reassembly in piped input
//! - Query, mutation and status output
//! - Connect reporting for reachable and unreachable servers
//! - Exit status accumulation in command and piped modes, and `exit`
//!   ending them with 0

use crash::backend::{BackendError, Connection, Connector, ServerInfo, StatementResult};
use crash::cli::encoding::OutputEncoding;
use crash::cli::{run_batch, run_command, CommandResult, Dispatcher};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::rc::Rc;

const SERVER: &str = "http://localhost:4200";

#[derive(Default)]
struct Backend {
    responses: VecDeque<Result<StatementResult, BackendError>>,
    executed: Vec<String>,
    nodes: HashMap<String, String>,
}

#[derive(Clone, Default)]
struct FakeConnector {
    backend: Rc<RefCell<Backend>>,
}

impl FakeConnector {
    fn with_node(self, server: &str, node: &str) -> Self {
        self.backend
            .borrow_mut()
            .nodes
            .insert(server.to_string(), node.to_string());
        self
    }

    fn respond(&self, result: Result<StatementResult, BackendError>) {
        self.backend.borrow_mut().responses.push_back(result);
    }

    fn executed(&self) -> Vec<String> {
        self.backend.borrow().executed.clone()
    }
}

struct FakeConnection {
    servers: Vec<String>,
    backend: Rc<RefCell<Backend>>,
}

impl Connector for FakeConnector {
    fn connect(&self, hosts: &[String]) -> Result<Box<dyn Connection>, BackendError> {
        let servers = if hosts.is_empty() {
            vec![SERVER.to_string()]
        } else {
            hosts.to_vec()
        };
        Ok(Box::new(FakeConnection {
            servers,
            backend: Rc::clone(&self.backend),
        }))
    }
}

impl Connection for FakeConnection {
    fn execute(&mut self, statement: &str) -> Result<StatementResult, BackendError> {
        let mut backend = self.backend.borrow_mut();
        backend.executed.push(statement.to_string());
        backend
            .responses
            .pop_front()
            .unwrap_or_else(|| Ok(StatementResult::default()))
    }

    fn active_servers(&self) -> Vec<String> {
        self.servers.clone()
    }

    fn server_info(&self, server: &str) -> Result<ServerInfo, BackendError> {
        match self.backend.borrow().nodes.get(server) {
            Some(node) => Ok(ServerInfo {
                server_url: server.to_string(),
                node_name: node.clone(),
            }),
            None => Err(BackendError::Connection(
                "Server not available, exception: connection refused".to_string(),
            )),
        }
    }
}

fn shell(connector: &FakeConnector) -> Dispatcher<Vec<u8>> {
    Dispatcher::new(Vec::new(), Box::new(connector.clone()), false)
        .with_encoding(OutputEncoding::Utf8)
}

fn connected_shell() -> (Dispatcher<Vec<u8>>, FakeConnector) {
    let connector = FakeConnector::default().with_node(SERVER, "crate1");
    let mut dispatcher = shell(&connector);
    dispatcher.connect(&[]).unwrap();
    (dispatcher, connector)
}

fn output(dispatcher: Dispatcher<Vec<u8>>) -> String {
    String::from_utf8(dispatcher.into_output()).unwrap()
}

fn query(columns: &[&str], rows: Vec<Vec<Value>>, duration: Option<f64>) -> StatementResult {
    StatementResult {
        column_names: columns.iter().map(|c| c.to_string()).collect(),
        row_count: rows.len() as i64,
        rows,
        duration_millis: duration,
    }
}

fn execution_error(message: &str) -> BackendError {
    BackendError::Execution {
        message: message.to_string(),
        error_trace: None,
    }
}

mod connect_tests {
    use super::*;

    #[test]
    fn default_connect_prints_server_table() {
        let (dispatcher, _connector) = connected_shell();

        let expected = "\
+-----------------------+-----------+-----------+---------+
| server_url            | node_name | connected | message |
+-----------------------+-----------+-----------+---------+
| http://localhost:4200 | crate1    | TRUE      | OK      |
+-----------------------+-----------+-----------+---------+
CONNECT OK
";
        assert_eq!(output(dispatcher), expected);
    }

    #[test]
    fn partial_connect_succeeds_with_breakdown() {
        let connector = FakeConnector::default().with_node(SERVER, "crate1");
        let mut dispatcher = shell(&connector);

        dispatcher
            .dispatch("connect http://localhost:4200 http://localhost:4201")
            .unwrap();

        assert_eq!(dispatcher.exit_code(), 0);
        let out = output(dispatcher);
        assert!(out.contains("| http://localhost:4201 | NULL      | FALSE     |"));
        assert!(out.ends_with("CONNECT OK\n"));
    }

    #[test]
    fn connect_fails_when_no_server_answers() {
        let connector = FakeConnector::default();
        let mut dispatcher = shell(&connector);

        dispatcher.dispatch("connect 10.0.0.1:4200").unwrap();

        assert_eq!(dispatcher.exit_code(), 1);
        assert!(output(dispatcher).ends_with("CONNECT ERROR\n"));
    }
}

mod dispatch_tests {
    use super::*;

    #[test]
    fn select_one_renders_single_cell_table() {
        let (mut dispatcher, connector) = connected_shell();
        connector.respond(Ok(query(&["1"], vec![vec![json!(1)]], Some(1.0))));

        dispatcher.dispatch("select 1").unwrap();

        let out = output(dispatcher);
        assert!(out.ends_with("+---+\n| 1 |\n+---+\n| 1 |\n+---+\nSELECT 1 row in set (0.001 sec)\n"));
    }

    #[test]
    fn booleans_and_nulls_use_tokens() {
        let (mut dispatcher, connector) = connected_shell();
        connector.respond(Ok(query(
            &["a", "b"],
            vec![vec![json!(true), Value::Null], vec![Value::Null, json!(false)]],
            None,
        )));

        dispatcher.dispatch("SELECT a, b FROM t").unwrap();

        let out = output(dispatcher);
        assert!(out.contains("| TRUE | NULL  |\n| NULL | FALSE |\n"));
        assert!(out.ends_with("SELECT 2 rows in set\n"));
        assert_eq!(connector.executed(), vec!["select a, b FROM t"]);
    }

    #[test]
    fn mutation_prints_only_affected_rows() {
        let (mut dispatcher, connector) = connected_shell();
        connector.respond(Ok(StatementResult {
            column_names: vec![],
            rows: vec![],
            row_count: 3,
            duration_millis: Some(12.0),
        }));

        dispatcher.dispatch("update t set x = 1").unwrap();

        let out = output(dispatcher);
        assert!(out.ends_with("CONNECT OK\nUPDATE OK, 3 rows affected (0.012 sec)\n"));
    }

    #[test]
    fn exit_is_reported_to_the_caller() {
        let (mut dispatcher, _connector) = connected_shell();

        assert_eq!(dispatcher.dispatch("quit").unwrap(), CommandResult::Exit);
        assert!(output(dispatcher).ends_with("Bye\n"));
    }
}

mod batch_tests {
    use super::*;

    #[test]
    fn command_string_runs_left_to_right() {
        let (mut dispatcher, connector) = connected_shell();

        let code = run_command(&mut dispatcher, "drop table a;create table a (x int);refresh table a").unwrap();

        assert_eq!(code, 0);
        assert_eq!(
            connector.executed(),
            vec!["drop table a", "create table a (x int)", "refresh table a"]
        );
        let out = output(dispatcher);
        assert!(out.contains("DROP OK\nCREATE OK\nREFRESH OK\n"));
    }

    #[test]
    fn command_exit_code_is_one_when_any_statement_fails() {
        let (mut dispatcher, connector) = connected_shell();
        connector.respond(Ok(StatementResult::default()));
        connector.respond(Err(execution_error("SQLActionException[TableAlreadyExistsException]")));

        let code = run_command(&mut dispatcher, "drop table a; create table a (x int); select 1").unwrap();

        assert_eq!(code, 1);
        assert_eq!(connector.executed().len(), 3);
        assert!(output(dispatcher).contains("SQLActionException[TableAlreadyExistsException]\n"));
    }

    #[test]
    fn exit_in_command_string_ends_with_zero_after_failure() {
        let (mut dispatcher, connector) = connected_shell();

        let code = run_command(&mut dispatcher, "explode; exit; select 1").unwrap();

        assert_eq!(code, 0);
        assert!(connector.executed().is_empty());
        let out = output(dispatcher);
        assert!(out.ends_with("*** Unknown syntax: explode\nBye\n"));
    }

    #[test]
    fn piped_quit_ends_with_zero_after_failure() {
        let (mut dispatcher, connector) = connected_shell();
        connector.respond(Err(execution_error("SQLActionException[TableUnknownException]")));

        let code = run_batch(&mut dispatcher, Cursor::new("select * from missing;\nquit;\nselect 2;\n")).unwrap();

        assert_eq!(code, 0);
        assert_eq!(connector.executed(), vec!["select * from missing"]);
    }

    #[test]
    fn piped_script_reassembles_statements() {
        let (mut dispatcher, connector) = connected_shell();
        let script = "\
-- schema setup
create table locations (
id integer,
    -- the display name
name string
);

insert into locations (id, name)
values (1, 'Algol');;
";

        let code = run_batch(&mut dispatcher, Cursor::new(script)).unwrap();

        assert_eq!(code, 0);
        assert_eq!(
            connector.executed(),
            vec![
                "create table locations ( id integer, name string )",
                "insert into locations (id, name) values (1, 'Algol')",
            ]
        );
    }

    #[test]
    fn piped_script_without_connection_fails() {
        let connector = FakeConnector::default();
        let mut dispatcher = shell(&connector);

        let code = run_batch(&mut dispatcher, Cursor::new("select 1;\n")).unwrap();

        assert_eq!(code, 1);
        assert_eq!(
            output(dispatcher),
            "Use \"connect <hostname:port>\" to connect to a server first\n"
        );
    }
}
