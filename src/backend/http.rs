//! # HTTP Backend
//!
//! Talks to CrateDB-compatible servers over their HTTP endpoint.
//!
//! ## Wire Format
//!
//! Statements are posted as JSON to `<server>/_sql`:
//!
//! ```text
//! POST /_sql?error_trace=true
//! {"stmt": "select name from sys.cluster"}
//!
//! 200 OK
//! {"cols": ["name"], "rows": [["crate"]], "rowcount": 1, "duration": 0.82}
//!
//! 400 Bad Request
//! {"error": {"message": "SQLParseException[...]", "code": 4000},
//!  "error_trace": "..."}
//! ```
//!
//! A node is probed with `GET <server>/`, whose body carries the node name
//! in its `name` field.
//!
//! ## Failover
//!
//! Servers are used round-robin. A transport failure, or a gateway status
//! (502, 503, 504), moves on to the next server. Only when every server has
//! failed does `execute` return [`BackendError::Connection`].

use super::{BackendError, Connection, Connector, ServerInfo, StatementResult};
use crate::config::{DEFAULT_SERVER, HTTP_TIMEOUT, SQL_PATH};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

const UNKNOWN_ROW_COUNT: i64 = -1;

#[derive(Debug, Deserialize)]
struct SqlResponse {
    #[serde(default)]
    cols: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
    #[serde(default = "unknown_row_count")]
    rowcount: i64,
    #[serde(default)]
    duration: Option<f64>,
}

fn unknown_row_count() -> i64 {
    UNKNOWN_ROW_COUNT
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
    #[serde(default)]
    error_trace: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct NodeResponse {
    name: String,
}

pub struct HttpConnector {
    error_trace: bool,
    timeout: Duration,
}

impl HttpConnector {
    pub fn new(error_trace: bool) -> Self {
        Self {
            error_trace,
            timeout: HTTP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Connector for HttpConnector {
    fn connect(&self, hosts: &[String]) -> Result<Box<dyn Connection>, BackendError> {
        let servers: Vec<String> = if hosts.is_empty() {
            vec![DEFAULT_SERVER.to_string()]
        } else {
            hosts.iter().map(|h| normalize_host(h)).collect()
        };
        debug!(?servers, "connecting");

        let agent = ureq::AgentBuilder::new().timeout(self.timeout).build();
        Ok(Box::new(HttpConnection {
            agent,
            servers,
            next_server: 0,
            error_trace: self.error_trace,
        }))
    }
}

pub struct HttpConnection {
    agent: ureq::Agent,
    servers: Vec<String>,
    next_server: usize,
    error_trace: bool,
}

impl HttpConnection {
    fn sql_url(&self, server: &str) -> String {
        if self.error_trace {
            format!("{}{}?error_trace=true", server, SQL_PATH)
        } else {
            format!("{}{}", server, SQL_PATH)
        }
    }
}

impl Connection for HttpConnection {
    fn execute(&mut self, statement: &str) -> Result<StatementResult, BackendError> {
        let body = json!({ "stmt": statement });
        let mut last_failure = String::from("no servers configured");

        for attempt in 0..self.servers.len() {
            let index = (self.next_server + attempt) % self.servers.len();
            let server = &self.servers[index];
            let url = self.sql_url(server);

            match self.agent.post(&url).send_json(&body) {
                Ok(response) => {
                    self.next_server = (index + 1) % self.servers.len();
                    let decoded: SqlResponse = response.into_json().map_err(|e| {
                        BackendError::Execution {
                            message: format!("invalid response from {}: {}", server, e),
                            error_trace: None,
                        }
                    })?;
                    return Ok(decoded.into());
                }
                Err(ureq::Error::Status(code, response)) if !is_gateway_status(code) => {
                    self.next_server = (index + 1) % self.servers.len();
                    let text = response.into_string().unwrap_or_default();
                    return Err(decode_error(code, &text));
                }
                Err(err) => {
                    warn!(server = %server, error = %err, "server unavailable, trying next");
                    last_failure = err.to_string();
                }
            }
        }

        Err(BackendError::Connection(format!(
            "No more Servers available, exception from last server: {}",
            last_failure
        )))
    }

    fn active_servers(&self) -> Vec<String> {
        self.servers.clone()
    }

    fn server_info(&self, server: &str) -> Result<ServerInfo, BackendError> {
        let url = format!("{}/", server);
        let unavailable =
            |e: String| BackendError::Connection(format!("Server not available, exception: {}", e));

        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| unavailable(e.to_string()))?;
        let node: NodeResponse = response
            .into_json()
            .map_err(|e| unavailable(e.to_string()))?;

        debug!(server = %server, node = %node.name, "probe succeeded");
        Ok(ServerInfo {
            server_url: server.to_string(),
            node_name: node.name,
        })
    }
}

impl From<SqlResponse> for StatementResult {
    fn from(response: SqlResponse) -> Self {
        StatementResult {
            column_names: response.cols,
            rows: response.rows,
            row_count: response.rowcount,
            duration_millis: response.duration.filter(|d| *d >= 0.0),
        }
    }
}

pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let url = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    };
    url.trim_end_matches('/').to_string()
}

fn is_gateway_status(code: u16) -> bool {
    matches!(code, 502..=504)
}

fn decode_error(status: u16, body: &str) -> BackendError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => BackendError::Execution {
            message: parsed.error.message,
            error_trace: parsed.error_trace.filter(|t| !t.is_empty()),
        },
        Err(_) => BackendError::Execution {
            message: format!("{} {}", status, body.trim()),
            error_trace: None,
        },
    }
}
