//! # HTTP Backend Tests
//!
//! Runs `HttpConnector` against a loopback listener that answers with
//! canned HTTP responses, one per connection.

use crash::backend::{BackendError, Connection, Connector, HttpConnector};
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

struct Request {
    request_line: String,
    body: String,
}

fn serve(responses: Vec<(u16, &'static str)>) -> (String, thread::JoinHandle<Vec<Request>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for (status, body) in responses {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();

            let mut content_length = 0;
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                let header = header.trim_end();
                if header.is_empty() {
                    break;
                }
                if let Some((name, value)) = header.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut request_body = vec![0; content_length];
            reader.read_exact(&mut request_body).unwrap();

            let reason = if status == 200 { "OK" } else { "Bad Request" };
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason,
                body.len(),
                body
            );
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();

            requests.push(Request {
                request_line: request_line.trim_end().to_string(),
                body: String::from_utf8(request_body).unwrap(),
            });
        }
        requests
    });

    (url, handle)
}

fn dead_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    url
}

fn connector(error_trace: bool) -> HttpConnector {
    HttpConnector::new(error_trace).with_timeout(Duration::from_secs(5))
}

mod http_backend_tests {
    use super::*;

    #[test]
    fn probe_reads_node_name() {
        let (url, server) = serve(vec![(200, r#"{"ok": true, "status": 200, "name": "crate1"}"#)]);
        let connection = connector(false).connect(&[url.clone()]).unwrap();

        let info = connection.server_info(&url).unwrap();

        assert_eq!(info.server_url, url);
        assert_eq!(info.node_name, "crate1");
        let requests = server.join().unwrap();
        assert_eq!(requests[0].request_line, "GET / HTTP/1.1");
    }

    #[test]
    fn select_posts_statement_as_json() {
        let (url, server) = serve(vec![(
            200,
            r#"{"cols": ["name"], "rows": [["Algol"], [null]], "rowcount": 2, "duration": 1.5}"#,
        )]);
        let mut connection = connector(false).connect(&[url]).unwrap();

        let result = connection.execute("select name from locations").unwrap();

        assert_eq!(result.column_names, vec!["name"]);
        assert_eq!(result.rows, vec![vec![json!("Algol")], vec![Value::Null]]);
        assert_eq!(result.row_count, 2);
        assert_eq!(result.duration_millis, Some(1.5));

        let requests = server.join().unwrap();
        assert_eq!(requests[0].request_line, "POST /_sql HTTP/1.1");
        let body: Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(body, json!({"stmt": "select name from locations"}));
    }

    #[test]
    fn error_response_becomes_execution_error() {
        let (url, server) = serve(vec![(
            400,
            r#"{"error": {"message": "SQLActionException[TableUnknownException: Table 'x' unknown]", "code": 4041}, "error_trace": "at io.crate..."}"#,
        )]);
        let mut connection = connector(true).connect(&[url]).unwrap();

        let err = connection.execute("select * from x").unwrap_err();

        assert_eq!(
            err,
            BackendError::Execution {
                message: "SQLActionException[TableUnknownException: Table 'x' unknown]".to_string(),
                error_trace: Some("at io.crate...".to_string()),
            }
        );
        let requests = server.join().unwrap();
        assert_eq!(requests[0].request_line, "POST /_sql?error_trace=true HTTP/1.1");
    }

    #[test]
    fn unreachable_server_fails_over_to_next() {
        let (url, server) = serve(vec![(200, r#"{"cols": [], "rows": [], "rowcount": 1, "duration": 0.3}"#)]);
        let mut connection = connector(false).connect(&[dead_server(), url]).unwrap();

        let result = connection.execute("insert into t values (1)").unwrap();

        assert_eq!(result.row_count, 1);
        server.join().unwrap();
    }

    #[test]
    fn all_servers_down_is_a_connection_error() {
        let mut connection = connector(false).connect(&[dead_server(), dead_server()]).unwrap();

        let err = connection.execute("select 1").unwrap_err();

        assert!(err.is_connection());
        assert!(err
            .to_string()
            .contains("No more Servers available, exception from last server:"));
    }

    #[test]
    fn probe_of_dead_server_reports_unavailable() {
        let url = dead_server();
        let connection = connector(false).connect(&[url.clone()]).unwrap();

        let err = connection.server_info(&url).unwrap_err();

        assert!(err.is_connection());
        assert!(err.to_string().starts_with("Server not available"));
    }
}
