#![allow(dead_code)]

use assert_cmd::Command;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

/// Build a Command targeting the solvr binary with an isolated config dir
/// and none of the caller's credentials.
pub fn solvr_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("solvr"));
    cmd.env("HOME", home);
    cmd.env("XDG_CONFIG_HOME", home.join(".config"));
    cmd.env("SOLVR_LOG", "error");
    for var in ["SOLVR_API_URL", "SOLVR_TOKEN", "SOLVR_USER_ID", "FORMAT", "DEBUG"] {
        cmd.env_remove(var);
    }
    cmd
}

/// One request as the mock server saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub target: String,
    pub authorization: Option<String>,
}

type Route = dyn Fn(&str, &str) -> (u16, String) + Send + Sync;

/// Minimal HTTP/1.1 server on `127.0.0.1:0`. Each connection serves one
/// request and is closed; `route(method, target)` picks the reply.
pub struct MockServer {
    pub base_url: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl MockServer {
    pub fn start(route: impl Fn(&str, &str) -> (u16, String) + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let port = listener.local_addr().expect("local addr").port();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let route: Arc<Route> = Arc::new(route);

        let log = Arc::clone(&seen);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let route = Arc::clone(&route);
                let log = Arc::clone(&log);
                thread::spawn(move || serve(stream, &*route, &log));
            }
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}/api"),
            seen,
        }
    }

    pub fn requests(&self) -> Vec<Seen> {
        self.seen.lock().expect("seen lock").clone()
    }

    pub fn count(&self, method: &str, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.target.starts_with(prefix))
            .count()
    }
}

fn serve(stream: TcpStream, route: &Route, log: &Mutex<Vec<Seen>>) {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts
        .next()
        .unwrap_or_default()
        .trim_start_matches("/api")
        .to_string();

    let mut content_length = 0;
    let mut authorization = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).is_err() || line == "\r\n" || line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim();
            match name.to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.parse().unwrap_or(0),
                "authorization" => authorization = Some(value.to_string()),
                _ => {}
            }
        }
    }
    let mut body = vec![0; content_length];
    let _ = reader.read_exact(&mut body);

    log.lock().expect("seen lock").push(Seen {
        method: method.clone(),
        target: target.clone(),
        authorization,
    });

    let (status, payload) = route(&method, &target);
    let response = format!(
        "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
        payload.len()
    );
    let mut stream = stream;
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

pub fn ok(data: &str) -> (u16, String) {
    (200, format!(r#"{{"success":true,"data":{data}}}"#))
}

pub fn page(data: &str, current: u32, next: Option<u32>) -> (u16, String) {
    let next = next.map_or_else(|| "null".to_string(), |n| n.to_string());
    (
        200,
        format!(
            r#"{{"success":true,"data":{data},"pagination":{{"total_records":0,"total_pages":0,"current_page":{current},"prev_page":null,"next_page":{next}}}}}"#
        ),
    )
}

pub fn not_found() -> (u16, String) {
    (404, r#"{"success":false,"message":"no such route"}"#.to_string())
}

pub fn task_json(id: &str, title: &str, status: &str, owner: &str) -> String {
    format!(
        r#"{{"id":"{id}","title":"{title}","description":"d","kind":"community","status":"{status}","createdAt":"2025-03-01T12:00:00Z","createdBy":"{owner}","metrics":{{"totalFunds":10,"totalVotes":0}}}}"#
    )
}

pub fn solution_json(id: &str, author: &str, votes: u64) -> String {
    format!(
        r#"{{"id":"{id}","taskId":"t-1","content":"answer {id}","createdAt":"2025-03-02T12:00:00Z","createdBy":"{author}","totalVotes":{votes}}}"#
    )
}
