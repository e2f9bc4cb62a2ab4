//! Minimal HTTP/1.1 object server for integration tests.
//!
//! Implements the backend wire shapes: `HEAD /files/{hash}`, multipart
//! `POST /files` and JSON `POST /jobs`. One request per connection.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct ObjectServerOptions {
    /// If set, requests without `Authorization: Bearer <token>` get 401.
    pub required_token: Option<&'static str>,
    /// If true, `POST /files` answers 500 without storing.
    pub fail_uploads: bool,
    /// Hold every `POST /files` this long before handling it.
    pub upload_stall: Option<Duration>,
}

impl Default for ObjectServerOptions {
    fn default() -> Self {
        Self {
            required_token: Some("test-token"),
            fail_uploads: false,
            upload_stall: None,
        }
    }
}

/// One stored upload as the server saw it.
#[derive(Debug, Clone)]
pub struct ReceivedUpload {
    pub part_name: String,
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct ServerState {
    pub objects: HashMap<String, ReceivedUpload>,
    pub head_requests: usize,
    pub upload_requests: usize,
    pub jobs: Vec<serde_json::Value>,
}

pub struct ObjectServer {
    pub base_url: String,
    pub state: Arc<Mutex<ServerState>>,
}

impl ObjectServer {
    pub fn head_requests(&self) -> usize {
        self.state.lock().unwrap().head_requests
    }

    pub fn upload_requests(&self) -> usize {
        self.state.lock().unwrap().upload_requests
    }

    pub fn object(&self, hash: &str) -> Option<ReceivedUpload> {
        self.state.lock().unwrap().objects.get(hash).cloned()
    }

    pub fn preload(&self, bytes: &[u8]) -> String {
        let hash = hex::encode(Sha256::digest(bytes));
        self.state.lock().unwrap().objects.insert(
            hash.clone(),
            ReceivedUpload {
                part_name: "file".into(),
                filename: "preloaded".into(),
                content_type: "application/octet-stream".into(),
                bytes: bytes.to_vec(),
            },
        );
        hash
    }
}

pub fn start() -> ObjectServer {
    start_with_options(ObjectServerOptions::default())
}

/// Starts the server in a background thread. The base URL has no trailing slash.
pub fn start_with_options(opts: ObjectServerOptions) -> ObjectServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(Mutex::new(ServerState::default()));
    let st = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let st = Arc::clone(&st);
            thread::spawn(move || handle(stream, &st, opts));
        }
    });
    ObjectServer {
        base_url: format!("http://127.0.0.1:{}", port),
        state,
    }
}

/// A base URL nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

struct Request {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

fn find(hay: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > hay.len() {
        return None;
    }
    hay[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let header_end = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(p) = find(&buf, b"\r\n\r\n", 0) {
            break p;
        }
    };
    let head = std::str::from_utf8(&buf[..header_end]).ok()?;
    let mut lines = head.split("\r\n");
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let path = first.next()?.to_string();
    let mut headers = HashMap::new();
    for line in lines {
        if let Some((k, v)) = line.split_once(':') {
            headers.insert(k.trim().to_ascii_lowercase(), v.trim().to_string());
        }
    }
    let len: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < len {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    Some(Request {
        method,
        path,
        headers,
        body,
    })
}

fn respond(stream: &mut TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

fn respond_head(stream: &mut TcpStream, status: &str) {
    let response = format!("HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n", status);
    let _ = stream.write_all(response.as_bytes());
}

/// Extract the single multipart part: (name, filename, content type, bytes).
fn parse_multipart(content_type: &str, body: &[u8]) -> Option<ReceivedUpload> {
    let boundary = content_type
        .split(';')
        .find_map(|p| p.trim().strip_prefix("boundary="))?
        .trim_matches('"');
    let delim = format!("--{}", boundary);
    let start = find(body, delim.as_bytes(), 0)? + delim.len() + 2;
    let headers_end = find(body, b"\r\n\r\n", start)?;
    let part_headers = std::str::from_utf8(&body[start..headers_end]).ok()?;
    let data_start = headers_end + 4;
    let data_end = find(body, format!("\r\n{}", delim).as_bytes(), data_start)?;

    let mut part_name = String::new();
    let mut filename = String::new();
    let mut ctype = String::new();
    for line in part_headers.split("\r\n") {
        let Some((k, v)) = line.split_once(':') else {
            continue;
        };
        if k.trim().eq_ignore_ascii_case("content-disposition") {
            for attr in v.split(';') {
                let attr = attr.trim();
                if let Some(n) = attr.strip_prefix("name=") {
                    part_name = n.trim_matches('"').to_string();
                } else if let Some(f) = attr.strip_prefix("filename=") {
                    filename = f.trim_matches('"').to_string();
                }
            }
        } else if k.trim().eq_ignore_ascii_case("content-type") {
            ctype = v.trim().to_string();
        }
    }
    Some(ReceivedUpload {
        part_name,
        filename,
        content_type: ctype,
        bytes: body[data_start..data_end].to_vec(),
    })
}

fn handle(mut stream: TcpStream, state: &Mutex<ServerState>, opts: ObjectServerOptions) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(req) = read_request(&mut stream) else {
        return;
    };

    if let Some(token) = opts.required_token {
        let expected = format!("Bearer {}", token);
        if req.headers.get("authorization").map(String::as_str) != Some(expected.as_str()) {
            if req.method == "HEAD" {
                respond_head(&mut stream, "401 Unauthorized");
            } else {
                respond(&mut stream, "401 Unauthorized", r#"{"error":"unauthorized"}"#);
            }
            return;
        }
    }

    match (req.method.as_str(), req.path.as_str()) {
        ("HEAD", p) if p.starts_with("/files/") => {
            let hash = &p["/files/".len()..];
            let present = {
                let mut st = state.lock().unwrap();
                st.head_requests += 1;
                st.objects.contains_key(hash)
            };
            respond_head(&mut stream, if present { "200 OK" } else { "404 Not Found" });
        }
        ("POST", "/files") => {
            state.lock().unwrap().upload_requests += 1;
            if let Some(stall) = opts.upload_stall {
                thread::sleep(stall);
            }
            if opts.fail_uploads {
                respond(&mut stream, "500 Internal Server Error", r#"{"error":"disk full"}"#);
                return;
            }
            let ctype = req.headers.get("content-type").cloned().unwrap_or_default();
            let Some(part) = parse_multipart(&ctype, &req.body) else {
                respond(&mut stream, "400 Bad Request", r#"{"error":"bad multipart"}"#);
                return;
            };
            let hash = hex::encode(Sha256::digest(&part.bytes));
            let existed = {
                let mut st = state.lock().unwrap();
                st.objects.insert(hash.clone(), part).is_some()
            };
            let status = if existed { "200 OK" } else { "202 Accepted" };
            respond(&mut stream, status, &format!(r#"{{"data":{{"hash":"{}"}}}}"#, hash));
        }
        ("POST", "/jobs") => {
            let Ok(job) = serde_json::from_slice::<serde_json::Value>(&req.body) else {
                respond(&mut stream, "400 Bad Request", r#"{"error":"bad json"}"#);
                return;
            };
            let id = {
                let mut st = state.lock().unwrap();
                st.jobs.push(job);
                st.jobs.len()
            };
            respond(&mut stream, "201 Created", &format!(r#"{{"jobId":"job-{}"}}"#, id));
        }
        _ => respond(&mut stream, "404 Not Found", r#"{"error":"not found"}"#),
    }
}
