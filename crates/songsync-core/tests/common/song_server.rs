//! Minimal HTTP/1.1 server that mimics the song server for integration tests.
//!
//! Routes:
//! - `GET /` sets a `uid` session cookie.
//! - `GET /songs_list` returns the current list body with the current status,
//!   or holds the connection open without answering while stalled.
//! - `GET /download/<name>` returns a registered file, 404 otherwise.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

pub const SESSION_ID: &str = "6a1f3c2e-test-session";

struct State {
    list_status: u16,
    list_body: String,
    files: HashMap<String, Vec<u8>>,
    list_cookies: Vec<Option<String>>,
    list_stalled: bool,
}

/// Handle to a running server. The server runs until the process exits.
#[derive(Clone)]
pub struct SongServer {
    pub base_url: String,
    state: Arc<Mutex<State>>,
}

impl SongServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(State {
            list_status: 200,
            list_body: "[]".to_string(),
            files: HashMap::new(),
            list_cookies: Vec::new(),
            list_stalled: false,
        }));
        let server_state = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&server_state);
                thread::spawn(move || handle(stream, &state));
            }
        });
        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    pub fn set_list(&self, body: &str) {
        let mut s = self.state.lock().unwrap();
        s.list_status = 200;
        s.list_body = body.to_string();
    }

    pub fn set_list_error(&self, status: u16) {
        self.state.lock().unwrap().list_status = status;
    }

    /// While stalled, list requests get no response (up to 10s).
    pub fn set_list_stalled(&self, stalled: bool) {
        self.state.lock().unwrap().list_stalled = stalled;
    }

    pub fn add_file(&self, name: &str, body: Vec<u8>) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(name.to_string(), body);
    }

    /// `Cookie` header of every list request so far.
    pub fn list_cookies(&self) -> Vec<Option<String>> {
        self.state.lock().unwrap().list_cookies.clone()
    }
}

/// JSON for one song in the server's wire format.
pub fn song_json(id: u64, downloaded: bool) -> String {
    format!(
        r#"{{"id": {id}, "title": "Title {id}", "thumbnail_url": "https://img.test/{id}.jpg",
            "author": "Author {id}", "downloaded": {downloaded}, "file_name": "song-{id}.mp3",
            "size": "3.1MB", "yt_id": "yt{id}", "length": "00:03:0{id}"}}"#
    )
}

pub fn list_json(songs: &[(u64, bool)]) -> String {
    let items: Vec<String> = songs.iter().map(|(id, d)| song_json(*id, *d)).collect();
    format!("[{}]", items.join(","))
}

fn handle(mut stream: std::net::TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, path, cookie) = parse_request(request);
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }

    let (status, extra, body): (String, String, Vec<u8>) = if path == "/" {
        (
            "200 OK".to_string(),
            format!("Set-Cookie: uid={}; Path=/\r\n", SESSION_ID),
            b"<html></html>".to_vec(),
        )
    } else if path == "/songs_list" {
        state.lock().unwrap().list_cookies.push(cookie);
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while state.lock().unwrap().list_stalled && std::time::Instant::now() < deadline {
            thread::sleep(std::time::Duration::from_millis(10));
        }
        let s = state.lock().unwrap();
        (
            status_line(s.list_status),
            "Content-Type: application/json\r\n".to_string(),
            s.list_body.clone().into_bytes(),
        )
    } else if let Some(name) = path.strip_prefix("/download/") {
        match state.lock().unwrap().files.get(name) {
            Some(f) => ("200 OK".to_string(), String::new(), f.clone()),
            None => ("404 Not Found".to_string(), String::new(), Vec::new()),
        }
    } else {
        ("404 Not Found".to_string(), String::new(), Vec::new())
    };

    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n",
        status,
        body.len(),
        extra
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&body);
}

fn status_line(code: u16) -> String {
    match code {
        200 => "200 OK".to_string(),
        404 => "404 Not Found".to_string(),
        500 => "500 Internal Server Error".to_string(),
        503 => "503 Service Unavailable".to_string(),
        other => format!("{} Status", other),
    }
}

/// Returns (method, path, Cookie header value).
fn parse_request(request: &str) -> (&str, &str, Option<String>) {
    let mut method = "";
    let mut path = "";
    let mut cookie = None;
    for line in request.lines() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if method.is_empty() {
            let mut parts = line.split_whitespace();
            method = parts.next().unwrap_or("");
            path = parts.next().unwrap_or("");
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("cookie") {
                cookie = Some(value.trim().to_string());
            }
        }
    }
    (method, path, cookie)
}
