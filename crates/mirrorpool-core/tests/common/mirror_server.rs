//! Minimal HTTP/1.1 mirror for integration tests.
//!
//! Serves one static body for every GET under its base URL, or answers every
//! request with a fixed error status to simulate a broken mirror.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// 200 OK with the body.
    Serve,
    /// Always answer with this status and an empty body.
    Fail(u16),
}

/// A running test mirror. The server thread lives until the process exits.
pub struct MirrorServer {
    pub base: String,
    hits: Arc<AtomicUsize>,
}

impl MirrorServer {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Start a mirror whose base URL is `http://127.0.0.1:<port>/repo`.
pub fn start(body: Vec<u8>, behavior: Behavior) -> MirrorServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_srv = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let hits = Arc::clone(&hits_srv);
            thread::spawn(move || handle(stream, &body, behavior, &hits));
        }
    });
    MirrorServer {
        base: format!("http://127.0.0.1:{}/repo", port),
        hits,
    }
}

/// A base URL on a port nothing listens on (connection refused).
pub fn dead_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/repo", port)
}

fn handle(mut stream: std::net::TcpStream, body: &[u8], behavior: Behavior, hits: &AtomicUsize) {
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
    hits.fetch_add(1, Ordering::SeqCst);
    let is_get = request
        .split_whitespace()
        .next()
        .map(|m| m.eq_ignore_ascii_case("GET"))
        .unwrap_or(false);
    match behavior {
        Behavior::Serve if is_get => {
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(body);
        }
        Behavior::Serve => {
            let _ = stream
                .write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        }
        Behavior::Fail(code) => {
            let head = format!(
                "HTTP/1.1 {} Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                code
            );
            let _ = stream.write_all(head.as_bytes());
        }
    }
}
