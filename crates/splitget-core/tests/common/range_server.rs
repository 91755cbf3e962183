//! Minimal HTTP/1.1 origin for integration tests.
//!
//! Serves one static body at any path. HEAD answers with Content-Length,
//! optional `X-Checksum-*` headers and `Accept-Ranges: bytes`; GET with a
//! Range header answers 206 with the slice. Requests under `/moved/` get a
//! 302 pointing at the same path without that prefix.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const REDIRECT_PREFIX: &str = "/moved";

#[derive(Debug, Clone, Default)]
pub struct RangeServerOptions {
    /// HEAD answers 405 when set.
    pub block_head: bool,
    /// GET ignores Range and always returns 200 with the full body; `Accept-Ranges` is omitted.
    pub no_ranges: bool,
    pub md5: Option<String>,
    pub sha1: Option<String>,
    pub sha256: Option<String>,
    /// GET requests whose range starts here answer with this status and no body.
    pub fail_range_start: Option<(u64, u16)>,
}

/// Serves `body` with default options; returns the base URL without trailing slash.
pub fn start(body: Vec<u8>) -> String {
    start_with_options(body, RangeServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> String {
    serve(body, opts, None)
}

/// Raw request heads (request line plus headers), in arrival order.
pub type RequestLog = Arc<Mutex<Vec<String>>>;

/// Like `start_with_options`, also recording every request head.
pub fn start_recording(body: Vec<u8>, opts: RangeServerOptions) -> (String, RequestLog) {
    let log = RequestLog::default();
    let base = serve(body, opts, Some(Arc::clone(&log)));
    (base, log)
}

fn serve(body: Vec<u8>, opts: RangeServerOptions, log: Option<RequestLog>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let opts = Arc::new(opts);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let opts = Arc::clone(&opts);
            let log = log.clone();
            thread::spawn(move || handle(stream, &body, &opts, log.as_ref()));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

struct Request<'a> {
    method: &'a str,
    path: &'a str,
    range: Option<(u64, u64)>,
}

fn handle(mut stream: TcpStream, body: &[u8], opts: &RangeServerOptions, log: Option<&RequestLog>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let Ok(text) = std::str::from_utf8(&buf[..n]) else {
        return;
    };
    if let Some(log) = log {
        let head = text.split("\r\n\r\n").next().unwrap_or(text);
        log.lock().unwrap().push(head.to_string());
    }
    let req = parse_request(text);
    let total = body.len() as u64;

    if let Some(rest) = req.path.strip_prefix(REDIRECT_PREFIX) {
        let moved = b"moved";
        let head = format!(
            "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            rest,
            moved.len()
        );
        let _ = stream.write_all(head.as_bytes());
        if !req.method.eq_ignore_ascii_case("HEAD") {
            let _ = stream.write_all(moved);
        }
        return;
    }

    let mut extra = String::new();
    if !opts.no_ranges {
        extra.push_str("Accept-Ranges: bytes\r\n");
    }

    if req.method.eq_ignore_ascii_case("HEAD") {
        if opts.block_head {
            let _ = stream.write_all(
                b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
            return;
        }
        for (name, value) in [
            ("X-Checksum-Md5", &opts.md5),
            ("X-Checksum-Sha1", &opts.sha1),
            ("X-Checksum-Sha256", &opts.sha256),
        ] {
            if let Some(v) = value {
                extra.push_str(&format!("{}: {}\r\n", name, v));
            }
        }
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
            total, extra
        );
        let _ = stream.write_all(head.as_bytes());
        return;
    }

    if !req.method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(
            b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return;
    }

    if let (Some((start, _)), Some((fail_start, code))) = (req.range, opts.fail_range_start) {
        if start == fail_start {
            let head = format!(
                "HTTP/1.1 {} Injected\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                code
            );
            let _ = stream.write_all(head.as_bytes());
            return;
        }
    }

    let (status, slice) = match req.range.filter(|_| !opts.no_ranges) {
        Some((start, end_incl)) => {
            let start = start.min(total) as usize;
            let end_excl = end_incl.saturating_add(1).min(total) as usize;
            let slice = body.get(start..end_excl).unwrap_or(&body[0..0]);
            extra.push_str(&format!(
                "Content-Range: bytes {}-{}/{}\r\n",
                start,
                end_excl.saturating_sub(1),
                total
            ));
            ("206 Partial Content", slice)
        }
        None => ("200 OK", body),
    };
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
        status,
        slice.len(),
        extra
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(slice);
}

fn parse_request(text: &str) -> Request<'_> {
    let mut lines = text.lines();
    let mut first = lines.next().unwrap_or("").split_whitespace();
    let method = first.next().unwrap_or("");
    let path = first.next().unwrap_or("/");
    let mut range = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if !name.trim().eq_ignore_ascii_case("range") {
            continue;
        }
        if let Some(spec) = value.trim().strip_prefix("bytes=") {
            if let Some((a, b)) = spec.split_once('-') {
                let start = a.trim().parse::<u64>().unwrap_or(0);
                let end = b.trim().parse::<u64>().unwrap_or(u64::MAX);
                range = Some((start, end));
            }
        }
    }
    Request {
        method,
        path,
        range,
    }
}
