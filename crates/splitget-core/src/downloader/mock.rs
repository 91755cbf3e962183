//! In-memory origin used by fetcher and coordinator tests.

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::Ordering;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::FetchError;
use crate::segmenter::ByteRange;

use super::transport::{RangeRequest, RangeResponse, RangeTransport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedRequest {
    pub url: String,
    pub range: ByteRange,
    pub follow_redirects: bool,
}

/// Serves slices of `body` for any URL, with optional redirects and failures.
pub(crate) struct MockOrigin {
    body: Vec<u8>,
    redirects: HashMap<String, String>,
    failing_urls: HashMap<String, u32>,
    failing_starts: HashMap<u64, u32>,
    stalling_starts: Vec<u64>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockOrigin {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            redirects: HashMap::new(),
            failing_urls: HashMap::new(),
            failing_starts: HashMap::new(),
            stalling_starts: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Non-following requests to `from` get a 302 pointing at `to`.
    pub fn with_redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    /// Every request to `url` answers with `code` and no body.
    pub fn failing(mut self, url: &str, code: u32) -> Self {
        self.failing_urls.insert(url.to_string(), code);
        self
    }

    /// Requests whose range starts at `start` answer with `code`.
    pub fn failing_at(mut self, start: u64, code: u32) -> Self {
        self.failing_starts.insert(start, code);
        self
    }

    /// Requests whose range starts at `start` block until cancelled (or 5s pass).
    pub fn stalling_at(mut self, start: u64) -> Self {
        self.stalling_starts.push(start);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn status(code: u32, bytes: u64) -> RangeResponse {
        let text = match code {
            200 => "200 OK".to_string(),
            206 => "206 Partial Content".to_string(),
            302 => "302 Found".to_string(),
            c => c.to_string(),
        };
        RangeResponse {
            code,
            status_line: text,
            redirect_url: None,
            body_bytes: bytes,
        }
    }
}

impl RangeTransport for MockOrigin {
    fn get_range(
        &self,
        request: &RangeRequest<'_>,
        sink: &mut dyn Write,
    ) -> Result<RangeResponse, FetchError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: request.url.to_string(),
            range: request.range,
            follow_redirects: request.follow_redirects,
        });

        if self.stalling_starts.contains(&request.range.start) {
            let deadline = Instant::now() + Duration::from_secs(5);
            while Instant::now() < deadline {
                if request.cancel.map_or(false, |c| c.load(Ordering::Relaxed)) {
                    return Err(FetchError::Cancelled);
                }
                std::thread::sleep(Duration::from_millis(5));
            }
        }
        if let Some(&code) = self.failing_urls.get(request.url) {
            return Ok(Self::status(code, 0));
        }
        if let Some(&code) = self.failing_starts.get(&request.range.start) {
            return Ok(Self::status(code, 0));
        }
        if !request.follow_redirects {
            if let Some(target) = self.redirects.get(request.url) {
                let moved = b"moved";
                sink.write_all(moved)?;
                let mut resp = Self::status(302, moved.len() as u64);
                resp.redirect_url = Some(target.clone());
                return Ok(resp);
            }
        }

        let len = self.body.len() as u64;
        let start = request.range.start.min(len) as usize;
        let end = request.range.end.min(len) as usize;
        let slice = &self.body[start..end];
        sink.write_all(slice)?;
        Ok(Self::status(206, slice.len() as u64))
    }
}
