//! The network seam of the range fetcher.
//!
//! `RangeTransport` performs one ranged GET and streams the body into a sink.
//! `CurlTransport` is the libcurl implementation; tests substitute a mock.

use std::io::{self, Write};
use std::str;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::client::ClientOptions;
use crate::error::FetchError;
use crate::segmenter::ByteRange;

/// One ranged GET.
#[derive(Debug, Clone, Copy)]
pub struct RangeRequest<'a> {
    pub url: &'a str,
    pub range: ByteRange,
    pub follow_redirects: bool,
    /// When set and raised, the transfer stops at its next body write.
    pub cancel: Option<&'a AtomicBool>,
}

/// What came back for a `RangeRequest`. The body has already been written to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeResponse {
    pub code: u32,
    /// Status text as sent by the server, e.g. `206 Partial Content`.
    pub status_line: String,
    /// Target the client did not follow (only set when redirects are disabled).
    pub redirect_url: Option<String>,
    pub body_bytes: u64,
}

impl RangeResponse {
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.code)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

/// Performs ranged GETs. Shared by every worker thread of a transfer.
pub trait RangeTransport: Sync {
    fn get_range(
        &self,
        request: &RangeRequest<'_>,
        sink: &mut dyn Write,
    ) -> Result<RangeResponse, FetchError>;
}

/// libcurl-backed transport. A new easy handle is created for each request.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    client: ClientOptions,
}

impl CurlTransport {
    pub fn new(client: ClientOptions) -> Self {
        Self { client }
    }
}

/// `HTTP/1.1 206 Partial Content` -> `206 Partial Content`.
fn status_text(line: &str) -> Option<String> {
    let rest = line.strip_prefix("HTTP/")?;
    let (_, status) = rest.split_once(' ')?;
    Some(status.trim().to_string())
}

impl RangeTransport for CurlTransport {
    fn get_range(
        &self,
        request: &RangeRequest<'_>,
        sink: &mut dyn Write,
    ) -> Result<RangeResponse, FetchError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(request.url)?;
        easy.get(true)?;
        easy.follow_location(request.follow_redirects)?;
        if let Some(spec) = request.range.curl_range() {
            easy.range(&spec)?;
        }
        self.client.apply(&mut easy)?;
        if request.cancel.is_some() {
            // Lets a cancel reach transfers that have not received any body yet.
            easy.progress(true)?;
        }

        let cancel_raised = || request.cancel.map_or(false, |c| c.load(Ordering::Relaxed));
        let mut status_line = String::new();
        let mut body_bytes = 0u64;
        let mut write_error: Option<io::Error> = None;

        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Some(status) = str::from_utf8(data).ok().and_then(status_text) {
                    status_line = status;
                }
                true
            })?;
            transfer.progress_function(|_, _, _, _| !cancel_raised())?;
            transfer.write_function(|data| {
                if cancel_raised() {
                    return Ok(0); // abort transfer
                }
                match sink.write_all(data) {
                    Ok(()) => {
                        body_bytes += data.len() as u64;
                        Ok(data.len())
                    }
                    Err(e) => {
                        write_error = Some(e);
                        Ok(0)
                    }
                }
            })?;
            transfer.perform()
        };

        if let Err(e) = performed {
            if let Some(io_err) = write_error {
                return Err(FetchError::Storage(io_err));
            }
            if (e.is_write_error() || e.is_aborted_by_callback()) && cancel_raised() {
                return Err(FetchError::Cancelled);
            }
            return Err(FetchError::Curl(e));
        }

        let code = easy.response_code()?;
        let redirect_url = if request.follow_redirects {
            None
        } else {
            easy.redirect_url()?.map(str::to_string)
        };
        if status_line.is_empty() {
            status_line = code.to_string();
        }

        Ok(RangeResponse {
            code,
            status_line,
            redirect_url,
            body_bytes,
        })
    }
}
