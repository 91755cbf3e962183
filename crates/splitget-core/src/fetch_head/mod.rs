//! HTTP HEAD / metadata probing.
//!
//! Uses the curl crate (libcurl) to learn the remote size, the checksums the
//! server advertises (`X-Checksum-*`), and whether byte ranges are supported.

mod parse;

use std::str;

use crate::client::ClientOptions;
use crate::error::ProbeError;

pub(crate) use parse::parse_headers;

/// What the origin told us about the file before any byte was downloaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteFileInfo {
    /// Total size in bytes, from `Content-Length`.
    pub size: u64,
    /// `X-Checksum-Md5`, if sent.
    pub md5: Option<String>,
    /// `X-Checksum-Sha1`, if sent.
    pub sha1: Option<String>,
    /// `X-Checksum-Sha256`, if sent.
    pub sha256: Option<String>,
    /// True if server sent `Accept-Ranges: bytes`.
    pub accept_ranges: bool,
}

impl RemoteFileInfo {
    /// True if the server supplied at least one digest to verify against.
    pub fn has_checksums(&self) -> bool {
        self.md5.is_some() || self.sha1.is_some() || self.sha256.is_some()
    }
}

/// Performs a HEAD request and returns the remote file metadata.
///
/// Follows redirects; only the headers of the final response are used.
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
pub fn probe(url: &str, client: &ClientOptions) -> Result<RemoteFileInfo, ProbeError> {
    let curl_err = |source| ProbeError::Curl {
        url: url.to_string(),
        source,
    };
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(curl_err)?;
    easy.nobody(true).map_err(curl_err)?; // HEAD request
    easy.follow_location(true).map_err(curl_err)?;
    client.apply(&mut easy).map_err(curl_err)?;

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    let line = s.trim_end();
                    // A new status line starts the next response in a redirect chain.
                    if line.starts_with("HTTP/") {
                        headers.clear();
                    }
                    headers.push(line.to_string());
                }
                true
            })
            .map_err(curl_err)?;
        transfer.perform().map_err(curl_err)?;
    }

    let code = easy.response_code().map_err(curl_err)?;
    if !(200..300).contains(&code) {
        return Err(ProbeError::Http {
            url: url.to_string(),
            code,
        });
    }

    let parsed = parse_headers(&headers);
    let size = parsed
        .content_length
        .ok_or_else(|| ProbeError::MissingContentLength {
            url: url.to_string(),
        })?;
    let info = RemoteFileInfo {
        size,
        md5: parsed.md5,
        sha1: parsed.sha1,
        sha256: parsed.sha256,
        accept_ranges: parsed.accept_ranges,
    };
    tracing::debug!(
        url,
        size = info.size,
        accept_ranges = info.accept_ranges,
        md5 = info.md5.as_deref().unwrap_or("-"),
        sha1 = info.sha1.as_deref().unwrap_or("-"),
        "probe complete"
    );
    Ok(info)
}
