//! Per-chunk redirect protocol as an explicit state machine.
//!
//! `Requesting -> (Direct | RedirectedPendingRefetch) -> Complete`; any step may
//! end in `Err`, which is the `Failed` terminal state.
//!
//! The first ranged GET goes out with redirect-follow disabled. If the origin
//! answers with a redirect target, the identical ranged GET is re-issued against
//! that target with redirect-follow enabled, so the range is asserted against the
//! resolved location rather than trusted through an opaque follow.

use std::fs::File;
use std::io::{Seek, Write};
use std::sync::atomic::AtomicBool;

use crate::error::FetchError;
use crate::segmenter::ByteRange;

use super::transport::{RangeRequest, RangeResponse, RangeTransport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    /// Initial ranged GET, redirect-follow disabled.
    Requesting,
    /// The origin answered without redirecting; its body is the chunk.
    Direct(RangeResponse),
    /// The origin redirected to `target`; the ranged GET must be sent there.
    RedirectedPendingRefetch { target: String },
    /// Chunk body written.
    Complete(RangeResponse),
}

impl FetchState {
    /// Classifies the response to the initial, non-following request.
    pub fn on_initial_response(resp: RangeResponse) -> Result<FetchState, FetchError> {
        if resp.is_redirect() {
            return match resp.redirect_url {
                Some(target) => Ok(FetchState::RedirectedPendingRefetch { target }),
                None => Err(FetchError::UnresolvedRedirect(resp.code)),
            };
        }
        Ok(FetchState::Direct(resp))
    }

    /// Classifies a response whose body is used as the chunk (direct or refetched).
    pub fn on_body_response(resp: RangeResponse) -> Result<FetchState, FetchError> {
        if resp.is_success() {
            Ok(FetchState::Complete(resp))
        } else if resp.is_redirect() {
            Err(FetchError::UnresolvedRedirect(resp.code))
        } else {
            Err(FetchError::Http(resp.code))
        }
    }
}

/// Drives the state machine for one range, writing the body to `sink`.
/// On redirect the sink is truncated before the refetch so only the final body remains.
pub(crate) fn run<T: RangeTransport + ?Sized, S: Write + ResetSink>(
    transport: &T,
    url: &str,
    range: ByteRange,
    sink: &mut S,
    cancel: Option<&AtomicBool>,
) -> Result<RangeResponse, FetchError> {
    let mut state = FetchState::Requesting;
    loop {
        state = match state {
            FetchState::Requesting => {
                let request = RangeRequest {
                    url,
                    range,
                    follow_redirects: false,
                    cancel,
                };
                FetchState::on_initial_response(transport.get_range(&request, &mut *sink)?)?
            }
            FetchState::Direct(resp) => FetchState::on_body_response(resp)?,
            FetchState::RedirectedPendingRefetch { target } => {
                tracing::debug!(from = url, to = %target, %range, "range request redirected, refetching");
                sink.reset()?;
                let request = RangeRequest {
                    url: &target,
                    range,
                    follow_redirects: true,
                    cancel,
                };
                FetchState::on_body_response(transport.get_range(&request, &mut *sink)?)?
            }
            FetchState::Complete(resp) => return Ok(resp),
        };
    }
}

/// A sink that can be emptied before a refetch.
pub(crate) trait ResetSink {
    fn reset(&mut self) -> std::io::Result<()>;
}

impl ResetSink for File {
    fn reset(&mut self) -> std::io::Result<()> {
        self.set_len(0)?;
        self.rewind()
    }
}

impl ResetSink for std::io::Cursor<Vec<u8>> {
    fn reset(&mut self) -> std::io::Result<()> {
        self.get_mut().clear();
        self.rewind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::mock::MockOrigin;
    use std::io::Cursor;

    fn resp(code: u32, redirect: Option<&str>) -> RangeResponse {
        RangeResponse {
            code,
            status_line: code.to_string(),
            redirect_url: redirect.map(str::to_string),
            body_bytes: 0,
        }
    }

    #[test]
    fn initial_redirect_with_target_needs_refetch() {
        let s = FetchState::on_initial_response(resp(302, Some("http://cdn/f"))).unwrap();
        assert_eq!(
            s,
            FetchState::RedirectedPendingRefetch {
                target: "http://cdn/f".into()
            }
        );
    }

    #[test]
    fn initial_redirect_without_target_fails() {
        let err = FetchState::on_initial_response(resp(301, None)).unwrap_err();
        assert!(matches!(err, FetchError::UnresolvedRedirect(301)));
    }

    #[test]
    fn initial_direct_response() {
        let s = FetchState::on_initial_response(resp(206, None)).unwrap();
        assert!(matches!(s, FetchState::Direct(_)));
    }

    #[test]
    fn body_response_error_status() {
        assert!(matches!(
            FetchState::on_body_response(resp(404, None)),
            Err(FetchError::Http(404))
        ));
        assert!(matches!(
            FetchState::on_body_response(resp(200, None)),
            Ok(FetchState::Complete(_))
        ));
    }

    #[test]
    fn redirect_result_equals_direct_fetch_of_target() {
        let body: Vec<u8> = (0u8..=255).collect();
        let origin = MockOrigin::new(body.clone()).with_redirect("http://origin/f", "http://cdn/f");
        let range = ByteRange::new(10, 50);

        let mut via_redirect = Cursor::new(Vec::new());
        let r1 = run(&origin, "http://origin/f", range, &mut via_redirect, None).unwrap();

        let mut direct = Cursor::new(Vec::new());
        let r2 = run(&origin, "http://cdn/f", range, &mut direct, None).unwrap();

        assert_eq!(via_redirect.get_ref(), direct.get_ref());
        assert_eq!(via_redirect.get_ref().as_slice(), &body[10..50]);
        assert_eq!(r1.code, 206);
        assert_eq!(r1.body_bytes, 40);
        assert_eq!(r2.body_bytes, 40);

        let requests = origin.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].url, "http://origin/f");
        assert!(!requests[0].follow_redirects);
        assert_eq!(requests[1].url, "http://cdn/f");
        assert!(requests[1].follow_redirects);
        assert_eq!(requests[1].range, range);
        assert_eq!(requests[2].url, "http://cdn/f");
        assert!(!requests[2].follow_redirects);
    }

    #[test]
    fn direct_response_issues_single_request() {
        let origin = MockOrigin::new(b"0123456789".to_vec());
        let mut sink = Cursor::new(Vec::new());
        run(&origin, "http://cdn/f", ByteRange::new(3, 6), &mut sink, None).unwrap();
        assert_eq!(sink.get_ref().as_slice(), b"345");
        assert_eq!(origin.requests().len(), 1);
    }

    #[test]
    fn refetch_error_status_fails() {
        let origin = MockOrigin::new(b"0123456789".to_vec())
            .with_redirect("http://origin/f", "http://cdn/f")
            .failing("http://cdn/f", 503);
        let mut sink = Cursor::new(Vec::new());
        let err = run(&origin, "http://origin/f", ByteRange::new(0, 5), &mut sink, None).unwrap_err();
        assert!(matches!(err, FetchError::Http(503)));
    }
}
