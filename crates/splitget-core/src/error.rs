//! Error taxonomy for the transfer pipeline.
//!
//! Each stage has its own error type so callers can tell a failed probe from a
//! failed chunk or a failed verification. `TransferError` unifies them for the
//! orchestrator.

use std::fmt;
use std::io;

use thiserror::Error;

/// The metadata probe (HEAD) failed; the transfer never starts.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("HEAD {url} failed: {source}")]
    Curl {
        url: String,
        #[source]
        source: curl::Error,
    },
    #[error("HEAD {url} returned HTTP {code}")]
    Http { url: String, code: u32 },
    #[error("HEAD {url}: missing or unparseable Content-Length")]
    MissingContentLength { url: String },
}

/// Error returned by a single chunk fetch (curl failure, HTTP status, local storage, cancellation).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (DNS, connection refused, malformed response, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Final response had an error status.
    #[error("HTTP {0}")]
    Http(u32),
    /// A 3xx response without a target the client could re-request.
    #[error("HTTP {0} redirect without a usable Location")]
    UnresolvedRedirect(u32),
    /// Writing the chunk file failed (disk full, permission denied).
    #[error("storage: {0}")]
    Storage(#[from] io::Error),
    /// Aborted because a sibling chunk failed first (fail-fast mode only).
    #[error("cancelled after a sibling chunk failed")]
    Cancelled,
}

/// Which digest a verification failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestKind {
    Md5,
    Sha1,
    Sha256,
}

impl fmt::Display for DigestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestKind::Md5 => write!(f, "MD5"),
            DigestKind::Sha1 => write!(f, "SHA-1"),
            DigestKind::Sha256 => write!(f, "SHA-256"),
        }
    }
}

/// The reassembled file does not match what the server reported. The file is left in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("size mismatch: expected {expected} bytes, found {actual}")]
    Size { expected: u64, actual: u64 },
    #[error("{kind} mismatch: expected {expected}, computed {actual}")]
    Digest {
        kind: DigestKind,
        expected: String,
        actual: String,
    },
}

/// Outcome of a whole transfer that did not succeed.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error("chunk {index}: {source}")]
    Transport {
        index: usize,
        #[source]
        source: FetchError,
    },
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("verification failed for {path}: {source}")]
    Verification {
        path: String,
        #[source]
        source: VerificationError,
    },
}

impl TransferError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        TransferError::Io {
            context: context.into(),
            source,
        }
    }

    /// Maps a failed chunk to the transfer-level error. Local write failures are I/O errors,
    /// everything else is a transport failure of that chunk.
    pub(crate) fn from_chunk(index: usize, err: FetchError) -> Self {
        match err {
            FetchError::Storage(source) => TransferError::Io {
                context: format!("write chunk {}", index),
                source,
            },
            source => TransferError::Transport { index, source },
        }
    }

    /// True when the file was written but did not match the probed size or checksums.
    pub fn is_verification(&self) -> bool {
        matches!(self, TransferError::Verification { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_failure_maps_to_io() {
        let err = TransferError::from_chunk(
            2,
            FetchError::Storage(io::Error::new(io::ErrorKind::Other, "disk full")),
        );
        assert!(matches!(err, TransferError::Io { .. }));
        assert_eq!(err.to_string(), "write chunk 2: disk full");
    }

    #[test]
    fn http_failure_maps_to_transport() {
        let err = TransferError::from_chunk(1, FetchError::Http(503));
        assert!(matches!(err, TransferError::Transport { index: 1, .. }));
        assert_eq!(err.to_string(), "chunk 1: HTTP 503");
        assert!(!err.is_verification());
    }

    #[test]
    fn digest_mismatch_message() {
        let e = VerificationError::Digest {
            kind: DigestKind::Sha1,
            expected: "aa".into(),
            actual: "bb".into(),
        };
        assert_eq!(e.to_string(), "SHA-1 mismatch: expected aa, computed bb");
    }
}
