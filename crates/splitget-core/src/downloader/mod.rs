//! Range fetcher: downloads one byte range of the source into its own chunk file.
//!
//! The network side lives behind `RangeTransport` (see `transport`); the
//! redirect protocol is the state machine in `state`.

mod state;
mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use state::FetchState;
pub use transport::{CurlTransport, RangeRequest, RangeResponse, RangeTransport};

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use crate::error::FetchError;
use crate::segmenter::ByteRange;

/// Terminal status of one chunk.
#[derive(Debug)]
pub enum ChunkStatus {
    /// Body written; `status_line` is the server's status for the final response.
    Succeeded { status_line: String },
    Failed(FetchError),
}

/// One fetcher's outcome, produced exactly once per planned range.
#[derive(Debug)]
pub struct ChunkResult {
    pub index: usize,
    pub range: ByteRange,
    /// Chunk file the body was written to.
    pub path: PathBuf,
    pub bytes_written: u64,
    pub status: ChunkStatus,
}

impl ChunkResult {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, ChunkStatus::Failed(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.status, ChunkStatus::Failed(FetchError::Cancelled))
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.status {
            ChunkStatus::Failed(e) => Some(e),
            ChunkStatus::Succeeded { .. } => None,
        }
    }
}

/// Downloads `range` of `url` into `chunk_path` (created or truncated).
///
/// An empty range performs no request and leaves an empty chunk file. A body
/// shorter than the range is accepted; verification downstream catches it.
/// Never retries.
pub fn fetch_range<T: RangeTransport + ?Sized>(
    transport: &T,
    url: &str,
    index: usize,
    range: ByteRange,
    chunk_path: &Path,
    cancel: Option<&AtomicBool>,
) -> ChunkResult {
    let (bytes_written, status) = match fetch_into(transport, url, range, chunk_path, cancel) {
        Ok((bytes, status_line)) => (bytes, ChunkStatus::Succeeded { status_line }),
        Err(e) => (0, ChunkStatus::Failed(e)),
    };
    ChunkResult {
        index,
        range,
        path: chunk_path.to_path_buf(),
        bytes_written,
        status,
    }
}

fn fetch_into<T: RangeTransport + ?Sized>(
    transport: &T,
    url: &str,
    range: ByteRange,
    chunk_path: &Path,
    cancel: Option<&AtomicBool>,
) -> Result<(u64, String), FetchError> {
    let mut file = File::create(chunk_path)?;
    if range.is_empty() {
        return Ok((0, "empty range, nothing to fetch".to_string()));
    }

    let resp = state::run(transport, url, range, &mut file, cancel)?;
    file.flush()?;

    if resp.body_bytes != range.len() {
        tracing::warn!(
            %range,
            expected = range.len(),
            received = resp.body_bytes,
            "chunk length differs from requested range"
        );
    }
    Ok((resp.body_bytes, resp.status_line))
}
