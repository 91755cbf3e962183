//! Per-chunk progress lines.
//!
//! One `ChunkEvent` is emitted per chunk as it finishes, in completion order.
//! Each carries the caller's log prefix and the range index so output from
//! several ranges (or several transfers) can interleave and stay readable.

use std::fmt;

use crate::downloader::{ChunkResult, ChunkStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    Succeeded { status_line: String },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkEvent {
    pub prefix: String,
    pub index: usize,
    pub bytes: u64,
    pub outcome: ChunkOutcome,
}

impl ChunkEvent {
    pub fn from_result(prefix: &str, result: &ChunkResult) -> Self {
        let outcome = match &result.status {
            ChunkStatus::Succeeded { status_line } => ChunkOutcome::Succeeded {
                status_line: status_line.clone(),
            },
            ChunkStatus::Failed(e) => ChunkOutcome::Failed {
                message: e.to_string(),
            },
        };
        Self {
            prefix: prefix.to_string(),
            index: result.index,
            bytes: result.bytes_written,
            outcome,
        }
    }
}

impl fmt::Display for ChunkEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            ChunkOutcome::Succeeded { status_line } => {
                write!(f, "{} [{}]: {}...", self.prefix, self.index, status_line)
            }
            ChunkOutcome::Failed { message } => {
                write!(f, "{} [{}]: failed: {}", self.prefix, self.index, message)
            }
        }
    }
}
