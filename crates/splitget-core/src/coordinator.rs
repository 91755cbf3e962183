//! Concurrent fan-out / fan-in of range fetches.
//!
//! One scoped OS thread per planned range, each doing its own blocking network
//! and file I/O into its own chunk file. Results are collected into a slot per
//! range index, so reassembly order never depends on completion order. The
//! only synchronization point is the join barrier at the end of the scope.
//!
//! Error policy: every worker is joined, then the failure of the lowest-indexed
//! chunk is returned and any others are logged. With `fail_fast`, the first
//! failure raises a shared cancel flag so in-flight siblings stop early; those
//! report `Cancelled` and are never chosen over a real failure. If the OS
//! refuses a worker thread, the workers already running are cancelled and the
//! transfer fails with an I/O error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

use crate::downloader::{fetch_range, ChunkResult, ChunkStatus, RangeTransport};
use crate::error::{FetchError, TransferError};
use crate::progress::ChunkEvent;
use crate::scratch::TransferArea;
use crate::segmenter::ByteRange;

/// Knobs for one coordinated download.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorOptions {
    /// Prefix for every progress line of this transfer.
    pub log_prefix: String,
    /// Cancel siblings on the first chunk failure.
    pub fail_fast: bool,
    /// Stack size for chunk worker threads; platform default when `None`.
    pub worker_stack_size: Option<usize>,
}

/// Downloads every range of `url` into `area` as `<file_name>_<index>`.
///
/// Blocks until all workers have reported. On success returns the chunk results in
/// range order. If `events` is `Some`, one `ChunkEvent` is sent per chunk as it completes.
pub fn download_chunks<T: RangeTransport + ?Sized>(
    transport: &T,
    url: &str,
    file_name: &str,
    ranges: &[ByteRange],
    area: &TransferArea,
    options: &CoordinatorOptions,
    events: Option<&mpsc::Sender<ChunkEvent>>,
) -> Result<Vec<ChunkResult>, TransferError> {
    let cancel = AtomicBool::new(false);
    let mut slots: Vec<Option<ChunkResult>> = (0..ranges.len()).map(|_| None).collect();

    tracing::info!(
        url,
        chunks = ranges.len(),
        "{} starting {} range request(s)",
        options.log_prefix,
        ranges.len()
    );

    let mut spawn_error = None;
    thread::scope(|s| {
        let (tx, rx) = mpsc::channel::<ChunkResult>();
        for (index, range) in ranges.iter().copied().enumerate() {
            let tx = tx.clone();
            let path = area.chunk_path(file_name, index);
            let cancel = &cancel;
            let mut builder = thread::Builder::new().name(format!("chunk-{}", index));
            if let Some(size) = options.worker_stack_size {
                builder = builder.stack_size(size);
            }
            let spawned = builder.spawn_scoped(s, move || {
                let result = fetch_range(transport, url, index, range, &path, Some(cancel));
                let _ = tx.send(result);
            });
            if let Err(e) = spawned {
                // Workers already running wind down; nothing gets reassembled.
                cancel.store(true, Ordering::Relaxed);
                spawn_error = Some((index, e));
                break;
            }
        }
        drop(tx);

        for result in rx {
            let event = ChunkEvent::from_result(&options.log_prefix, &result);
            match &result.status {
                ChunkStatus::Succeeded { .. } => {
                    tracing::info!(index = result.index, bytes = result.bytes_written, "{}", event)
                }
                ChunkStatus::Failed(_) => {
                    tracing::warn!(index = result.index, "{}", event);
                    if options.fail_fast {
                        cancel.store(true, Ordering::Relaxed);
                    }
                }
            }
            if let Some(events) = events {
                let _ = events.send(event);
            }
            let index = result.index;
            slots[index] = Some(result);
        }
    });

    if let Some((index, e)) = spawn_error {
        tracing::warn!(
            index,
            "{} could not start worker for chunk {}: {}",
            options.log_prefix,
            index,
            e
        );
        return Err(TransferError::io("spawn chunk worker", e));
    }

    let results: Vec<ChunkResult> = slots.into_iter().flatten().collect();
    debug_assert_eq!(results.len(), ranges.len());
    first_failure(results)
}

/// Lowest-indexed real failure wins; a cancellation is only reported if nothing else failed.
fn first_failure(results: Vec<ChunkResult>) -> Result<Vec<ChunkResult>, TransferError> {
    let failed = results.iter().filter(|r| r.is_failed()).count();
    if failed == 0 {
        return Ok(results);
    }
    if failed > 1 {
        tracing::warn!(failed, "{} chunks failed; reporting the lowest index", failed);
    }

    let mut first_cancelled = None;
    for result in results {
        if let ChunkStatus::Failed(e) = result.status {
            if matches!(e, FetchError::Cancelled) {
                first_cancelled.get_or_insert(result.index);
                continue;
            }
            return Err(TransferError::from_chunk(result.index, e));
        }
    }
    Err(TransferError::Transport {
        index: first_cancelled.unwrap_or_default(),
        source: FetchError::Cancelled,
    })
}
