//! One download, end to end: probe, plan, fetch in parallel, reassemble, verify.

use std::path::PathBuf;
use std::sync::mpsc;

use crate::checksum;
use crate::client::{ClientOptions, Credentials};
use crate::config::SplitgetConfig;
use crate::coordinator::{download_chunks, CoordinatorOptions};
use crate::downloader::{CurlTransport, RangeTransport};
use crate::error::TransferError;
use crate::fetch_head::{self, RemoteFileInfo};
use crate::progress::ChunkEvent;
use crate::scratch::ScratchDir;
use crate::segmenter::{plan_ranges, ByteRange};
use crate::storage::{assemble_chunks, DEFAULT_COPY_BUFFER};
use crate::url_model;

/// Immutable description of one download request.
#[derive(Debug, Clone)]
pub struct TransferSpec {
    pub url: String,
    /// Final file name; also the stem of every chunk file.
    pub file_name: String,
    /// Directory the file is saved into unless `flat` is set.
    pub local_dir: Option<PathBuf>,
    pub split_count: usize,
    /// Ignore `local_dir` and save into the working directory.
    pub flat: bool,
    pub credentials: Option<Credentials>,
}

impl TransferSpec {
    /// Spec for `url` with the file name taken from the URL path and a single range.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let file_name = url_model::derive_filename(&url);
        Self {
            url,
            file_name,
            local_dir: None,
            split_count: 1,
            flat: false,
            credentials: None,
        }
    }

    /// Where the reassembled file is written.
    pub fn destination(&self) -> PathBuf {
        match &self.local_dir {
            Some(dir) if !self.flat => dir.join(&self.file_name),
            _ => PathBuf::from(&self.file_name),
        }
    }
}

/// What a finished transfer produced.
#[derive(Debug, Clone)]
pub struct TransferReport {
    pub destination: PathBuf,
    pub remote: RemoteFileInfo,
    pub ranges: Vec<ByteRange>,
    pub bytes_written: u64,
}

/// Number of ranges to actually use.
///
/// Falls back to one range when the caller asked for at most one, the server
/// did not advertise byte ranges, or the file is below `min_split_bytes`.
pub fn effective_split_count(requested: usize, remote: &RemoteFileInfo, min_split_bytes: u64) -> usize {
    if requested <= 1 || !remote.accept_ranges || remote.size < min_split_bytes {
        1
    } else {
        requested
    }
}

/// Probes `spec.url` and downloads it with libcurl.
///
/// Blocking; run from `spawn_blocking` when called from async code. `scratch`
/// must outlive the call; each transfer carves its own area out of it.
pub fn download_file(
    spec: &TransferSpec,
    cfg: &SplitgetConfig,
    scratch: &ScratchDir,
    log_prefix: &str,
    events: Option<&mpsc::Sender<ChunkEvent>>,
) -> Result<TransferReport, TransferError> {
    let client = ClientOptions::from_config(cfg, spec.credentials.clone());
    let remote = fetch_head::probe(&spec.url, &client)?;
    tracing::info!(
        url = %spec.url,
        size = remote.size,
        accept_ranges = remote.accept_ranges,
        checksums = remote.has_checksums(),
        "{} probed",
        log_prefix
    );
    let transport = CurlTransport::new(client);
    download_with(&transport, spec, remote, cfg, scratch, log_prefix, events)
}

/// Runs the pipeline after the probe, against any transport.
pub fn download_with<T: RangeTransport + ?Sized>(
    transport: &T,
    spec: &TransferSpec,
    remote: RemoteFileInfo,
    cfg: &SplitgetConfig,
    scratch: &ScratchDir,
    log_prefix: &str,
    events: Option<&mpsc::Sender<ChunkEvent>>,
) -> Result<TransferReport, TransferError> {
    let split = effective_split_count(spec.split_count, &remote, cfg.min_split_bytes);
    if split != spec.split_count.max(1) {
        tracing::debug!(
            requested = spec.split_count,
            size = remote.size,
            accept_ranges = remote.accept_ranges,
            "{} fetching as a single range",
            log_prefix
        );
    }
    let ranges = plan_ranges(remote.size, split);
    tracing::debug!(?ranges, "{} planned {} range(s)", log_prefix, ranges.len());

    let destination = spec.destination();
    let area = scratch
        .transfer_area()
        .map_err(|e| TransferError::io("create transfer area", e))?;

    let options = CoordinatorOptions {
        log_prefix: log_prefix.to_string(),
        fail_fast: cfg.fail_fast,
        worker_stack_size: None,
    };
    let results = download_chunks(
        transport,
        &spec.url,
        &spec.file_name,
        &ranges,
        &area,
        &options,
        events,
    )?;

    let chunk_paths: Vec<PathBuf> = results.into_iter().map(|r| r.path).collect();
    let buffer = if cfg.copy_buffer_bytes == 0 {
        DEFAULT_COPY_BUFFER
    } else {
        cfg.copy_buffer_bytes
    };
    let bytes_written = assemble_chunks(&chunk_paths, &destination, buffer)?;
    drop(area);
    tracing::info!(
        path = %destination.display(),
        bytes = bytes_written,
        "{} Done downloading.",
        log_prefix
    );

    checksum::verify_file(&destination, &remote)?;

    Ok(TransferReport {
        destination,
        remote,
        ranges,
        bytes_written,
    })
}
