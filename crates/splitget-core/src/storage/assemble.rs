//! Ordered concatenation of chunk files into the destination.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::TransferError;

/// Copy buffer used when the caller passes 0.
pub const DEFAULT_COPY_BUFFER: usize = 1_024_000;

/// Writes chunk 0, 1, ... N-1 back to back into `destination` and returns the bytes written.
///
/// Creates the parent directory if needed and deletes any existing file at
/// `destination` first, so a second run replaces rather than appends. Each chunk
/// is streamed through a buffer of `buffer_size` bytes; no chunk is loaded whole.
pub fn assemble_chunks(
    chunk_paths: &[PathBuf],
    destination: &Path,
    buffer_size: usize,
) -> Result<u64, TransferError> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            TransferError::io(format!("create directory {}", parent.display()), e)
        })?;
    }
    if destination.exists() {
        fs::remove_file(destination).map_err(|e| {
            TransferError::io(format!("remove existing {}", destination.display()), e)
        })?;
    }

    let out = File::create(destination)
        .map_err(|e| TransferError::io(format!("create {}", destination.display()), e))?;
    let buffer_size = if buffer_size == 0 {
        DEFAULT_COPY_BUFFER
    } else {
        buffer_size
    };
    let mut writer = BufWriter::with_capacity(buffer_size, out);
    let mut buf = vec![0u8; buffer_size];

    let mut total = 0u64;
    for path in chunk_paths {
        total += append_chunk(path, &mut writer, &mut buf)?;
    }
    writer
        .flush()
        .map_err(|e| TransferError::io(format!("flush {}", destination.display()), e))?;

    tracing::debug!(
        chunks = chunk_paths.len(),
        bytes = total,
        "reassembled {}",
        destination.display()
    );
    Ok(total)
}

fn append_chunk<W: Write>(path: &Path, writer: &mut W, buf: &mut [u8]) -> Result<u64, TransferError> {
    let mut src =
        File::open(path).map_err(|e| TransferError::io(format!("open {}", path.display()), e))?;
    let mut copied = 0u64;
    loop {
        let n = src
            .read(buf)
            .map_err(|e| TransferError::io(format!("read {}", path.display()), e))?;
        if n == 0 {
            break;
        }
        writer
            .write_all(&buf[..n])
            .map_err(|e| TransferError::io("write destination", e))?;
        copied += n as u64;
    }
    Ok(copied)
}
