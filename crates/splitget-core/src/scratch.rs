//! Process-scoped scratch directory for chunk files.
//!
//! `ScratchDir` is a cheap-to-clone handle over one temporary directory. The
//! directory is created on `acquire` and removed when the last clone, and the
//! last `TransferArea` carved out of it, is dropped. Concurrent transfers each
//! hold their own area, so none of them owns the directory exclusively.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const DIR_PREFIX: &str = "splitget.";

struct Inner {
    dir: tempfile::TempDir,
    next_area: AtomicU64,
}

/// Shared handle to the scratch directory.
#[derive(Clone)]
pub struct ScratchDir {
    inner: Arc<Inner>,
}

impl ScratchDir {
    /// Create `<system tmp>/splitget.XXXXXX`.
    pub fn acquire() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(DIR_PREFIX).tempdir()?;
        Ok(Self::from_temp_dir(dir))
    }

    /// Create the scratch directory under `parent` instead of the system temp dir.
    pub fn acquire_in(parent: &Path) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(DIR_PREFIX)
            .tempdir_in(parent)?;
        Ok(Self::from_temp_dir(dir))
    }

    fn from_temp_dir(dir: tempfile::TempDir) -> Self {
        tracing::debug!(path = %dir.path().display(), "scratch directory acquired");
        Self {
            inner: Arc::new(Inner {
                dir,
                next_area: AtomicU64::new(0),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        self.inner.dir.path()
    }

    /// Number of live handles (clones plus open transfer areas).
    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Create a fresh sub-directory for one transfer's chunk files.
    pub fn transfer_area(&self) -> io::Result<TransferArea> {
        let n = self.inner.next_area.fetch_add(1, Ordering::Relaxed);
        let path = self.path().join(format!("transfer-{}", n));
        fs::create_dir_all(&path)?;
        Ok(TransferArea {
            path,
            _scratch: self.clone(),
        })
    }
}

impl fmt::Debug for ScratchDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScratchDir")
            .field("path", &self.path())
            .field("holders", &self.holders())
            .finish()
    }
}

/// One transfer's chunk directory. Keeps the scratch directory alive while it exists
/// and removes its own files when dropped.
#[derive(Debug)]
pub struct TransferArea {
    path: PathBuf,
    _scratch: ScratchDir,
}

impl TransferArea {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Chunk file for range `index`: `<file_name>_<index>`.
    pub fn chunk_path(&self, file_name: &str, index: usize) -> PathBuf {
        self.path.join(format!("{}_{}", file_name, index))
    }
}

impl Drop for TransferArea {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!("could not remove {}: {}", self.path.display(), e);
            }
        }
    }
}
