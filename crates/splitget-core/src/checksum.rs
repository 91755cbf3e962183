//! Local file digests and post-download integrity verification.
//!
//! Digests are computed on demand after reassembly, never inline with the
//! download path. Files are streamed through a fixed buffer so memory use stays
//! bounded regardless of file size.

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::{DigestKind, TransferError, VerificationError};
use crate::fetch_head::RemoteFileInfo;

const BUF_SIZE: usize = 64 * 1024;

/// Which digests to compute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigestSelection {
    pub md5: bool,
    pub sha1: bool,
    pub sha256: bool,
}

impl DigestSelection {
    pub const ALL: DigestSelection = DigestSelection {
        md5: true,
        sha1: true,
        sha256: true,
    };

    /// Only the digests the server actually supplied.
    pub fn for_remote(info: &RemoteFileInfo) -> Self {
        Self {
            md5: info.md5.is_some(),
            sha1: info.sha1.is_some(),
            sha256: info.sha256.is_some(),
        }
    }

    fn any(&self) -> bool {
        self.md5 || self.sha1 || self.sha256
    }
}

/// Size and lowercase-hex digests of a local file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDetails {
    pub size: u64,
    pub md5: Option<String>,
    pub sha1: Option<String>,
    pub sha256: Option<String>,
}

impl FileDetails {
    /// Size plus MD5, SHA-1 and SHA-256.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        Self::compute(path, DigestSelection::ALL)
    }

    /// Size plus the selected digests, in a single pass over the file.
    pub fn compute(path: &Path, select: DigestSelection) -> io::Result<Self> {
        let mut f = File::open(path)?;
        if !select.any() {
            let size = f.metadata()?.len();
            return Ok(Self {
                size,
                ..Self::default()
            });
        }

        let mut md5 = select.md5.then(Md5::new);
        let mut sha1 = select.sha1.then(Sha1::new);
        let mut sha256 = select.sha256.then(Sha256::new);
        let mut size = 0u64;
        let mut buf = vec![0u8; BUF_SIZE];
        loop {
            let n = f.read(&mut buf)?;
            if n == 0 {
                break;
            }
            let data = &buf[..n];
            if let Some(h) = md5.as_mut() {
                h.update(data);
            }
            if let Some(h) = sha1.as_mut() {
                h.update(data);
            }
            if let Some(h) = sha256.as_mut() {
                h.update(data);
            }
            size += n as u64;
        }

        Ok(Self {
            size,
            md5: md5.map(|h| hex::encode(h.finalize())),
            sha1: sha1.map(|h| hex::encode(h.finalize())),
            sha256: sha256.map(|h| hex::encode(h.finalize())),
        })
    }
}

fn compare_digest(
    kind: DigestKind,
    expected: Option<&str>,
    actual: Option<&str>,
) -> Result<(), VerificationError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let actual = actual.unwrap_or_default();
    if expected.trim().eq_ignore_ascii_case(actual) {
        Ok(())
    } else {
        Err(VerificationError::Digest {
            kind,
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}

/// Compares local details with what the server reported.
///
/// Size is always checked. A digest is only compared when the server supplied it;
/// a missing server digest is never a mismatch.
pub fn compare(actual: &FileDetails, expected: &RemoteFileInfo) -> Result<(), VerificationError> {
    if actual.size != expected.size {
        return Err(VerificationError::Size {
            expected: expected.size,
            actual: actual.size,
        });
    }
    compare_digest(DigestKind::Md5, expected.md5.as_deref(), actual.md5.as_deref())?;
    compare_digest(DigestKind::Sha1, expected.sha1.as_deref(), actual.sha1.as_deref())?;
    compare_digest(
        DigestKind::Sha256,
        expected.sha256.as_deref(),
        actual.sha256.as_deref(),
    )?;
    Ok(())
}

/// Streams `path` through every digest the server supplied and checks it against `expected`.
/// The file is left in place on mismatch.
pub fn verify_file(path: &Path, expected: &RemoteFileInfo) -> Result<FileDetails, TransferError> {
    let details = FileDetails::compute(path, DigestSelection::for_remote(expected))
        .map_err(|e| TransferError::io(format!("read {} for verification", path.display()), e))?;
    compare(&details, expected).map_err(|source| TransferError::Verification {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!(
        size = details.size,
        md5 = expected.md5.is_some(),
        sha1 = expected.sha1.is_some(),
        sha256 = expected.sha256.is_some(),
        "verified {}",
        path.display()
    );
    Ok(details)
}
