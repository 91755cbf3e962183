//! `splitget checksum <path>`: size and digests of a local file.

use anyhow::{Context, Result};
use splitget_core::checksum::FileDetails;
use std::path::Path;

pub async fn run_checksum(path: &Path) -> Result<()> {
    let details = tokio::task::spawn_blocking({
        let path = path.to_path_buf();
        move || FileDetails::from_path(&path)
    })
    .await
    .context("checksum task join")?
    .with_context(|| format!("read {}", path.display()))?;

    println!("{}", path.display());
    println!("  size    {}", details.size);
    for (label, digest) in [
        ("md5", &details.md5),
        ("sha1", &details.sha1),
        ("sha256", &details.sha256),
    ] {
        if let Some(d) = digest {
            println!("  {:<7} {}", label, d);
        }
    }
    Ok(())
}
