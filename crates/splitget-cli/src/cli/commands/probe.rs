//! `splitget probe <url>`: what the server reports before downloading.

use anyhow::{Context, Result};
use splitget_core::client::{ClientOptions, Credentials};
use splitget_core::config::SplitgetConfig;
use splitget_core::fetch_head;

pub async fn run_probe(url: &str, credentials: Option<Credentials>, cfg: &SplitgetConfig) -> Result<()> {
    let client = ClientOptions::from_config(cfg, credentials);
    let info = tokio::task::spawn_blocking({
        let url = url.to_string();
        move || fetch_head::probe(&url, &client)
    })
    .await
    .context("probe task join")??;

    println!("{}", url);
    println!("  size           {}", info.size);
    println!("  accept-ranges  {}", if info.accept_ranges { "bytes" } else { "none" });
    println!("  md5            {}", info.md5.as_deref().unwrap_or("-"));
    println!("  sha1           {}", info.sha1.as_deref().unwrap_or("-"));
    println!("  sha256         {}", info.sha256.as_deref().unwrap_or("-"));
    Ok(())
}
