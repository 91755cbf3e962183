//! `splitget get <url>`: probe, split, fetch, reassemble, verify.

use anyhow::{Context, Result};
use splitget_core::client::Credentials;
use splitget_core::config::SplitgetConfig;
use splitget_core::progress::ChunkEvent;
use splitget_core::scratch::ScratchDir;
use splitget_core::error::TransferError;
use splitget_core::transfer::{self, TransferReport, TransferSpec};
use splitget_core::url_model;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// Parsed `get` arguments.
#[derive(Debug)]
pub struct GetArgs {
    pub url: String,
    pub name: Option<String>,
    pub dest: Option<PathBuf>,
    pub flat: bool,
    pub split_count: Option<usize>,
    pub credentials: Option<Credentials>,
    pub log_prefix: Option<String>,
}

impl GetArgs {
    fn into_spec(self, cfg: &SplitgetConfig) -> (TransferSpec, String) {
        let mut spec = TransferSpec::new(self.url);
        if let Some(name) = self.name {
            spec.file_name = url_model::local_file_name(&name);
        }
        spec.local_dir = self.dest;
        spec.flat = self.flat;
        spec.split_count = self.split_count.unwrap_or(cfg.split_count).max(1);
        spec.credentials = self.credentials;
        let prefix = self
            .log_prefix
            .unwrap_or_else(|| format!("[{}]", spec.file_name));
        (spec, prefix)
    }
}

pub async fn run_get(args: GetArgs, cfg: &SplitgetConfig) -> Result<()> {
    let (spec, prefix) = args.into_spec(cfg);
    let scratch = ScratchDir::acquire().context("create scratch directory")?;

    let (tx, rx) = mpsc::channel::<ChunkEvent>();
    let printer = tokio::task::spawn_blocking(move || {
        for event in rx {
            println!("{}", event);
        }
    });

    let result = tokio::task::spawn_blocking({
        let spec = spec.clone();
        let cfg = cfg.clone();
        let prefix = prefix.clone();
        move || transfer::download_file(&spec, &cfg, &scratch, &prefix, Some(&tx))
    })
    .await
    .context("download task join")?;
    let _ = printer.await;

    report_outcome(&prefix, &spec.destination(), result, &mut io::stdout().lock())
}

/// Prints the closing lines of a transfer and turns a failure into the CLI error.
///
/// `Done downloading.` follows reassembly, so it is printed for verification
/// failures as well.
fn report_outcome(
    prefix: &str,
    destination: &Path,
    result: Result<TransferReport, TransferError>,
    out: &mut impl Write,
) -> Result<()> {
    match result {
        Ok(report) => {
            writeln!(out, "{} Done downloading.", prefix)?;
            if report.remote.has_checksums() {
                writeln!(out, "{} checksums verified", prefix)?;
            }
            writeln!(
                out,
                "{} saved {} ({} bytes, {} range(s))",
                prefix,
                report.destination.display(),
                report.bytes_written,
                report.ranges.len()
            )?;
            Ok(())
        }
        Err(e) if e.is_verification() => {
            writeln!(out, "{} Done downloading.", prefix)?;
            Err(anyhow::Error::new(e).context(format!(
                "{} integrity check failed; {} was kept for inspection",
                prefix,
                destination.display()
            )))
        }
        Err(e) => Err(anyhow::Error::new(e).context(format!("{} download failed", prefix))),
    }
}
