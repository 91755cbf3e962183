//! CLI for splitget.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use splitget_core::client::Credentials;
use splitget_core::config;
use std::path::PathBuf;

use commands::{run_checksum, run_get, run_probe, GetArgs};

/// Top-level CLI for splitget.
#[derive(Debug, Parser)]
#[command(name = "splitget")]
#[command(about = "splitget: range-split HTTP downloads with checksum verification", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a file, splitting it into concurrent byte-range requests.
    Get {
        /// Direct HTTP/HTTPS URL to download.
        url: String,

        /// Local file name (default: last segment of the URL path).
        #[arg(long, value_name = "NAME")]
        name: Option<String>,

        /// Directory to save into.
        #[arg(long, value_name = "DIR")]
        dest: Option<PathBuf>,

        /// Ignore --dest and save into the current directory.
        #[arg(long)]
        flat: bool,

        /// Number of byte ranges (default from config).
        #[arg(long, value_name = "N")]
        split_count: Option<usize>,

        /// User for HTTP Basic authentication.
        #[arg(long)]
        user: Option<String>,

        /// Password for HTTP Basic authentication.
        #[arg(long)]
        password: Option<String>,

        /// Prefix for progress lines (default: "[<name>]").
        #[arg(long, value_name = "S")]
        log_prefix: Option<String>,
    },

    /// Show the size, checksums and range support the server reports for a URL.
    Probe {
        url: String,

        #[arg(long)]
        user: Option<String>,

        #[arg(long)]
        password: Option<String>,
    },

    /// Print size, MD5, SHA-1 and SHA-256 of a local file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

fn credentials(user: Option<String>, password: Option<String>) -> Option<Credentials> {
    if user.is_none() && password.is_none() {
        return None;
    }
    Some(Credentials::new(
        user.unwrap_or_default(),
        password.unwrap_or_default(),
    ))
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Get {
                url,
                name,
                dest,
                flat,
                split_count,
                user,
                password,
                log_prefix,
            } => {
                let args = GetArgs {
                    url,
                    name,
                    dest,
                    flat,
                    split_count,
                    credentials: credentials(user, password),
                    log_prefix,
                };
                run_get(args, &cfg).await?
            }
            CliCommand::Probe {
                url,
                user,
                password,
            } => run_probe(&url, credentials(user, password), &cfg).await?,
            CliCommand::Checksum { path } => run_checksum(&path).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
