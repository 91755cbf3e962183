//! Range-split HTTP download engine.
//!
//! Pipeline: [`fetch_head::probe`] → [`segmenter::plan_ranges`] →
//! [`coordinator::download_chunks`] → [`storage::assemble_chunks`] →
//! [`checksum::verify_file`]. [`transfer::download_file`] runs all of it.

pub mod checksum;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod downloader;
pub mod error;
pub mod fetch_head;
pub mod logging;
pub mod progress;
pub mod scratch;
pub mod segmenter;
pub mod storage;
pub mod transfer;
pub mod url_model;

pub use error::{TransferError, VerificationError};
pub use transfer::{download_file, TransferReport, TransferSpec};
