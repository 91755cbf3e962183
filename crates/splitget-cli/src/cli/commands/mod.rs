//! CLI command handlers, one per file.

mod checksum;
mod get;
mod probe;

pub use checksum::run_checksum;
pub use get::{run_get, GetArgs};
pub use probe::run_probe;
