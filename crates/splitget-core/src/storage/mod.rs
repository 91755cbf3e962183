//! Disk I/O for the final file.
//!
//! Reassembles chunk files, in range order, into the destination path with
//! truncate-and-replace semantics and a bounded copy buffer.

mod assemble;

pub use assemble::{assemble_chunks, DEFAULT_COPY_BUFFER};
