//! Range math and chunk planning.
//!
//! Splits a known total size into N contiguous byte ranges and computes the
//! HTTP Range header bounds for each.

mod range;

pub use range::{plan_ranges, ByteRange};
