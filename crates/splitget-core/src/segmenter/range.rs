//! Byte range type and range planning.

use std::fmt;

/// A single chunk: byte range [start, end) (half-open).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// Start offset (inclusive).
    pub start: u64,
    /// End offset (exclusive).
    pub end: u64,
}

impl ByteRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Length of this range in bytes.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Curl range spec (inclusive end): `start-(end-1)`. `None` for an empty range,
    /// which has no valid HTTP representation.
    pub fn curl_range(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(format!("{}-{}", self.start, self.end - 1))
        }
    }

    /// HTTP Range header value (inclusive end): `bytes=start-(end-1)`.
    pub fn range_header_value(&self) -> Option<String> {
        self.curl_range().map(|r| format!("bytes={}", r))
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Builds a range plan for a given total size and split count.
///
/// Always returns exactly `split_count` ranges (a count of 0 is treated as 1).
/// Every range but the last has length `total_size / split_count`; the last one
/// runs to `total_size` and absorbs the remainder. When `total_size < split_count`
/// the leading ranges are empty.
pub fn plan_ranges(total_size: u64, split_count: usize) -> Vec<ByteRange> {
    let split_count = split_count.max(1);
    let chunk = total_size / split_count as u64;

    let mut out = Vec::with_capacity(split_count);
    for i in 0..split_count as u64 {
        let start = chunk * i;
        let end = if i + 1 == split_count as u64 {
            total_size
        } else {
            chunk * (i + 1)
        };
        out.push(ByteRange { start, end });
    }
    out
}
