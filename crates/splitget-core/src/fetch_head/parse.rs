//! Parse HTTP response header lines into probe metadata.

/// Header values the probe cares about; `content_length` is `None` when absent or unparseable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ParsedHead {
    pub content_length: Option<u64>,
    pub accept_ranges: bool,
    pub md5: Option<String>,
    pub sha1: Option<String>,
    pub sha256: Option<String>,
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse collected header lines into `ParsedHead`.
pub(crate) fn parse_headers(lines: &[String]) -> ParsedHead {
    let mut out = ParsedHead::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            out.content_length = value.parse::<u64>().ok();
        } else if name.eq_ignore_ascii_case("accept-ranges") {
            out.accept_ranges = value.eq_ignore_ascii_case("bytes");
        } else if name.eq_ignore_ascii_case("x-checksum-md5") {
            out.md5 = non_empty(value);
        } else if name.eq_ignore_ascii_case("x-checksum-sha1") {
            out.sha1 = non_empty(value);
        } else if name.eq_ignore_ascii_case("x-checksum-sha256") {
            out.sha256 = non_empty(value);
        }
    }

    out
}
