//! Local file name derivation from a source URL.

/// Used when the URL path yields nothing usable.
pub const DEFAULT_FILENAME: &str = "download.bin";

/// Returns the last non-empty path segment of `url`, if any.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    Some(segment.to_string())
}

/// Makes a single path component safe to create on Linux.
///
/// Separators, NUL and control characters become `_`; leading and trailing dots
/// and whitespace are trimmed.
fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    replaced
        .trim_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string()
}

/// Cleans a caller-supplied file name so it stays a single path component.
pub fn local_file_name(name: &str) -> String {
    let name = sanitize(name);
    if name.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        name
    }
}

/// File name to save `url` under when the caller did not choose one.
///
/// `derive_filename("https://mirror.example/pool/main/a.deb")` is `"a.deb"`;
/// a bare host gives [`DEFAULT_FILENAME`].
pub fn derive_filename(url: &str) -> String {
    match filename_from_url_path(url) {
        Some(name) => local_file_name(&name),
        None => DEFAULT_FILENAME.to_string(),
    }
}
