/// Derive the attachment prefix for an asset tag.
///
/// Every character outside `[A-Za-z0-9_-]` becomes `_`. The mapping is
/// per-character, so the result has as many characters as the input, and
/// applying it twice changes nothing.
pub fn sanitize_tag(tag: &str) -> String {
    tag.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Lowercased extension after the last `.`, limited to ASCII alphanumerics.
///
/// Returns `None` for names without a dot or with nothing usable after it.
pub fn file_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if ext.is_empty() { None } else { Some(ext) }
}

/// Original file name without its extension, sanitized like a tag.
pub fn sanitize_stem(file_name: &str) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _)| stem);
    sanitize_tag(stem)
}

/// Whether `name` is a single path component that is safe to join onto a folder.
pub fn is_flat_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
        && !name.chars().any(|c| c.is_ascii_control())
}
