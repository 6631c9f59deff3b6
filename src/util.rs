use std::path::Path;

/// Write `content` to `path` atomically: write to a sibling temp file, then
/// rename over the destination. Readers never observe a partial file.
pub fn atomic_write_str(path: &Path, content: &str) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// First whitespace-separated token of `s`, or empty if there is none.
pub fn first_token(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or("")
}

/// Uppercased first character of the first token of `s`.
///
/// Example: "ada wong" → 'A'; "a@x.com" → 'A'. None for empty/whitespace.
pub fn leading_initial(s: &str) -> Option<char> {
    first_token(s)
        .chars()
        .next()
        .and_then(|c| c.to_uppercase().next())
}
