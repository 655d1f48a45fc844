//! Label normalization.

/// Normalizes a label into a comparison key.
///
/// Every character outside `[a-zA-Z0-9 ]` becomes a single space and the
/// result is lowercased. Lengths in characters are preserved.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == ' ' {
                ch.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect()
}
