//! Helpers for keeping card data and full paths out of logs and span attributes.

use std::path::Path;

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Masks a card number down to its first six and last four digits.
///
/// - `4111111111111111` → `411111******1111`
/// - inputs shorter than 13 characters are masked entirely
pub fn mask_pan(number: &str) -> String {
    let len = number.chars().count();
    if len < 13 {
        return "*".repeat(len);
    }

    number
        .chars()
        .enumerate()
        .map(|(i, c)| if i < 6 || i >= len - 4 { c } else { '*' })
        .collect()
}
