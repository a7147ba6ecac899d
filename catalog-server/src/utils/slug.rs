//! Slug derivation
//!
//! Single-segment slugs from display names. Full-path category slugs are
//! assembled by the category service from these segments.

/// Derive a URL-safe slug segment from a display name.
///
/// Lowercases, collapses whitespace runs to a single dash and strips
/// everything outside `[a-z0-9-]`.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_dash = true; // suppress leading dashes
    for ch in name.trim().chars() {
        if ch.is_whitespace() {
            if !last_dash {
                out.push('-');
                last_dash = true;
            }
            continue;
        }
        for lower in ch.to_lowercase() {
            if lower.is_ascii_alphanumeric() || lower == '-' {
                out.push(lower);
                last_dash = lower == '-';
            }
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
