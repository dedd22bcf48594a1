//! Slug derivation for entity definition names
//!
//! Lowercases, keeps alphanumerics (Unicode-aware), and collapses every run
//! of whitespace or punctuation into a single hyphen, so `"Client  Files"`
//! and `"client files"` collide deliberately while `"Café Orders"` stays a
//! valid identifier.

/// Derive a slug from a display name
///
/// Returns `None` when the name contains no alphanumeric characters at all.
pub fn slugify(name: &str) -> Option<String> {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for ch in name.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_separator = true;
        }
    }

    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}
