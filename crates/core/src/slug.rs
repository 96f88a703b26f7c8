//! URL slugs

/// Converts a display string into a URL-friendly slug.
///
/// Lowercases and trims the input, turns whitespace runs into hyphens, strips
/// every remaining non-word character and collapses repeated hyphens. The
/// result is stable: slugifying a slug returns it unchanged.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());

    for ch in text.trim().to_lowercase().chars() {
        let mapped = if ch.is_whitespace() {
            '-'
        } else if ch == '-' || ch == '_' || ch.is_ascii_alphanumeric() {
            ch
        } else {
            continue;
        };

        if mapped == '-' && slug.ends_with('-') {
            continue;
        }

        slug.push(mapped);
    }

    slug
}
