//! URL slugs for post titles.

use unicode_normalization::UnicodeNormalization;

/// Turn a title into a URL slug.
///
/// Accents are stripped (`Año` → `ano`), every run of characters outside
/// `[a-z0-9]` becomes a single `-` and leading/trailing hyphens are dropped.
pub fn generate_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.to_lowercase().nfd() {
        if is_combining_mark(c) {
            continue;
        }
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}
