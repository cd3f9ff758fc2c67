//! Query text normalization

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize free-form query text into a cache key
///
/// Decomposes to NFD and strips combining marks (so accents are dropped),
/// lowercases, collapses whitespace runs to a single space and trims.
pub fn normalize_query(query: &str) -> String {
    let folded: String = query
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
