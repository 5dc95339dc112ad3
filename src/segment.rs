use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

// Chinese and Western sentence-final punctuation, semicolons, colons, commas,
// plus newline/whitespace runs. Any run of these ends a candidate sentence.
static BOUNDARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[。！!？?；;：，\n\s]+").unwrap());

/// Split a review body into candidate sentences, in source order. Empty
/// fragments between consecutive delimiters are dropped; an entirely-delimiter
/// body yields an empty vec. Downstream sampling relies on this order being
/// stable for identical input.
pub fn split_sentences(text: &str) -> Vec<String> {
    let normalized: String = text.nfc().collect();
    BOUNDARY
        .split(&normalized)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
