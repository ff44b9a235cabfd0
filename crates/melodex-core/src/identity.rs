//! Identity keys for cross-source deduplication.
//!
//! Two observations describe the same track exactly when their identity keys
//! are equal. Keys ignore case, whitespace, hyphens, underscores and quote
//! characters, and drop featured-artist credits from the artist field, so
//! `"Drake feat. Future"` and `"DRAKE"` resolve to the same artist.

/// Joins the normalized artist and title.
pub const KEY_SEPARATOR: char = '|';

/// Whole-word markers that introduce a featured-artist credit.
const FEATURE_MARKERS: &[&str] = &["featuring", "feat", "ft"];

/// Compute the identity key for an artist/title pair.
pub fn identity_key(artist: &str, title: &str) -> String {
    let mut key = normalize_artist(artist);
    key.push(KEY_SEPARATOR);
    key.push_str(&normalize_title(title));
    key
}

/// Normalize an artist credit down to its primary artist.
pub fn normalize_artist(artist: &str) -> String {
    normalize_text(primary_artist(artist))
}

pub fn normalize_title(title: &str) -> String {
    normalize_text(title)
}

/// Return the part of an artist credit before any featured-artist marker.
///
/// A marker must be a whole word, optionally opened by `(` or `[` and
/// optionally followed by a period. A marker at the very start of the credit
/// is not a delimiter. Separators left dangling before the marker, as in
/// `"Drake, feat. Future"`, are dropped with it.
pub fn primary_artist(artist: &str) -> &str {
    let mut offset = 0;
    for token in artist.split_inclusive(char::is_whitespace) {
        let start = offset;
        offset += token.len();

        let head = artist[..start].trim_end_matches(is_credit_separator);
        if head.trim().is_empty() {
            continue;
        }

        let word = token.trim_end().trim_start_matches(['(', '[']);
        if is_feature_marker(word) {
            return head;
        }
    }
    artist
}

fn is_credit_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | ';' | '(' | '[')
}

fn is_feature_marker(word: &str) -> bool {
    // "feat.Future" carries the marker and the guest in one token
    let candidate = word.split_once('.').map_or(word, |(marker, _)| marker);
    FEATURE_MARKERS
        .iter()
        .any(|marker| marker.eq_ignore_ascii_case(candidate))
}

fn is_stripped(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '-' | '_' | '\'' | '"' | '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}'
        )
}

fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|&c| !is_stripped(c))
        .collect()
}
