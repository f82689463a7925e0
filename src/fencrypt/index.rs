//! Word extraction, prefix expansion, normalization, and blinding for the
//! searchable index.
//!
//! Index entries are equality-comparable but not reversible: every token is
//! normalized to a canonical form and then MACed under the per-file term
//! key, so two sidecars never share entries even for identical plaintexts.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::fencrypt::mac::mac;
use crate::fencrypt::schedule::SUBKEY_LEN;

/// Shortest word (in code points) the index keeps.
pub const MIN_WORD_LEN: usize = 4;

/// Longest word (in code points) the index keeps.
pub const MAX_WORD_LEN: usize = 12;

/// Maximal runs of letters, nonspacing marks, decimal digits, and
/// connector punctuation.
fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"[\p{L}\p{Mn}\p{Nd}\p{Pc}]+").expect("word pattern is valid"))
}

/// Extract the indexable words of `text`: every maximal word-like run of
/// 4 to 12 code points, sorted in code-point order.
pub fn extract_words(text: &str) -> Vec<String> {
    let mut words: Vec<String> = word_pattern()
        .find_iter(text)
        .map(|run| run.as_str().to_owned())
        .filter(|word| {
            let n = word.chars().count();
            (MIN_WORD_LEN..=MAX_WORD_LEN).contains(&n)
        })
        .collect();
    words.sort();
    words
}

/// The query strings a word can answer, shortest first: each prefix of 4 up
/// to one-short-of-full code points with a trailing `*`, then the word
/// itself. A 4-code-point word emits only itself.
pub fn prefix_variants(word: &str) -> Vec<String> {
    let n = word.chars().count();
    let mut variants = Vec::with_capacity(n.saturating_sub(MIN_WORD_LEN) + 1);
    for len in MIN_WORD_LEN..n {
        let mut prefix: String = word.chars().take(len).collect();
        prefix.push('*');
        variants.push(prefix);
    }
    variants.push(word.to_owned());
    variants
}

/// Canonical form of an index token: Unicode default case fold, then ASCII
/// lower-casing, then NFC composition. The ASCII pass is redundant after a
/// full fold but is kept so existing sidecars stay bit-compatible.
pub fn normalize_token(raw: &str) -> String {
    caseless::default_case_fold_str(raw)
        .to_ascii_lowercase()
        .nfc()
        .collect()
}

/// Canonical form of a user query: case fold and NFC only. Queries skip
/// extraction and prefix expansion, so a trailing `*` passes through and
/// selects the matching prefix variant.
pub fn normalize_query(raw: &str) -> String {
    caseless::default_case_fold_str(raw).nfc().collect()
}

/// Blind the full token set of a plaintext under the term key.
///
/// Words are extracted, expanded into prefix variants, and normalized; the
/// deduplicated tokens are MACed in sorted order, and the returned hex
/// entries keep that order.
pub fn blinded_terms(text: &str, term_key: &[u8; SUBKEY_LEN]) -> Vec<String> {
    let mut tokens = BTreeSet::new();
    for word in extract_words(text) {
        for variant in prefix_variants(&word) {
            tokens.insert(normalize_token(&variant));
        }
    }
    tokens
        .iter()
        .map(|token| hex::encode(mac(term_key, token.as_bytes())))
        .collect()
}

/// Blind a single query term for membership testing against a sidecar.
pub fn blind_query(term: &str, term_key: &[u8; SUBKEY_LEN]) -> String {
    hex::encode(mac(term_key, normalize_query(term).as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_only_wordlike_runs() {
        let words = extract_words("The quick-brown fox_1 jumps!");
        assert_eq!(words, ["brown", "fox_1", "jumps", "quick"]);
    }

    #[test]
    fn length_bounds_are_inclusive() {
        let words = extract_words("abc abcd abcdefghijkl abcdefghijklm");
        assert_eq!(words, ["abcd", "abcdefghijkl"]);
    }

    #[test]
    fn code_points_count_not_bytes() {
        // Four code points, more than four bytes.
        let words = extract_words("café");
        assert_eq!(words, ["café"]);
    }

    #[test]
    fn digit_and_underscore_runs_are_words() {
        let words = extract_words("x86_64 v2 12345 snake_case_name");
        assert_eq!(words, ["12345", "x86_64"]);
    }

    #[test]
    fn prefix_variants_at_the_boundary() {
        assert_eq!(prefix_variants("abcd"), ["abcd"]);
        assert_eq!(prefix_variants("abcde"), ["abcd*", "abcde"]);
        assert_eq!(
            prefix_variants("abcdefg"),
            ["abcd*", "abcde*", "abcdef*", "abcdefg"]
        );
    }

    #[test]
    fn normalization_folds_then_composes() {
        assert_eq!(normalize_token("HELLO"), "hello");
        // Full case fold, not plain lower-casing.
        assert_eq!(normalize_token("Straße"), "strasse");
        // Combining acute composes under NFC.
        assert_eq!(normalize_token("Cafe\u{301}"), "café");
    }

    #[test]
    fn query_normalization_keeps_the_star() {
        assert_eq!(normalize_query("QUIC*"), "quic*");
        assert_eq!(normalize_query("Straße"), "strasse");
    }

    #[test]
    fn blinded_terms_are_wellformed() {
        // Kept words: quick, brown, jumps; each adds one prefix variant.
        let terms = blinded_terms("The quick brown fox jumps", &[9u8; SUBKEY_LEN]);
        assert_eq!(terms.len(), 6);
        for term in &terms {
            assert_eq!(term.len(), 64);
            assert!(
                term.chars()
                    .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
            );
        }
        let unique: BTreeSet<&String> = terms.iter().collect();
        assert_eq!(unique.len(), terms.len());
    }

    #[test]
    fn queries_match_index_entries() {
        let key = [3u8; SUBKEY_LEN];
        let terms = blinded_terms("The quick brown fox jumps", &key);

        assert!(terms.contains(&blind_query("quick", &key)));
        assert!(terms.contains(&blind_query("quic*", &key)));
        assert!(terms.contains(&blind_query("QUIC*", &key)));
        // Prefixes shorter than four code points are never indexed.
        assert!(!terms.contains(&blind_query("qui*", &key)));
        assert!(!terms.contains(&blind_query("jumped", &key)));
        // Words below the length floor are not indexed at all.
        assert!(!terms.contains(&blind_query("fox", &key)));
    }

    #[test]
    fn duplicate_words_blind_once() {
        let key = [5u8; SUBKEY_LEN];
        let once = blinded_terms("sesame", &key);
        let twice = blinded_terms("sesame sesame SESAME", &key);
        assert_eq!(once, twice);
    }

    #[test]
    fn non_word_text_has_no_tokens() {
        assert!(extract_words("!!! ??? ... 123 --").is_empty());
        assert!(blinded_terms("!!! ??? ...", &[0u8; SUBKEY_LEN]).is_empty());
    }
}
