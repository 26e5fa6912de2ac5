//! Canonical target keys and their content-addressed digests.
//!
//! Suggestions are retired in bulk by the digest of a canonical key built
//! from their subject's identifying attributes. Two logically-equal targets
//! must produce byte-identical keys — normalization removes the encoding
//! and whitespace noise that would otherwise split them — so invalidation
//! has no false negatives. SHA-256 collisions are accepted as theoretically
//! possible and not engineered against.

use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// Separator between canonical key segments. Chosen outside the normalized
/// character repertoire of titles and locations.
const KEY_SEPARATOR: char = '|';

/// Canonicalize one free-text attribute: Unicode NFC, trimmed, lowercased,
/// inner whitespace runs collapsed to single spaces.
pub fn normalize(text: &str) -> String {
    let composed: String = text.nfc().collect();
    composed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Canonical key for a plan-like target: normalized title and location.
pub fn plan_key(title: &str, location: &str) -> String {
    format!(
        "{}{}{}",
        normalize(title),
        KEY_SEPARATOR,
        normalize(location)
    )
}

/// Canonical key for a recurrence group, from its stable id.
pub fn group_key(group_id: Uuid) -> String {
    group_id.simple().to_string()
}

/// SHA-256 digest of a canonical key as lowercase hex.
///
/// An effectively-empty key digests to the empty string so that publishing
/// an invalidation for it degrades to a no-op instead of retiring every
/// suggestion that hashed an empty subject.
pub fn hash_key(key: &str) -> String {
    if key.chars().all(|c| c.is_whitespace() || c == KEY_SEPARATOR) {
        return String::new();
    }
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_collapses() {
        assert_eq!(normalize("  Weekly   Review  "), "weekly review");
        assert_eq!(normalize("one\ttwo\nthree"), "one two three");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_composes_unicode() {
        // Decomposed Hangul (conjoining jamo) composes to the same
        // syllables: 일정 written as U+C77C U+C815 versus its jamo.
        let composed = "\u{C77C}\u{C815}";
        let decomposed = "\u{110B}\u{1175}\u{11AF}\u{110C}\u{1165}\u{11BC}";
        assert_eq!(normalize(decomposed), normalize(composed));
    }

    #[test]
    fn test_plan_key_shape() {
        assert_eq!(plan_key("Standup", "Room  A"), "standup|room a");
        assert_eq!(plan_key("Standup", ""), "standup|");
    }

    #[test]
    fn test_equal_targets_hash_identically() {
        let a = hash_key(&plan_key("  Weekly Review ", "HQ"));
        let b = hash_key(&plan_key("weekly  review", "hq"));
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_distinct_targets_hash_differently() {
        let a = hash_key(&plan_key("Standup", "Room A"));
        let b = hash_key(&plan_key("Standup", "Room B"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_key_hashes_to_empty() {
        assert_eq!(hash_key(""), "");
        assert_eq!(hash_key("   "), "");
        // A plan key with empty title and location is still empty-ish.
        assert_eq!(hash_key(&plan_key("", "  ")), "");
    }

    #[test]
    fn test_group_key_is_stable() {
        let id = Uuid::nil();
        assert_eq!(group_key(id), "00000000000000000000000000000000");
        assert_eq!(group_key(id), group_key(id));
        assert!(!hash_key(&group_key(id)).is_empty());
    }

    #[test]
    fn test_hash_is_deterministic() {
        let key = plan_key("점심 약속", "강남역");
        assert_eq!(hash_key(&key), hash_key(&key));
    }
}
