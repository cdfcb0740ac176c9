//! Privacy-preserving identifier hashing.
//!
//! Raw display names never leave the process and never touch disk. Every
//! identifier is normalized and one-way hashed before it is used as a cache
//! key or sent over the wire. MD5 is deliberate here: the keys only need to
//! be stable, 128-bit and non-reversible-in-practice for privacy-by-hashing,
//! not collision resistant against an adversary. Changing the algorithm would
//! invalidate every key in existing snapshot files and in the remote service.

use md5::{Digest, Md5};

/// Strip display markup from a raw name.
///
/// Game clients decorate names with `<...>` tags (icons, colors) and
/// non-breaking spaces. Two renderings of the same identity must normalize to
/// the same text, otherwise they would hash to different keys.
pub fn normalize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            '\u{00A0}' if !in_tag => out.push(' '),
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

/// Hash a raw display name into its stable cache/wire key.
///
/// Returns the lowercase hex MD5 digest of the normalized name, or the empty
/// string when the input is empty (or nothing but markup). An empty key means
/// "no identity" and is never an error.
pub fn hash_name(raw: &str) -> String {
    let cleaned = normalize_name(raw);
    if cleaned.is_empty() {
        return String::new();
    }
    hex::encode(Md5::digest(cleaned.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        // RFC 1321 test vector
        assert_eq!(hash_name("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_empty_input_yields_empty_key() {
        assert_eq!(hash_name(""), "");
        assert_eq!(hash_name("   "), "");
        assert_eq!(hash_name("<img=41>"), "");
    }

    #[test]
    fn test_markup_does_not_change_key() {
        let plain = hash_name("Zezima");
        assert_eq!(hash_name("<img=41>Zezima"), plain);
        assert_eq!(hash_name("<col=ff0000>Zezima</col>"), plain);
    }

    #[test]
    fn test_nbsp_folds_to_space() {
        assert_eq!(normalize_name("Iron\u{00A0}Man"), "Iron Man");
        assert_eq!(hash_name("Iron\u{00A0}Man"), hash_name("Iron Man"));
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        assert_eq!(hash_name(" Zezima "), hash_name("Zezima"));
    }

    #[test]
    fn test_output_shape() {
        let key = hash_name("Some Player");
        assert_eq!(key.len(), 32);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(hash_name("Some Player"), hash_name("Some Player"));
    }

    #[test]
    fn test_case_sensitive_after_normalization() {
        // Normalization only strips markup; it does not case-fold
        assert_ne!(hash_name("zezima"), hash_name("Zezima"));
    }
}
