//! Cache entry data structure.
//!
//! A [`CacheEntry`] is one resolved (or known-unresolved) lookup, keyed in
//! the store by the hashed identifier. The serialized field names are shared
//! with the on-disk snapshot format, so renames here are breaking changes.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A cached lookup result.
///
/// `pronoun == None` (or an empty string) means "looked up, nothing found":
/// a real verdict that suppresses re-requests until it expires, not an error.
///
/// # Example
///
/// ```
/// use pronoun_cache::CacheEntry;
///
/// let hit = CacheEntry::new(Some("They/Them".into()), 1_700_000_000);
/// assert!(hit.has_value());
///
/// let miss = CacheEntry::new(None, 1_700_000_000);
/// assert!(!miss.has_value());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// When the entry was last populated (epoch seconds)
    #[serde(rename = "retrievedAt")]
    pub retrieved_at: i64,
    /// Resolved display value; absent means a confirmed "not found"
    #[serde(default)]
    pub pronoun: Option<String>,
}

impl CacheEntry {
    pub fn new(pronoun: Option<String>, retrieved_at: i64) -> Self {
        Self {
            retrieved_at,
            pronoun,
        }
    }

    /// Whether this entry carries a non-empty resolved value.
    #[must_use]
    pub fn has_value(&self) -> bool {
        self.pronoun.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// The display text for this entry, empty when unresolved.
    #[must_use]
    pub fn display_text(&self) -> &str {
        self.pronoun.as_deref().unwrap_or("")
    }
}

/// Current wall-clock time as epoch seconds.
pub fn epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_value() {
        assert!(CacheEntry::new(Some("He/Him".into()), 0).has_value());
        assert!(!CacheEntry::new(Some(String::new()), 0).has_value());
        assert!(!CacheEntry::new(None, 0).has_value());
    }

    #[test]
    fn test_display_text() {
        assert_eq!(
            CacheEntry::new(Some("She/Her".into()), 0).display_text(),
            "She/Her"
        );
        assert_eq!(CacheEntry::new(None, 0).display_text(), "");
    }

    #[test]
    fn test_wire_field_names() {
        let entry = CacheEntry::new(Some("They/Them".into()), 1_700_000_000);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["retrievedAt"], 1_700_000_000);
        assert_eq!(json["pronoun"], "They/Them");
    }

    #[test]
    fn test_deserialize_null_pronoun() {
        let entry: CacheEntry =
            serde_json::from_str(r#"{"retrievedAt": 123, "pronoun": null}"#).unwrap();
        assert_eq!(entry.retrieved_at, 123);
        assert!(entry.pronoun.is_none());
    }

    #[test]
    fn test_deserialize_missing_pronoun() {
        let entry: CacheEntry = serde_json::from_str(r#"{"retrievedAt": 123}"#).unwrap();
        assert!(entry.pronoun.is_none());
    }

    #[test]
    fn test_round_trip() {
        let entry = CacheEntry::new(Some("It/Its".into()), 42);
        let json = serde_json::to_string(&entry).unwrap();
        let back: CacheEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_epoch_seconds_is_recent() {
        // Sanity bound: after 2023, before 2100
        let now = epoch_seconds();
        assert!(now > 1_672_531_200);
        assert!(now < 4_102_444_800);
    }
}
