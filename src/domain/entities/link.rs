//! Link entity representing a short-code-to-URL mapping.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A shortened URL link with its visit counter.
///
/// `visits_counter` always equals the number of visit records appended for
/// this link; it only changes through the visit ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub visits_counter: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        short_code: String,
        original_url: String,
        visits_counter: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            short_code,
            original_url,
            visits_counter,
            created_at,
            updated_at,
        }
    }
}

/// Input data for creating a new link.
///
/// The short code is supplied by the caller and stored as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub short_code: String,
    pub original_url: String,
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged. The short code and the visit counter
/// cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPatch {
    pub original_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_creation() {
        let now = Utc::now();
        let link = Link::new(
            1,
            "abc123".to_string(),
            "https://example.com".to_string(),
            0,
            now,
            now,
        );

        assert_eq!(link.id, 1);
        assert_eq!(link.short_code, "abc123");
        assert_eq!(link.original_url, "https://example.com");
        assert_eq!(link.visits_counter, 0);
        assert_eq!(link.created_at, now);
    }

    #[test]
    fn test_link_serializes_snake_case() {
        let now = Utc::now();
        let link = Link::new(7, "x".to_string(), "https://a.b".to_string(), 3, now, now);
        let value = serde_json::to_value(&link).unwrap();

        assert_eq!(value["short_code"], "x");
        assert_eq!(value["visits_counter"], 3);
    }

    #[test]
    fn test_empty_patch_changes_nothing() {
        let patch = LinkPatch::default();
        assert!(patch.original_url.is_none());
    }
}
