use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::UserId;
use super::media::Kind;

/// Durable per-user taste profile.
///
/// Created once during onboarding, mutated only by an explicit user re-edit —
/// the core never writes to it on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasteProfile {
    pub user_id: UserId,
    /// Nonempty, insertion-ordered preference.
    pub content_types: Vec<Kind>,
    /// Nonempty, size >= 3.
    pub genres: Vec<i64>,
    /// Nonempty, ordered, primary first.
    pub languages: Vec<String>,
    pub min_rating: Option<f64>,
    pub anime_auto_language: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TasteProfile {
    /// A profile store row is "usable" iff: nonempty content types, at
    /// least 3 genres, nonempty languages. This is the resolution of the
    /// "profile complete" open question recorded in DESIGN.md — existence
    /// plus these invariants, no separate flag.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.content_types.is_empty() && self.genres.len() >= 3 && !self.languages.is_empty()
    }

    /// Primary language, falling back to `"en"` when unset.
    #[must_use]
    pub fn primary_language(&self) -> &str {
        self.languages.first().map_or("en", String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TasteProfile {
        TasteProfile {
            user_id: "u1".into(),
            content_types: vec![Kind::Movie, Kind::Series],
            genres: vec![28, 12, 35],
            languages: vec!["en".to_string()],
            min_rating: Some(7.0),
            anime_auto_language: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_usable() {
        assert!(sample().is_usable());

        let mut missing_genres = sample();
        missing_genres.genres = vec![28];
        assert!(!missing_genres.is_usable());

        let mut no_kinds = sample();
        no_kinds.content_types = vec![];
        assert!(!no_kinds.is_usable());
    }

    #[test]
    fn test_primary_language_falls_back() {
        let mut profile = sample();
        profile.languages = vec![];
        assert_eq!(profile.primary_language(), "en");
    }
}
