use serde::{Deserialize, Serialize};

/// Media category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Kind {
    Movie,
    Series,
    Anime,
}

impl Kind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "MOVIE",
            Self::Series => "SERIES",
            Self::Anime => "ANIME",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized catalog item. Immutable — a read-through view of external
/// data; stale cached copies are acceptable within TTL bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Stable external id, positive.
    pub catalog_id: i64,
    pub kind: Kind,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    /// ISO 8601 date string; only the year is semantically required.
    pub release_date: Option<String>,
    /// `[0, 10]`.
    pub rating: Option<f64>,
    pub vote_count: Option<u32>,
    pub genre_ids: Vec<i64>,
    /// ISO-639-1 primary subtag, lowercased.
    pub original_language: String,
}

impl MediaItem {
    /// Key used for blacklist membership and history upsert: the
    /// `(catalogId, kind)` pair uniquely identifies an item for a user.
    #[must_use]
    pub const fn identity(&self) -> (i64, Kind) {
        (self.catalog_id, self.kind)
    }
}

/// A single page of catalog results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub results: Vec<MediaItem>,
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(Kind::Movie.to_string(), "MOVIE");
        assert_eq!(Kind::Anime.as_str(), "ANIME");
    }

    #[test]
    fn test_media_item_identity() {
        let item = MediaItem {
            catalog_id: 42,
            kind: Kind::Series,
            title: "Example".to_string(),
            overview: None,
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            rating: None,
            vote_count: None,
            genre_ids: vec![],
            original_language: "en".to_string(),
        };
        assert_eq!(item.identity(), (42, Kind::Series));
    }
}
