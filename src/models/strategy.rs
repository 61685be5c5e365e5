use serde::{Deserialize, Serialize};

/// External catalog sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    PopularityDesc,
    VoteAverageDesc,
}

impl SortBy {
    #[must_use]
    pub const fn as_query_value(self) -> &'static str {
        match self {
            Self::PopularityDesc => "popularity.desc",
            Self::VoteAverageDesc => "vote_average.desc",
        }
    }
}

/// A named, fully-resolved query plan consumed once against the catalog.
/// Produced by the planner, iterated by the recommender, then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub name: String,
    pub genre_ids: Vec<i64>,
    pub languages: Vec<String>,
    pub min_rating: f64,
    pub sort_by: SortBy,
    pub vote_count_min: u32,
    pub pages: Vec<u32>,
}

impl Strategy {
    /// The original-language parameter sent to the catalog: every
    /// non-alternative-language strategy uses `languages[0]`.
    #[must_use]
    pub fn original_language(&self) -> &str {
        self.languages.first().map_or("en", String::as_str)
    }
}
