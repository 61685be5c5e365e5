//! Discover-call parameters accepted by the external catalog.

use crate::models::strategy::SortBy;

/// Parameters accepted by `CatalogAdapter::discover_movies` /
/// `discover_series`, narrowed to the fields the planner's strategies use.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverParams {
    /// Comma-joined genre ids.
    pub with_genres: String,
    pub with_original_language: String,
    pub vote_average_gte: Option<f64>,
    /// Defaults to 100.
    pub vote_count_gte: u32,
    pub primary_release_date_gte: Option<String>,
    pub primary_release_date_lte: Option<String>,
    pub first_air_date_gte: Option<String>,
    pub first_air_date_lte: Option<String>,
    pub sort_by: SortBy,
    /// `[1, 500]`.
    pub page: u32,
    pub include_adult: bool,
    pub language: String,
}

impl DiscoverParams {
    #[must_use]
    pub fn new(with_original_language: impl Into<String>) -> Self {
        Self {
            with_genres: String::new(),
            with_original_language: with_original_language.into(),
            vote_average_gte: None,
            vote_count_gte: 100,
            primary_release_date_gte: None,
            primary_release_date_lte: None,
            first_air_date_gte: None,
            first_air_date_lte: None,
            sort_by: SortBy::PopularityDesc,
            page: 1,
            include_adult: false,
            language: "en-US".to_string(),
        }
    }

    #[must_use]
    pub fn with_genres(mut self, genre_ids: &[i64]) -> Self {
        self.with_genres = genre_ids
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self
    }

    #[must_use]
    pub const fn with_min_rating(mut self, min_rating: f64) -> Self {
        self.vote_average_gte = Some(min_rating);
        self
    }

    #[must_use]
    pub const fn with_vote_count_gte(mut self, vote_count_gte: u32) -> Self {
        self.vote_count_gte = vote_count_gte;
        self
    }

    #[must_use]
    pub const fn with_sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    #[must_use]
    pub const fn with_page(mut self, page: u32) -> Self {
        self.page = page.clamp(1, 500);
        self
    }

    /// Rendered as the query-string pairs an HTTP client would attach.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("with_original_language", self.with_original_language.clone()),
            ("vote_count.gte", self.vote_count_gte.to_string()),
            ("sort_by", self.sort_by.as_query_value().to_string()),
            ("page", self.page.to_string()),
            ("include_adult", self.include_adult.to_string()),
            ("language", self.language.clone()),
        ];

        if !self.with_genres.is_empty() {
            pairs.push(("with_genres", self.with_genres.clone()));
        }
        if let Some(rating) = self.vote_average_gte {
            pairs.push(("vote_average.gte", rating.to_string()));
        }
        if let Some(date) = &self.primary_release_date_gte {
            pairs.push(("primary_release_date.gte", date.clone()));
        }
        if let Some(date) = &self.primary_release_date_lte {
            pairs.push(("primary_release_date.lte", date.clone()));
        }
        if let Some(date) = &self.first_air_date_gte {
            pairs.push(("first_air_date.gte", date.clone()));
        }
        if let Some(date) = &self.first_air_date_lte {
            pairs.push(("first_air_date.lte", date.clone()));
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let params = DiscoverParams::new("en");
        assert_eq!(params.vote_count_gte, 100);
        assert_eq!(params.page, 1);
        assert!(!params.include_adult);
    }

    #[test]
    fn test_with_genres_joins_with_comma() {
        let params = DiscoverParams::new("en").with_genres(&[28, 12, 35]);
        assert_eq!(params.with_genres, "28,12,35");
    }

    #[test]
    fn test_page_clamped() {
        let params = DiscoverParams::new("en").with_page(9999);
        assert_eq!(params.page, 500);
    }

    #[test]
    fn test_query_pairs_omit_absent_fields() {
        let params = DiscoverParams::new("en");
        let pairs = params.to_query_pairs();
        assert!(!pairs.iter().any(|(k, _)| *k == "with_genres"));
        assert!(!pairs.iter().any(|(k, _)| *k == "vote_average.gte"));
    }
}
