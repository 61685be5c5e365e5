//! `CandidateFilter`: strips blacklisted items from a page of catalog
//! results and picks one candidate.

use std::collections::HashSet;

use crate::models::media::{Kind, MediaItem};
use crate::planner::Random;

/// The largest prefix of a results page the filter samples from: choose
/// uniformly from the first `min(len, 20)` results.
const SAMPLE_WINDOW: usize = 20;

/// Removes blacklisted `(catalogId, kind)` pairs from a page of results and
/// picks one candidate uniformly from the leading window of what remains.
pub struct CandidateFilter<'a, R: Random> {
    random: &'a R,
}

impl<'a, R: Random> CandidateFilter<'a, R> {
    #[must_use]
    pub const fn new(random: &'a R) -> Self {
        Self { random }
    }

    /// Drop any item whose `(catalogId, kind)` is in `blacklist`.
    #[must_use]
    pub fn exclude_blacklisted(
        items: Vec<MediaItem>,
        blacklist: &HashSet<(i64, Kind)>,
    ) -> Vec<MediaItem> {
        items
            .into_iter()
            .filter(|item| !blacklist.contains(&item.identity()))
            .collect()
    }

    /// Pick one candidate uniformly from `min(len, 20)` leading items.
    /// Returns `None` if `items` is empty.
    #[must_use]
    pub fn choose(&self, items: &[MediaItem]) -> Option<&MediaItem> {
        if items.is_empty() {
            return None;
        }
        let window = items.len().min(SAMPLE_WINDOW);
        let index = self.random.choose_index(window);
        items.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::FixedRandom;

    fn item(catalog_id: i64, kind: Kind) -> MediaItem {
        MediaItem {
            catalog_id,
            kind,
            title: format!("item-{catalog_id}"),
            overview: None,
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            rating: None,
            vote_count: None,
            genre_ids: vec![],
            original_language: "en".to_string(),
        }
    }

    #[test]
    fn test_exclude_blacklisted_removes_matching_identity() {
        let items = vec![item(1, Kind::Movie), item(2, Kind::Movie)];
        let mut blacklist = HashSet::new();
        blacklist.insert((1, Kind::Movie));
        let remaining = CandidateFilter::<FixedRandom>::exclude_blacklisted(items, &blacklist);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].catalog_id, 2);
    }

    #[test]
    fn test_exclude_blacklisted_keeps_same_id_different_kind() {
        let items = vec![item(1, Kind::Movie), item(1, Kind::Series)];
        let mut blacklist = HashSet::new();
        blacklist.insert((1, Kind::Movie));
        let remaining = CandidateFilter::<FixedRandom>::exclude_blacklisted(items, &blacklist);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].kind, Kind::Series);
    }

    #[test]
    fn test_choose_returns_none_for_empty() {
        let random = FixedRandom::default();
        let filter = CandidateFilter::new(&random);
        assert!(filter.choose(&[]).is_none());
    }

    #[test]
    fn test_choose_caps_sample_window_at_20() {
        let random = FixedRandom {
            two: (0, 1),
            page: 1,
            index: 19,
        };
        let filter = CandidateFilter::new(&random);
        let items: Vec<MediaItem> = (0..30).map(|i| item(i, Kind::Movie)).collect();
        let chosen = filter.choose(&items).unwrap();
        assert_eq!(chosen.catalog_id, 19);
    }

    #[test]
    fn test_choose_single_item() {
        let random = FixedRandom::default();
        let filter = CandidateFilter::new(&random);
        let items = vec![item(7, Kind::Movie)];
        let chosen = filter.choose(&items).unwrap();
        assert_eq!(chosen.catalog_id, 7);
    }
}
