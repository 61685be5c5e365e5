//! `StrategyPlanner`: builds the cascading fallback query plan that
//! widens a user's filters step by step until the catalog yields a result.

pub mod random;

pub use random::{FixedRandom, Random, ThreadRandom};

use crate::models::media::Kind;
use crate::models::strategy::{SortBy, Strategy};

/// External animation genre id, unioned in for anime specialization.
const ANIMATION_GENRE_ID: i64 = 16;

/// Fallback floor used when no caller-supplied default has been set via
/// `with_default_vote_count_min`.
const DEFAULT_VOTE_COUNT_MIN: u32 = 100;

fn all_pages() -> Vec<u32> {
    vec![1, 2, 3, 4, 5]
}

/// Produces an ordered list of candidate query strategies for a
/// `(kind, genres, languages, minRating)` filter bundle.
///
/// The first language is sacred: every non-alternative strategy retains
/// `languages[0]`. Generic over `Random` so tests can force deterministic
/// genre/page choices.
pub struct StrategyPlanner<R: Random = ThreadRandom> {
    random: R,
    default_vote_count_min: u32,
}

impl StrategyPlanner<ThreadRandom> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            random: ThreadRandom,
            default_vote_count_min: DEFAULT_VOTE_COUNT_MIN,
        }
    }
}

impl Default for StrategyPlanner<ThreadRandom> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Random> StrategyPlanner<R> {
    #[must_use]
    pub const fn with_random(random: R) -> Self {
        Self {
            random,
            default_vote_count_min: DEFAULT_VOTE_COUNT_MIN,
        }
    }

    /// Override the `voteCountGte` floor used by every strategy except the
    /// deliberately-lowered "voteCountMin=50" fallback.
    #[must_use]
    pub const fn with_default_vote_count_min(mut self, value: u32) -> Self {
        self.default_vote_count_min = value;
        self
    }

    /// Build the ordered strategy list. `min_rating` is the
    /// already-resolved floor the caller wants to start from (FILTERED mode
    /// defaults it to 0, SMART mode to 6).
    pub fn plan(
        &self,
        kind: Kind,
        genres: &[i64],
        languages: &[String],
        min_rating: f64,
    ) -> Vec<Strategy> {
        let sacred_languages = if languages.is_empty() {
            vec!["en".to_string()]
        } else {
            languages.to_vec()
        };
        let sacred = vec![sacred_languages[0].clone()];

        let mut strategies = Vec::new();

        // #1 All filters.
        strategies.push(Strategy {
            name: "All filters".to_string(),
            genre_ids: genres.to_vec(),
            languages: sacred.clone(),
            min_rating,
            sort_by: SortBy::PopularityDesc,
            vote_count_min: self.default_vote_count_min,
            pages: all_pages(),
        });

        // #2 All genres, rating -0.5. Precondition: minRating > 5.5.
        if min_rating > 5.5 {
            strategies.push(Strategy {
                name: "All genres, rating -0.5".to_string(),
                genre_ids: genres.to_vec(),
                languages: sacred.clone(),
                min_rating: (min_rating - 0.5).max(5.5),
                sort_by: SortBy::PopularityDesc,
                vote_count_min: self.default_vote_count_min,
                pages: all_pages(),
            });
        }

        // #3/#4 Two random genres. Precondition: |genres| >= 3.
        if genres.len() >= 3 {
            let (i, j) = self.random.choose_two(genres.len());
            let two_genres = vec![genres[i], genres[j]];

            strategies.push(Strategy {
                name: "2 random genres".to_string(),
                genre_ids: two_genres.clone(),
                languages: sacred.clone(),
                min_rating,
                sort_by: SortBy::PopularityDesc,
                vote_count_min: self.default_vote_count_min,
                pages: all_pages(),
            });

            strategies.push(Strategy {
                name: "2 random genres, rating -1".to_string(),
                genre_ids: two_genres,
                languages: sacred.clone(),
                min_rating: (min_rating - 1.0).max(5.0),
                sort_by: SortBy::PopularityDesc,
                vote_count_min: self.default_vote_count_min,
                pages: all_pages(),
            });
        }

        // #5/#6 Each single genre.
        for &genre_id in genres {
            strategies.push(Strategy {
                name: format!("Single genre {genre_id}"),
                genre_ids: vec![genre_id],
                languages: sacred.clone(),
                min_rating,
                sort_by: SortBy::PopularityDesc,
                vote_count_min: self.default_vote_count_min,
                pages: all_pages(),
            });
        }
        for &genre_id in genres {
            strategies.push(Strategy {
                name: format!("Single genre {genre_id}, rating -1"),
                genre_ids: vec![genre_id],
                languages: sacred.clone(),
                min_rating: (min_rating - 1.0).max(5.0),
                sort_by: SortBy::PopularityDesc,
                vote_count_min: self.default_vote_count_min,
                pages: all_pages(),
            });
        }

        // #7 No genres, keep rating. Precondition: minRating > 0.
        if min_rating > 0.0 {
            strategies.push(Strategy {
                name: "No genres, keep rating".to_string(),
                genre_ids: vec![],
                languages: sacred.clone(),
                min_rating,
                sort_by: SortBy::PopularityDesc,
                vote_count_min: self.default_vote_count_min,
                pages: all_pages(),
            });
        }

        // #8 No genres, rating -1. Floor 5.0.
        strategies.push(Strategy {
            name: "No genres, rating -1".to_string(),
            genre_ids: vec![],
            languages: sacred.clone(),
            min_rating: (min_rating - 1.0).max(5.0),
            sort_by: SortBy::PopularityDesc,
            vote_count_min: self.default_vote_count_min,
            pages: all_pages(),
        });

        // #9 No genres, rating 5.0.
        strategies.push(Strategy {
            name: "No genres, rating 5.0".to_string(),
            genre_ids: vec![],
            languages: sacred.clone(),
            min_rating: 5.0,
            sort_by: SortBy::PopularityDesc,
            vote_count_min: self.default_vote_count_min,
            pages: all_pages(),
        });

        // #10 No genres, no rating floor.
        strategies.push(Strategy {
            name: "No genres, no rating floor".to_string(),
            genre_ids: vec![],
            languages: sacred.clone(),
            min_rating: 0.0,
            sort_by: SortBy::PopularityDesc,
            vote_count_min: self.default_vote_count_min,
            pages: all_pages(),
        });

        // #11 All genres, vote_average.desc, rating -1, voteCountMin=100.
        strategies.push(Strategy {
            name: "All genres, vote_average.desc, rating -1".to_string(),
            genre_ids: genres.to_vec(),
            languages: sacred.clone(),
            min_rating: (min_rating - 1.0).max(5.0),
            sort_by: SortBy::VoteAverageDesc,
            vote_count_min: self.default_vote_count_min,
            pages: all_pages(),
        });

        // #12 All genres, voteCountMin=50, rating -1.
        strategies.push(Strategy {
            name: "All genres, voteCountMin=50, rating -1".to_string(),
            genre_ids: genres.to_vec(),
            languages: sacred,
            min_rating: (min_rating - 1.0).max(5.0),
            sort_by: SortBy::PopularityDesc,
            vote_count_min: 50,
            pages: all_pages(),
        });

        // #13 Alternative languages: for each languages[i], i >= 1.
        for alt_language in sacred_languages.iter().skip(1) {
            strategies.push(Strategy {
                name: format!("Alternative language {alt_language}"),
                genre_ids: genres.to_vec(),
                languages: vec![alt_language.clone()],
                min_rating: (min_rating - 1.0).max(5.0),
                sort_by: SortBy::PopularityDesc,
                vote_count_min: self.default_vote_count_min,
                pages: all_pages(),
            });
        }

        if kind == Kind::Anime {
            for strategy in &mut strategies {
                strategy.languages = vec!["ja".to_string()];
                if !strategy.genre_ids.contains(&ANIMATION_GENRE_ID) {
                    strategy.genre_ids.push(ANIMATION_GENRE_ID);
                }
            }
        }

        strategies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genres3() -> Vec<i64> {
        vec![28, 12, 35]
    }

    fn languages() -> Vec<String> {
        vec!["en".to_string()]
    }

    #[test]
    fn test_first_strategy_uses_sacred_language() {
        let planner = StrategyPlanner::with_random(FixedRandom::default());
        let strategies = planner.plan(Kind::Movie, &genres3(), &languages(), 7.0);
        assert_eq!(strategies[0].original_language(), "en");
    }

    #[test]
    fn test_empty_languages_default_to_en() {
        let planner = StrategyPlanner::with_random(FixedRandom::default());
        let strategies = planner.plan(Kind::Movie, &genres3(), &[], 7.0);
        assert_eq!(strategies[0].original_language(), "en");
    }

    #[test]
    fn test_rating_floor_never_undercut() {
        let planner = StrategyPlanner::with_random(FixedRandom::default());
        let strategies = planner.plan(Kind::Movie, &genres3(), &languages(), 5.2);
        assert!(strategies.iter().all(|s| s.min_rating >= 5.0));
    }

    #[test]
    fn test_two_random_genres_requires_at_least_three() {
        let planner = StrategyPlanner::with_random(FixedRandom::default());
        let strategies = planner.plan(Kind::Movie, &[28, 12], &languages(), 7.0);
        assert!(!strategies.iter().any(|s| s.name == "2 random genres"));
    }

    #[test]
    fn test_vote_count_min_defaults_and_strategy_12_lowers_it() {
        let planner = StrategyPlanner::with_random(FixedRandom::default());
        let strategies = planner.plan(Kind::Movie, &genres3(), &languages(), 7.0);
        assert_eq!(strategies[0].vote_count_min, 100);
        let strategy_12 = strategies
            .iter()
            .find(|s| s.name == "All genres, voteCountMin=50, rating -1")
            .unwrap();
        assert_eq!(strategy_12.vote_count_min, 50);
    }

    #[test]
    fn test_alternative_languages_override_sacred() {
        let planner = StrategyPlanner::with_random(FixedRandom::default());
        let langs = vec!["bn".to_string(), "en".to_string()];
        let strategies = planner.plan(Kind::Movie, &genres3(), &langs, 8.0);
        let alt = strategies
            .iter()
            .find(|s| s.name == "Alternative language en")
            .unwrap();
        assert_eq!(alt.languages, vec!["en".to_string()]);

        // earlier strategies must still carry the sacred language
        assert!(strategies
            .iter()
            .take_while(|s| s.name != "Alternative language en")
            .all(|s| s.original_language() == "bn"));
    }

    #[test]
    fn test_anime_forces_japanese_and_animation_genre() {
        let planner = StrategyPlanner::with_random(FixedRandom::default());
        let strategies = planner.plan(Kind::Anime, &genres3(), &languages(), 7.0);
        assert!(strategies
            .iter()
            .all(|s| s.original_language() == "ja" && s.genre_ids.contains(&ANIMATION_GENRE_ID)));
    }
}
