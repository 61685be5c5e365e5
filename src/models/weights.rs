use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Default weight assigned to a genre/kind/language the user has never
/// liked or disliked.
pub const DEFAULT_WEIGHT: i32 = 50;

/// Amount added to each dimension's weight on `LIKED`.
pub const LIKE_DELTA: i32 = 5;

/// Amount subtracted from each dimension's weight on `DISLIKED`.
pub const DISLIKE_DELTA: i32 = -3;

/// Durable per-user learned preference weights.
///
/// Each mapping's values are clamped to `[0, 100]`; absent keys default to
/// `DEFAULT_WEIGHT` when read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceWeights {
    pub user_id: UserId,
    pub genre_weights: HashMap<i64, i32>,
    pub kind_weights: HashMap<String, i32>,
    pub language_weights: HashMap<String, i32>,
    pub total_likes: u64,
    pub total_dislikes: u64,
    pub updated_at: DateTime<Utc>,
}

impl PreferenceWeights {
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            genre_weights: HashMap::new(),
            kind_weights: HashMap::new(),
            language_weights: HashMap::new(),
            total_likes: 0,
            total_dislikes: 0,
            updated_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn genre_weight(&self, genre_id: i64) -> i32 {
        self.genre_weights
            .get(&genre_id)
            .copied()
            .unwrap_or(DEFAULT_WEIGHT)
    }

    #[must_use]
    pub fn kind_weight(&self, kind: &str) -> i32 {
        self.kind_weights.get(kind).copied().unwrap_or(DEFAULT_WEIGHT)
    }

    #[must_use]
    pub fn language_weight(&self, language: &str) -> i32 {
        self.language_weights
            .get(language)
            .copied()
            .unwrap_or(DEFAULT_WEIGHT)
    }
}

/// Clamp a weight delta application to `[0, 100]`.
#[must_use]
pub fn clamp_weight(current: i32, delta: i32) -> i32 {
    (current + delta).clamp(0, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        let weights = PreferenceWeights::new("u1".into());
        assert_eq!(weights.genre_weight(28), DEFAULT_WEIGHT);
        assert_eq!(weights.kind_weight("MOVIE"), DEFAULT_WEIGHT);
        assert_eq!(weights.language_weight("en"), DEFAULT_WEIGHT);
    }

    #[test]
    fn test_explicit_weight_read() {
        let mut weights = PreferenceWeights::new("u1".into());
        weights.genre_weights.insert(28, 55);
        assert_eq!(weights.genre_weight(28), 55);
    }

    #[test]
    fn test_clamp_weight_bounds() {
        assert_eq!(clamp_weight(98, LIKE_DELTA), 100);
        assert_eq!(clamp_weight(1, DISLIKE_DELTA), 0);
        assert_eq!(clamp_weight(50, LIKE_DELTA), 55);
        assert_eq!(clamp_weight(50, DISLIKE_DELTA), 47);
    }
}
