//! `WeightStore`: per-user learned preference weights.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::models::history::Action;
use crate::models::weights::{clamp_weight, DISLIKE_DELTA, LIKE_DELTA};
use crate::models::{PreferenceWeights, UserId};
use crate::transaction::UnitOfWork;
use crate::Result;

/// The `{genreIds, kind, language}` tuple `WeightStore::update_on_action`
/// accepts.
#[derive(Debug, Clone)]
pub struct WeightUpdateInput {
    pub genre_ids: Vec<i64>,
    pub kind: &'static str,
    pub language: String,
}

/// Collaborator interface consumed by the core.
#[async_trait]
pub trait WeightStore: Send + Sync {
    async fn get(&self, user_id: &UserId) -> Result<Option<PreferenceWeights>>;
    async fn update_on_action(
        &self,
        user_id: &UserId,
        action: Action,
        input: &WeightUpdateInput,
    ) -> Result<()>;
}

/// Postgres-backed reference implementation. The read-modify-write happens
/// inside a single `UnitOfWork` transaction (`SELECT ... FOR UPDATE` then
/// `UPDATE`), giving an atomic read-modify-write per `userId` without an
/// application-level per-user lock (see DESIGN.md).
#[derive(Clone)]
pub struct PostgresWeightStore {
    pool: PgPool,
}

impl PostgresWeightStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_weights(row: PgRow) -> Result<PreferenceWeights> {
        let genre_weights_json: serde_json::Value = row.try_get("genre_weights")?;
        let kind_weights_json: serde_json::Value = row.try_get("kind_weights")?;
        let language_weights_json: serde_json::Value = row.try_get("language_weights")?;

        Ok(PreferenceWeights {
            user_id: UserId::from_string(row.try_get("user_id")?),
            genre_weights: serde_json::from_value(genre_weights_json).unwrap_or_default(),
            kind_weights: serde_json::from_value(kind_weights_json).unwrap_or_default(),
            language_weights: serde_json::from_value(language_weights_json).unwrap_or_default(),
            total_likes: row.try_get::<i64, _>("total_likes")? as u64,
            total_dislikes: row.try_get::<i64, _>("total_dislikes")? as u64,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl WeightStore for PostgresWeightStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<PreferenceWeights>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, genre_weights, kind_weights, language_weights, total_likes, total_dislikes, updated_at
            FROM preference_weights
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_weights).transpose()
    }

    async fn update_on_action(
        &self,
        user_id: &UserId,
        action: Action,
        input: &WeightUpdateInput,
    ) -> Result<()> {
        let delta = match action {
            Action::Liked => LIKE_DELTA,
            Action::Disliked => DISLIKE_DELTA,
            _ => return Ok(()), // only LIKED/DISLIKED trigger weight updates
        };

        let mut uow = UnitOfWork::begin(&self.pool).await?;

        let existing = sqlx::query(
            r#"
            SELECT genre_weights, kind_weights, language_weights, total_likes, total_dislikes
            FROM preference_weights
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&mut **uow.transaction())
        .await?;

        let mut weights = match existing {
            Some(row) => {
                let genre_weights: serde_json::Value = row.try_get("genre_weights")?;
                let kind_weights: serde_json::Value = row.try_get("kind_weights")?;
                let language_weights: serde_json::Value = row.try_get("language_weights")?;
                PreferenceWeights {
                    user_id: user_id.clone(),
                    genre_weights: serde_json::from_value(genre_weights).unwrap_or_default(),
                    kind_weights: serde_json::from_value(kind_weights).unwrap_or_default(),
                    language_weights: serde_json::from_value(language_weights).unwrap_or_default(),
                    total_likes: row.try_get::<i64, _>("total_likes")? as u64,
                    total_dislikes: row.try_get::<i64, _>("total_dislikes")? as u64,
                    updated_at: Utc::now(),
                }
            }
            None => PreferenceWeights::new(user_id.clone()),
        };

        for genre_id in &input.genre_ids {
            let current = weights.genre_weight(*genre_id);
            weights.genre_weights.insert(*genre_id, clamp_weight(current, delta));
        }
        let current_kind = weights.kind_weight(input.kind);
        weights
            .kind_weights
            .insert(input.kind.to_string(), clamp_weight(current_kind, delta));
        let current_lang = weights.language_weight(&input.language);
        weights
            .language_weights
            .insert(input.language.clone(), clamp_weight(current_lang, delta));

        match action {
            Action::Liked => weights.total_likes += 1,
            Action::Disliked => weights.total_dislikes += 1,
            _ => unreachable!("filtered above"),
        }
        weights.updated_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO preference_weights
                (user_id, genre_weights, kind_weights, language_weights, total_likes, total_dislikes, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO UPDATE SET
                genre_weights = EXCLUDED.genre_weights,
                kind_weights = EXCLUDED.kind_weights,
                language_weights = EXCLUDED.language_weights,
                total_likes = EXCLUDED.total_likes,
                total_dislikes = EXCLUDED.total_dislikes,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id.as_str())
        .bind(serde_json::to_value(&weights.genre_weights).unwrap_or_default())
        .bind(serde_json::to_value(&weights.kind_weights).unwrap_or_default())
        .bind(serde_json::to_value(&weights.language_weights).unwrap_or_default())
        .bind(weights.total_likes as i64)
        .bind(weights.total_dislikes as i64)
        .bind(weights.updated_at)
        .execute(&mut **uow.transaction())
        .await?;

        uow.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_update_input_shape() {
        let input = WeightUpdateInput {
            genre_ids: vec![28, 12],
            kind: "MOVIE",
            language: "en".to_string(),
        };
        assert_eq!(input.genre_ids.len(), 2);
    }
}
