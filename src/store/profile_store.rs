//! `ProfileStore`: per-user durable taste profile.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::models::media::Kind;
use crate::models::{TasteProfile, UserId};
use crate::Result;

/// Collaborator interface consumed by the core.
///
/// Uniqueness of `userId` is the only cross-record invariant the store must
/// enforce.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<TasteProfile>>;
    async fn upsert(&self, profile: &TasteProfile) -> Result<()>;
}

/// Postgres-backed reference implementation: a pool-holding repository
/// with typed row mapping and constraint-aware error translation.
#[derive(Clone)]
pub struct PostgresProfileStore {
    pool: PgPool,
}

impl PostgresProfileStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_profile(row: PgRow) -> Result<TasteProfile> {
        let content_types: Vec<String> = row.try_get("content_types")?;
        let languages: Vec<String> = row.try_get("languages")?;
        let genres: Vec<i64> = row.try_get("genres")?;

        Ok(TasteProfile {
            user_id: UserId::from_string(row.try_get("user_id")?),
            content_types: content_types
                .into_iter()
                .filter_map(|k| parse_kind(&k))
                .collect(),
            genres,
            languages,
            min_rating: row.try_get("min_rating")?,
            anime_auto_language: row.try_get("anime_auto_language")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

fn parse_kind(s: &str) -> Option<Kind> {
    match s {
        "MOVIE" => Some(Kind::Movie),
        "SERIES" => Some(Kind::Series),
        "ANIME" => Some(Kind::Anime),
        _ => None,
    }
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<TasteProfile>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, content_types, genres, languages, min_rating,
                   anime_auto_language, created_at, updated_at
            FROM taste_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_profile).transpose()
    }

    async fn upsert(&self, profile: &TasteProfile) -> Result<()> {
        let content_types: Vec<&'static str> =
            profile.content_types.iter().map(|k| k.as_str()).collect();

        sqlx::query(
            r#"
            INSERT INTO taste_profiles
                (user_id, content_types, genres, languages, min_rating, anime_auto_language, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO UPDATE SET
                content_types = EXCLUDED.content_types,
                genres = EXCLUDED.genres,
                languages = EXCLUDED.languages,
                min_rating = EXCLUDED.min_rating,
                anime_auto_language = EXCLUDED.anime_auto_language,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(profile.user_id.as_str())
        .bind(&content_types)
        .bind(&profile.genres)
        .bind(&profile.languages)
        .bind(profile.min_rating)
        .bind(profile.anime_auto_language)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_roundtrip() {
        assert_eq!(parse_kind("MOVIE"), Some(Kind::Movie));
        assert_eq!(parse_kind("ANIME"), Some(Kind::Anime));
        assert_eq!(parse_kind("unknown"), None);
    }
}
