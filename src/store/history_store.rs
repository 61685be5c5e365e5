//! `HistoryStore`: persisted per-user recommendation actions.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::models::history::{Action, AggregatedStats, HistoryEntry, HistoryFilter, HistoryPage, Source};
use crate::models::media::Kind;
use crate::models::UserId;
use crate::Result;

/// Collaborator interface consumed by the core.
///
/// Uniqueness of `(userId, catalogId, kind)` is the cross-record invariant
/// the store must enforce.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn upsert(&self, entry: &HistoryEntry) -> Result<()>;
    async fn list_by_user(&self, user_id: &UserId, filter: &HistoryFilter) -> Result<HistoryPage>;
    async fn blacklist(&self, user_id: &UserId) -> Result<HashSet<(i64, Kind)>>;
    /// Most recent `n` distinct-action kinds, used for diversity
    /// adjustment.
    async fn recent_actions(&self, user_id: &UserId, n: u32) -> Result<Vec<Kind>>;
    async fn stats(&self, user_id: &UserId) -> Result<AggregatedStats>;
}

/// Postgres-backed reference implementation: a pool-holding repository
/// with paginated list queries.
#[derive(Clone)]
pub struct PostgresHistoryStore {
    pool: PgPool,
}

impl PostgresHistoryStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: PgRow) -> Result<HistoryEntry> {
        Ok(HistoryEntry {
            user_id: UserId::from_string(row.try_get("user_id")?),
            catalog_id: row.try_get("catalog_id")?,
            kind: parse_kind(&row.try_get::<String, _>("kind")?),
            title: row.try_get("title")?,
            action: parse_action(&row.try_get::<String, _>("action")?),
            poster_path: row.try_get("poster_path")?,
            rating: row.try_get("rating")?,
            release_date: row.try_get("release_date")?,
            source: parse_source(&row.try_get::<String, _>("source")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

fn parse_kind(s: &str) -> Kind {
    match s {
        "SERIES" => Kind::Series,
        "ANIME" => Kind::Anime,
        _ => Kind::Movie,
    }
}

fn parse_action(s: &str) -> Action {
    match s {
        "SKIPPED" => Action::Skipped,
        "LIKED" => Action::Liked,
        "DISLIKED" => Action::Disliked,
        "BLACKLISTED" => Action::Blacklisted,
        _ => Action::Watched,
    }
}

fn parse_source(s: &str) -> Source {
    if s == "SMART" {
        Source::Smart
    } else {
        Source::Filtered
    }
}

#[async_trait]
impl HistoryStore for PostgresHistoryStore {
    async fn upsert(&self, entry: &HistoryEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO history_entries
                (user_id, catalog_id, kind, title, action, poster_path, rating, release_date, source, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (user_id, catalog_id, kind) DO UPDATE SET
                action = EXCLUDED.action,
                title = EXCLUDED.title,
                poster_path = EXCLUDED.poster_path,
                rating = EXCLUDED.rating,
                release_date = EXCLUDED.release_date,
                source = EXCLUDED.source,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(entry.user_id.as_str())
        .bind(entry.catalog_id)
        .bind(entry.kind.as_str())
        .bind(&entry.title)
        .bind(entry.action.as_str())
        .bind(&entry.poster_path)
        .bind(entry.rating)
        .bind(&entry.release_date)
        .bind(match entry.source {
            Source::Filtered => "FILTERED",
            Source::Smart => "SMART",
        })
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_by_user(&self, user_id: &UserId, filter: &HistoryFilter) -> Result<HistoryPage> {
        let action_filter = filter.action.map(Action::as_str);

        let rows = sqlx::query(
            r#"
            SELECT user_id, catalog_id, kind, title, action, poster_path, rating, release_date, source, created_at, updated_at
            FROM history_entries
            WHERE user_id = $1 AND ($2::text IS NULL OR action = $2)
            ORDER BY updated_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id.as_str())
        .bind(action_filter)
        .bind(i64::from(filter.limit))
        .bind(i64::from(filter.skip))
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM history_entries
            WHERE user_id = $1 AND ($2::text IS NULL OR action = $2)
            "#,
        )
        .bind(user_id.as_str())
        .bind(action_filter)
        .fetch_one(&self.pool)
        .await?;

        let items: Result<Vec<HistoryEntry>> = rows.into_iter().map(Self::row_to_entry).collect();
        let items = items?;
        let total = total as u64;
        let has_more = u64::from(filter.skip) + (items.len() as u64) < total;

        Ok(HistoryPage {
            items,
            total,
            has_more,
        })
    }

    async fn blacklist(&self, user_id: &UserId) -> Result<HashSet<(i64, Kind)>> {
        let rows = sqlx::query(
            r#"
            SELECT catalog_id, kind FROM history_entries
            WHERE user_id = $1 AND action = 'BLACKLISTED'
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let catalog_id: i64 = row.try_get("catalog_id").unwrap_or_default();
                let kind: String = row.try_get("kind").unwrap_or_default();
                (catalog_id, parse_kind(&kind))
            })
            .collect())
    }

    async fn recent_actions(&self, user_id: &UserId, n: u32) -> Result<Vec<Kind>> {
        let rows = sqlx::query(
            r#"
            SELECT kind FROM history_entries
            WHERE user_id = $1
            ORDER BY updated_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(i64::from(n))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| parse_kind(&row.try_get::<String, _>("kind").unwrap_or_default()))
            .collect())
    }

    async fn stats(&self, user_id: &UserId) -> Result<AggregatedStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE action = 'WATCHED') AS total_watched,
                COUNT(*) FILTER (WHERE action = 'LIKED') AS total_liked,
                COUNT(*) FILTER (WHERE action = 'DISLIKED') AS total_disliked,
                COUNT(*) FILTER (WHERE action = 'BLACKLISTED') AS total_blacklisted
            FROM history_entries
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(AggregatedStats {
            total_watched: row.try_get::<i64, _>("total_watched")? as u64,
            total_liked: row.try_get::<i64, _>("total_liked")? as u64,
            total_disliked: row.try_get::<i64, _>("total_disliked")? as u64,
            total_blacklisted: row.try_get::<i64, _>("total_blacklisted")? as u64,
        })
    }
}

/// Build a `HistoryEntry` ready for `upsert`, carrying forward a
/// `MediaItem`'s display metadata along with the new action and timestamp.
#[must_use]
pub fn entry_for_action(
    user_id: UserId,
    item: &crate::models::MediaItem,
    action: Action,
    source: Source,
) -> HistoryEntry {
    let now = Utc::now();
    HistoryEntry {
        user_id,
        catalog_id: item.catalog_id,
        kind: item.kind,
        title: item.title.clone(),
        action,
        poster_path: item.poster_path.clone(),
        rating: item.rating,
        release_date: item.release_date.clone(),
        source,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action_roundtrip() {
        assert_eq!(parse_action("LIKED"), Action::Liked);
        assert_eq!(parse_action("BLACKLISTED"), Action::Blacklisted);
        assert_eq!(parse_action("unknown"), Action::Watched);
    }

    #[test]
    fn test_entry_for_action_carries_forward_metadata() {
        let item = crate::models::MediaItem {
            catalog_id: 1,
            kind: Kind::Movie,
            title: "Example".to_string(),
            overview: None,
            poster_path: Some("poster.jpg".to_string()),
            backdrop_path: None,
            release_date: Some("2020".to_string()),
            rating: Some(7.5),
            vote_count: Some(200),
            genre_ids: vec![28],
            original_language: "en".to_string(),
        };
        let entry = entry_for_action("u1".into(), &item, Action::Liked, Source::Smart);
        assert_eq!(entry.title, "Example");
        assert_eq!(entry.poster_path, Some("poster.jpg".to_string()));
        assert_eq!(entry.action, Action::Liked);
    }
}
