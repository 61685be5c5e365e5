use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::UserId;
use super::media::Kind;

/// States of the per-`(user, catalogId, kind)` history state machine.
/// Transitions are total: any action overwrites the prior one for the
/// same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Watched,
    Skipped,
    Liked,
    Disliked,
    /// Not terminal as a data state, but terminal for recommendation
    /// eligibility.
    Blacklisted,
}

impl Action {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Watched => "WATCHED",
            Self::Skipped => "SKIPPED",
            Self::Liked => "LIKED",
            Self::Disliked => "DISLIKED",
            Self::Blacklisted => "BLACKLISTED",
        }
    }

    /// Whether this action should enqueue a weight update.
    #[must_use]
    pub const fn triggers_weight_update(self) -> bool {
        matches!(self, Self::Liked | Self::Disliked)
    }
}

/// Which pipeline produced the recommendation a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Source {
    Filtered,
    Smart,
}

/// Per-`(userId, catalogId, kind)` recommendation action record. An
/// upsert by key replaces the prior action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub user_id: UserId,
    pub catalog_id: i64,
    pub kind: Kind,
    pub title: String,
    pub action: Action,
    pub poster_path: Option<String>,
    pub rating: Option<f64>,
    pub release_date: Option<String>,
    pub source: Source,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HistoryEntry {
    #[must_use]
    pub const fn is_blacklisted(&self) -> bool {
        matches!(self.action, Action::Blacklisted)
    }
}

/// Filter accepted by `HistoryStore::list_by_user`.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub action: Option<Action>,
    pub limit: u32,
    pub skip: u32,
}

/// Result of `HistoryStore::list_by_user`.
#[derive(Debug, Clone, Default)]
pub struct HistoryPage {
    pub items: Vec<HistoryEntry>,
    pub total: u64,
    pub has_more: bool,
}

/// Aggregated per-user history stats.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregatedStats {
    pub total_watched: u64,
    pub total_liked: u64,
    pub total_disliked: u64,
    pub total_blacklisted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_triggers_weight_update() {
        assert!(Action::Liked.triggers_weight_update());
        assert!(Action::Disliked.triggers_weight_update());
        assert!(!Action::Watched.triggers_weight_update());
        assert!(!Action::Skipped.triggers_weight_update());
        assert!(!Action::Blacklisted.triggers_weight_update());
    }

    #[test]
    fn test_is_blacklisted() {
        let entry = HistoryEntry {
            user_id: "u1".into(),
            catalog_id: 1,
            kind: Kind::Movie,
            title: "Example".to_string(),
            action: Action::Blacklisted,
            poster_path: None,
            rating: None,
            release_date: None,
            source: Source::Smart,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(entry.is_blacklisted());
    }
}
