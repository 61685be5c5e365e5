//! `Recommender`: orchestrates `StrategyPlanner`, `CatalogAdapter`,
//! `TTLCache`, and `CandidateFilter` into one pick, and dispatches learning
//! updates on recorded actions.

pub mod outcome;

pub use outcome::{Attribution, FilteredOverlay, Mode, RecommendationOutcome};

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use crate::cache::{create_key, QueryFingerprint, TtlCache};
use crate::catalog::{CatalogSource, DiscoverParams};
use crate::models::history::{Action, Source};
use crate::models::media::{CatalogPage, Kind, MediaItem};
use crate::models::strategy::Strategy;
use crate::models::UserId;
use crate::planner::{Random, StrategyPlanner, ThreadRandom};
use crate::store::{entry_for_action, HistoryStore, ProfileStore, WeightStore, WeightUpdateInput};
use crate::{Error, Result};

/// SMART mode's default rating floor when the profile doesn't set one:
/// `minRating = profile.minRating ∨ 6`.
const SMART_DEFAULT_MIN_RATING: f64 = 6.0;

/// FILTERED mode's default rating floor: `minRating = overlay.minRating ∨ 0`.
const FILTERED_DEFAULT_MIN_RATING: f64 = 0.0;

/// Most-recent-N history actions consulted for diversity reordering — the
/// most recent 3 distinct actions' kinds.
const DIVERSITY_WINDOW: u32 = 3;

/// Wires the profile, history, weight, and catalog collaborators into a
/// single `recommend`/`record_action` surface. Generic over `Random` so
/// tests can force deterministic strategy/candidate choices; production
/// callers use the `ThreadRandom`-specialized constructor.
pub struct Recommender<R: Random + Clone = ThreadRandom> {
    catalog: Arc<dyn CatalogSource>,
    discover_cache: Arc<TtlCache<CatalogPage>>,
    discover_ttl: Duration,
    profile_store: Arc<dyn ProfileStore>,
    history_store: Arc<dyn HistoryStore>,
    weight_store: Arc<dyn WeightStore>,
    planner: StrategyPlanner<R>,
    random: R,
}

impl Recommender<ThreadRandom> {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        discover_cache: Arc<TtlCache<CatalogPage>>,
        discover_ttl: Duration,
        profile_store: Arc<dyn ProfileStore>,
        history_store: Arc<dyn HistoryStore>,
        weight_store: Arc<dyn WeightStore>,
    ) -> Self {
        Self::with_random(
            catalog,
            discover_cache,
            discover_ttl,
            profile_store,
            history_store,
            weight_store,
            ThreadRandom,
        )
    }
}

impl<R: Random + Clone> Recommender<R> {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn with_random(
        catalog: Arc<dyn CatalogSource>,
        discover_cache: Arc<TtlCache<CatalogPage>>,
        discover_ttl: Duration,
        profile_store: Arc<dyn ProfileStore>,
        history_store: Arc<dyn HistoryStore>,
        weight_store: Arc<dyn WeightStore>,
        random: R,
    ) -> Self {
        Self {
            catalog,
            discover_cache,
            discover_ttl,
            profile_store,
            history_store,
            weight_store,
            planner: StrategyPlanner::with_random(random.clone()),
            random,
        }
    }

    /// Override the `voteCountGte` floor the planner applies to every
    /// strategy except its deliberately-lowered fallback.
    #[must_use]
    pub fn with_default_vote_count_min(mut self, value: u32) -> Self {
        self.planner = self.planner.with_default_vote_count_min(value);
        self
    }

    /// Produce one recommendation for `user_id` under the given mode and
    /// overlay, returning the outcome variant describing what happened.
    pub async fn recommend(
        &self,
        user_id: &UserId,
        mode: Mode,
        overlay: FilteredOverlay,
    ) -> Result<RecommendationOutcome> {
        let (kind_order, genres, languages, min_rating) = match mode {
            Mode::Filtered => self.resolve_filtered(overlay)?,
            Mode::Smart => match self.resolve_smart(user_id).await? {
                Some(resolved) => resolved,
                None => return Ok(RecommendationOutcome::ProfileIncomplete),
            },
        };

        // Blacklist gates eligibility at every page; unlike diversity
        // reordering and weight-based kind ordering, this read is not
        // allowed to degrade silently, so a failure here is a required-read
        // `StoreError`.
        let blacklist = self
            .history_store
            .blacklist(user_id)
            .await
            .map_err(|_| Error::StoreError("failed to load blacklist".to_string()))?;

        for kind in kind_order {
            let strategies = self.planner.plan(kind, &genres, &languages, min_rating);
            for strategy in strategies {
                for &page in &strategy.pages {
                    match self.fetch_page(kind, &strategy, page).await {
                        Some(catalog_page) => {
                            let survivors = crate::filter::CandidateFilter::<R>::exclude_blacklisted(
                                catalog_page.results,
                                &blacklist,
                            );
                            let filter = crate::filter::CandidateFilter::new(&self.random);
                            if let Some(item) = filter.choose(&survivors) {
                                return Ok(RecommendationOutcome::Found(
                                    item.clone(),
                                    Attribution {
                                        strategy_name: strategy.name.clone(),
                                        strategy_genres: strategy.genre_ids.clone(),
                                        strategy_languages: strategy.languages.clone(),
                                        kind,
                                    },
                                ));
                            }
                        }
                        None => return Ok(RecommendationOutcome::ExternalUnavailable),
                    }
                }
            }
        }

        Ok(RecommendationOutcome::NoResult)
    }

    fn resolve_filtered(
        &self,
        overlay: FilteredOverlay,
    ) -> Result<(Vec<Kind>, Vec<i64>, Vec<String>, f64)> {
        let kind = overlay
            .kind
            .ok_or_else(|| Error::InvalidRequest("FILTERED mode requires kind".to_string()))?;
        let languages = vec![overlay.language.unwrap_or_else(|| "en".to_string())];
        let min_rating = overlay.min_rating.unwrap_or(FILTERED_DEFAULT_MIN_RATING);
        Ok((vec![kind], overlay.genres, languages, min_rating))
    }

    async fn resolve_smart(
        &self,
        user_id: &UserId,
    ) -> Result<Option<(Vec<Kind>, Vec<i64>, Vec<String>, f64)>> {
        // Profile absence/incompleteness is not a degrade case — it is the
        // `ProfileIncomplete` outcome itself. A store failure here is a
        // required read, so it propagates via `?`.
        let profile = self.profile_store.find_by_user_id(user_id).await?;
        let profile = match profile {
            Some(profile) if profile.is_usable() => profile,
            _ => return Ok(None),
        };

        let mut kind_order = profile.content_types.clone();

        // Weight-based ordering degrades silently on a weight-store read
        // failure.
        if let Ok(Some(weights)) = self.weight_store.get(user_id).await {
            kind_order.sort_by(|a, b| weights.kind_weight(b.as_str()).cmp(&weights.kind_weight(a.as_str())));
        }

        // Diversity adjustment degrades silently on a history-store read
        // failure.
        if let Ok(recent) = self.history_store.recent_actions(user_id, DIVERSITY_WINDOW).await {
            let recent_set: HashSet<Kind> = recent.into_iter().collect();
            if !recent_set.is_empty() {
                let (not_recent, recent_kinds): (Vec<Kind>, Vec<Kind>) =
                    kind_order.into_iter().partition(|k| !recent_set.contains(k));
                kind_order = not_recent.into_iter().chain(recent_kinds).collect();
            }
        }

        let languages = profile.languages.clone();
        let genres = profile.genres.clone();
        let min_rating = profile.min_rating.unwrap_or(SMART_DEFAULT_MIN_RATING);
        Ok(Some((kind_order, genres, languages, min_rating)))
    }

    /// Fetch one `(kind, strategy, page)` tuple through the discover cache.
    /// Returns `None` when the external catalog is unavailable — the cache
    /// layer itself cannot fail independently of its producer, so falling
    /// back to treating the whole lookup as unavailable is inherent here
    /// rather than a separate code path.
    async fn fetch_page(&self, kind: Kind, strategy: &Strategy, page: u32) -> Option<CatalogPage> {
        let key = cache_key(kind, strategy, page);
        let params = build_params(strategy, page);
        let catalog = Arc::clone(&self.catalog);
        let ttl = self.discover_ttl;

        let result = self
            .discover_cache
            .get_or_compute(&key, ttl, || async move {
                catalog.discover(kind, &params).await.map_err(|e| e.to_string())
            })
            .await;

        match result {
            Ok(page) => Some(page),
            Err(err) => {
                warn!(error = %err, ?kind, strategy = %strategy.name, page, "catalog discover failed");
                None
            }
        }
    }

    /// Record a user action against an item and, if the action is a signal
    /// worth learning from, dispatch an async weight update.
    pub async fn record_action(
        &self,
        user_id: &UserId,
        action: Action,
        item: &MediaItem,
        source: Source,
    ) -> Result<()> {
        let entry = entry_for_action(user_id.clone(), item, action, source);
        self.history_store.upsert(&entry).await?;

        if action.triggers_weight_update() {
            let weight_store = Arc::clone(&self.weight_store);
            let user_id = user_id.clone();
            let input = WeightUpdateInput {
                genre_ids: item.genre_ids.clone(),
                kind: item.kind.as_str(),
                language: item.original_language.clone(),
            };
            // Weight write failures log; they must not propagate to the
            // caller's action-recording completion.
            tokio::spawn(async move {
                if let Err(err) = weight_store.update_on_action(&user_id, action, &input).await {
                    warn!(error = %err, %user_id, "weight update failed");
                }
            });
        }

        Ok(())
    }

    /// Optional cache warmup hook; a no-op is an acceptable implementation.
    pub async fn warm_cache(&self) {}
}

fn build_params(strategy: &Strategy, page: u32) -> DiscoverParams {
    DiscoverParams::new(strategy.original_language())
        .with_genres(&strategy.genre_ids)
        .with_min_rating(strategy.min_rating)
        .with_vote_count_gte(strategy.vote_count_min)
        .with_sort_by(strategy.sort_by)
        .with_page(page)
}

fn cache_key(kind: Kind, strategy: &Strategy, page: u32) -> QueryFingerprint {
    let mut params: BTreeMap<String, Value> = BTreeMap::new();
    params.insert("kind".to_string(), Value::String(kind.as_str().to_string()));
    params.insert(
        "genreIds".to_string(),
        Value::Array(strategy.genre_ids.iter().map(|g| Value::from(*g)).collect()),
    );
    params.insert(
        "languages".to_string(),
        Value::Array(strategy.languages.iter().map(|l| Value::String(l.clone())).collect()),
    );
    params.insert("minRating".to_string(), Value::from(strategy.min_rating));
    params.insert(
        "sortBy".to_string(),
        Value::String(strategy.sort_by.as_query_value().to_string()),
    );
    params.insert("voteCountMin".to_string(), Value::from(strategy.vote_count_min));
    params.insert("page".to_string(), Value::from(page));
    create_key("discover", &params)
}
