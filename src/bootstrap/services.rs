//! Service initialization and dependency injection.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tracing::info;

use crate::cache::{spawn_sweeper, TtlCache};
use crate::catalog::CatalogAdapter;
use crate::models::media::CatalogPage;
use crate::recommender::Recommender;
use crate::store::{PostgresHistoryStore, PostgresProfileStore, PostgresWeightStore};
use crate::Config;

/// Container for the fully-wired recommendation core.
#[derive(Clone)]
pub struct Services {
    pub recommender: Arc<Recommender>,
}

/// Initialize the discover cache, the three Postgres-backed stores, the
/// catalog adapter, and the `Recommender` that ties them together.
pub async fn init_services(pool: PgPool, config: &Config) -> Result<Services, anyhow::Error> {
    info!("initializing services...");

    let discover_cache: Arc<TtlCache<CatalogPage>> =
        Arc::new(TtlCache::new(config.cache.max_size));
    let sweep_interval = Duration::from_secs(config.cache.sweep_interval_seconds);
    spawn_sweeper(discover_cache.clone(), sweep_interval);
    info!(
        max_size = config.cache.max_size,
        sweep_interval_seconds = config.cache.sweep_interval_seconds,
        "discover cache initialized"
    );

    let catalog = Arc::new(CatalogAdapter::new(&config.catalog, &config.rate_limit, &config.cache));
    info!(base_url = %config.catalog.base_url, "catalog adapter initialized");

    let profile_store = Arc::new(PostgresProfileStore::new(pool.clone()));
    let history_store = Arc::new(PostgresHistoryStore::new(pool.clone()));
    let weight_store = Arc::new(PostgresWeightStore::new(pool.clone()));
    info!("profile/history/weight stores initialized");

    let discover_ttl = Duration::from_secs(config.cache.discover_ttl_seconds);
    let recommender = Arc::new(
        Recommender::new(
            catalog,
            discover_cache,
            discover_ttl,
            profile_store,
            history_store,
            weight_store,
        )
        .with_default_vote_count_min(config.catalog.default_vote_count_min),
    );
    info!("recommender initialized");

    Ok(Services { recommender })
}
