//! External catalog adapter.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backon::{ConstantBuilder, Retryable};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::cache::{create_key, QueryFingerprint, TtlCache};
use crate::config::{CacheConfig, CatalogConfig, RateLimitConfig};
use crate::models::media::{Kind, MediaItem, Page};
use crate::resilience::retry::CATALOG_RETRY_DELAY;
use crate::resilience::timeout::CATALOG_REQUEST_TIMEOUT;

use super::error::CatalogError;
use super::params::DiscoverParams;
use super::rate_limiter::RateLimiter;

/// External animation genre id, unioned into `withGenres` for anime
/// discovery.
pub const ANIMATION_GENRE_ID: i64 = 16;

#[derive(Debug, Deserialize)]
struct RawPage<T> {
    results: Vec<T>,
    page: u32,
    total_pages: u32,
    total_results: u64,
}

/// Movie payload shape: `title`/`release_date`.
#[derive(Debug, Deserialize)]
struct RawMovie {
    id: i64,
    title: String,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    release_date: Option<String>,
    vote_average: Option<f64>,
    vote_count: Option<u32>,
    genre_ids: Vec<i64>,
    original_language: String,
}

/// Series payload shape: `name`/`first_air_date`.
#[derive(Debug, Deserialize)]
struct RawSeries {
    id: i64,
    name: String,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    first_air_date: Option<String>,
    vote_average: Option<f64>,
    vote_count: Option<u32>,
    genre_ids: Vec<i64>,
    original_language: String,
}

impl RawMovie {
    fn into_media_item(self) -> MediaItem {
        MediaItem {
            catalog_id: self.id,
            kind: Kind::Movie,
            title: self.title,
            overview: self.overview,
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            release_date: self.release_date,
            rating: self.vote_average,
            vote_count: self.vote_count,
            genre_ids: self.genre_ids,
            original_language: self.original_language,
        }
    }
}

impl RawSeries {
    fn into_media_item(self, kind: Kind) -> MediaItem {
        MediaItem {
            catalog_id: self.id,
            kind,
            title: self.name,
            overview: self.overview,
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            release_date: self.first_air_date,
            rating: self.vote_average,
            vote_count: self.vote_count,
            genre_ids: self.genre_ids,
            original_language: self.original_language,
        }
    }
}

/// A trailer/clip reference.
#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    pub key: String,
    pub site: String,
    pub kind: String,
}

/// Streaming availability by region.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersByRegion {
    pub regions: std::collections::HashMap<String, Vec<String>>,
}

/// Extended metadata for a single item.
#[derive(Debug, Clone, Deserialize)]
pub struct Details {
    pub id: i64,
    pub runtime_minutes: Option<u32>,
    pub tagline: Option<String>,
}

/// Collaborator interface for the discover/videos/providers/details
/// surface the recommender needs. `#[async_trait]` so the recommender can
/// be driven by a test double, the same convention the three stores
/// (`ProfileStore`/`HistoryStore`/`WeightStore`) use.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn discover(&self, kind: Kind, params: &DiscoverParams) -> Result<Page, CatalogError>;
    async fn get_videos(&self, kind: Kind, catalog_id: i64) -> Result<Vec<Video>, CatalogError>;
    async fn get_watch_providers(
        &self,
        kind: Kind,
        catalog_id: i64,
    ) -> Result<Option<ProvidersByRegion>, CatalogError>;
    async fn get_details(&self, kind: Kind, catalog_id: i64) -> Result<Details, CatalogError>;
}

/// The cloneable HTTP-calling half of `CatalogAdapter` — everything
/// `get_json` needs, split out so the TTL-cached methods can move an owned
/// copy into their `get_or_compute` producer instead of borrowing `self`
/// (and its caches) across the single-flight await.
#[derive(Clone)]
struct Transport {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    response_language: String,
    rate_limiter: Arc<RateLimiter>,
}

impl Transport {
    async fn get_discover<T>(
        &self,
        path: &str,
        params: &DiscoverParams,
    ) -> Result<RawPage<T>, CatalogError>
    where
        T: for<'de> Deserialize<'de>,
    {
        self.get_json(path, &params.to_query_pairs()).await
    }

    /// Issue a rate-limited, retrying GET. On 429/503, wait >=1s and retry
    /// at most once.
    async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, CatalogError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{path}", self.base_url);
        let backoff = ConstantBuilder::default()
            .with_delay(CATALOG_RETRY_DELAY)
            .with_max_times(1);

        (|| async { self.send_once(&url, query).await })
            .retry(backoff)
            .when(|err: &CatalogError| err.is_retryable())
            .notify(|err, dur| {
                warn!(error = %err, delay = ?dur, "retrying catalog request");
            })
            .await
    }

    async fn send_once<T>(&self, url: &str, query: &[(&str, String)]) -> Result<T, CatalogError>
    where
        T: for<'de> Deserialize<'de>,
    {
        self.rate_limiter.acquire().await;

        let mut request = self.http.get(url).query(query);
        request = request.query(&[("language", self.response_language.clone())]);
        if !self.api_key.is_empty() {
            request = request.query(&[("api_key", self.api_key.clone())]);
        }

        let response = request.send().await.map_err(CatalogError::from)?;

        if !response.status().is_success() {
            return Err(match response.status().as_u16() {
                429 => CatalogError::TooManyRequests,
                503 => CatalogError::ServiceUnavailable,
                status => CatalogError::Http { status },
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

/// Rate-limited, retrying client for the external catalog.
///
/// A typed adapter over an external HTTP client, one method per operation,
/// normalizing discover-style movie/series responses into `MediaItem`.
/// `get_videos`/`get_watch_providers`/`get_details` are each fronted by
/// their own `TtlCache`, sized and timed from `CacheConfig`; discovery
/// itself is cached one layer up, by the `Recommender`.
pub struct CatalogAdapter {
    transport: Transport,
    details_cache: TtlCache<Details>,
    videos_cache: TtlCache<Vec<Video>>,
    providers_cache: TtlCache<Option<ProvidersByRegion>>,
    details_ttl: Duration,
    videos_ttl: Duration,
}

impl CatalogAdapter {
    #[must_use]
    pub fn new(catalog: &CatalogConfig, rate_limit: &RateLimitConfig, cache: &CacheConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(CATALOG_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            transport: Transport {
                http,
                base_url: catalog.base_url.clone(),
                api_key: catalog.api_key.clone(),
                response_language: catalog.response_language.clone(),
                rate_limiter: Arc::new(RateLimiter::from_requests_per_second(
                    rate_limit.requests_per_second,
                )),
            },
            details_cache: TtlCache::new(cache.max_size),
            videos_cache: TtlCache::new(cache.max_size),
            providers_cache: TtlCache::new(cache.max_size),
            details_ttl: Duration::from_secs(cache.details_ttl_seconds),
            videos_ttl: Duration::from_secs(cache.videos_ttl_seconds),
        }
    }

    pub async fn discover_movies(&self, params: &DiscoverParams) -> Result<Page, CatalogError> {
        let raw: RawPage<RawMovie> = self.transport.get_discover("/discover/movie", params).await?;
        Ok(Page {
            results: raw
                .results
                .into_iter()
                .map(RawMovie::into_media_item)
                .collect(),
            page: raw.page,
            total_pages: raw.total_pages,
            total_results: raw.total_results,
        })
    }

    pub async fn discover_series(&self, params: &DiscoverParams) -> Result<Page, CatalogError> {
        let raw: RawPage<RawSeries> = self.transport.get_discover("/discover/tv", params).await?;
        Ok(Page {
            results: raw
                .results
                .into_iter()
                .map(|series| series.into_media_item(Kind::Series))
                .collect(),
            page: raw.page,
            total_pages: raw.total_pages,
            total_results: raw.total_results,
        })
    }

    /// `DiscoverSeries` with `withOriginalLanguage="ja"` and the animation
    /// genre unioned in.
    pub async fn discover_anime(&self, params: &DiscoverParams) -> Result<Page, CatalogError> {
        let anime_params = anime_overrides(params.clone());
        let raw: RawPage<RawSeries> = self.transport.get_discover("/discover/tv", &anime_params).await?;
        Ok(Page {
            results: raw
                .results
                .into_iter()
                .map(|series| series.into_media_item(Kind::Anime))
                .collect(),
            page: raw.page,
            total_pages: raw.total_pages,
            total_results: raw.total_results,
        })
    }

    /// Fetch a video/trailer listing, cached for `cache.videos_ttl_seconds`
    /// (7 days by default).
    pub async fn get_videos(&self, kind: Kind, catalog_id: i64) -> Result<Vec<Video>, CatalogError> {
        #[derive(Clone, Deserialize)]
        struct VideosResponse {
            results: Vec<Video>,
        }
        let key = cache_key("videos", kind, catalog_id);
        let path = format!("/{}/{catalog_id}/videos", media_path_segment(kind));
        let transport = self.transport.clone();

        let result = self
            .videos_cache
            .get_or_compute(&key, self.videos_ttl, || async move {
                let response: VideosResponse =
                    transport.get_json(&path, &[]).await.map_err(|e| e.to_string())?;
                Ok(response.results)
            })
            .await;

        result.map_err(CatalogError::Decode)
    }

    /// Fetch streaming-provider availability, cached for
    /// `cache.details_ttl_seconds` (24 hours by default, shared with
    /// `get_details`). A 404 is normalized to `Ok(None)` before caching, so
    /// "no providers for this item" is itself a cached result.
    pub async fn get_watch_providers(
        &self,
        kind: Kind,
        catalog_id: i64,
    ) -> Result<Option<ProvidersByRegion>, CatalogError> {
        let key = cache_key("providers", kind, catalog_id);
        let path = format!("/{}/{catalog_id}/watch/providers", media_path_segment(kind));
        let transport = self.transport.clone();

        let result = self
            .providers_cache
            .get_or_compute(&key, self.details_ttl, || async move {
                match transport.get_json::<ProvidersByRegion>(&path, &[]).await {
                    Ok(providers) => Ok(Some(providers)),
                    Err(CatalogError::Http { status: 404 }) => Ok(None),
                    Err(err) => Err(err.to_string()),
                }
            })
            .await;

        result.map_err(CatalogError::Decode)
    }

    /// Fetch extended item metadata, cached for `cache.details_ttl_seconds`
    /// (24 hours by default).
    pub async fn get_details(&self, kind: Kind, catalog_id: i64) -> Result<Details, CatalogError> {
        let key = cache_key("details", kind, catalog_id);
        let path = format!("/{}/{catalog_id}", media_path_segment(kind));
        let transport = self.transport.clone();

        let result = self
            .details_cache
            .get_or_compute(&key, self.details_ttl, || async move {
                transport.get_json(&path, &[]).await.map_err(|e| e.to_string())
            })
            .await;

        result.map_err(CatalogError::Decode)
    }

    /// Dispatch to the kind-specific discover call.
    pub async fn discover(&self, kind: Kind, params: &DiscoverParams) -> Result<Page, CatalogError> {
        match kind {
            Kind::Movie => self.discover_movies(params).await,
            Kind::Series => self.discover_series(params).await,
            Kind::Anime => self.discover_anime(params).await,
        }
    }
}

fn cache_key(prefix: &str, kind: Kind, catalog_id: i64) -> QueryFingerprint {
    let mut params: BTreeMap<String, Value> = BTreeMap::new();
    params.insert("kind".to_string(), Value::String(kind.as_str().to_string()));
    params.insert("catalogId".to_string(), Value::from(catalog_id));
    create_key(prefix, &params)
}

#[async_trait]
impl CatalogSource for CatalogAdapter {
    async fn discover(&self, kind: Kind, params: &DiscoverParams) -> Result<Page, CatalogError> {
        Self::discover(self, kind, params).await
    }

    async fn get_videos(&self, kind: Kind, catalog_id: i64) -> Result<Vec<Video>, CatalogError> {
        Self::get_videos(self, kind, catalog_id).await
    }

    async fn get_watch_providers(
        &self,
        kind: Kind,
        catalog_id: i64,
    ) -> Result<Option<ProvidersByRegion>, CatalogError> {
        Self::get_watch_providers(self, kind, catalog_id).await
    }

    async fn get_details(&self, kind: Kind, catalog_id: i64) -> Result<Details, CatalogError> {
        Self::get_details(self, kind, catalog_id).await
    }
}

fn media_path_segment(kind: Kind) -> &'static str {
    match kind {
        Kind::Movie => "movie",
        Kind::Series | Kind::Anime => "tv",
    }
}

fn anime_overrides(mut params: DiscoverParams) -> DiscoverParams {
    params.with_original_language = "ja".to_string();
    let mut genre_ids: Vec<i64> = params
        .with_genres
        .split(',')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    if !genre_ids.contains(&ANIMATION_GENRE_ID) {
        genre_ids.push(ANIMATION_GENRE_ID);
    }
    params.with_genres = genre_ids
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",");
    params
}

/// Shared timeout constant re-exported for callers composing their own
/// `reqwest::Client`.
pub const REQUEST_TIMEOUT: Duration = CATALOG_REQUEST_TIMEOUT;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anime_overrides_unions_animation_genre() {
        let params = DiscoverParams::new("en").with_genres(&[28, 12]);
        let overridden = anime_overrides(params);
        assert_eq!(overridden.with_original_language, "ja");
        assert!(overridden.with_genres.split(',').any(|g| g == "16"));
    }

    #[test]
    fn test_anime_overrides_does_not_duplicate_animation_genre() {
        let params = DiscoverParams::new("en").with_genres(&[16]);
        let overridden = anime_overrides(params);
        let count = overridden.with_genres.split(',').filter(|g| *g == "16").count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_media_path_segment() {
        assert_eq!(media_path_segment(Kind::Movie), "movie");
        assert_eq!(media_path_segment(Kind::Series), "tv");
        assert_eq!(media_path_segment(Kind::Anime), "tv");
    }
}
