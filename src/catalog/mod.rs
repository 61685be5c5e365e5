pub mod client;
pub mod error;
pub mod params;
pub mod rate_limiter;

pub use client::{
    CatalogAdapter, CatalogSource, Details, ProvidersByRegion, Video, ANIMATION_GENRE_ID,
    REQUEST_TIMEOUT,
};
pub use error::CatalogError;
pub use params::DiscoverParams;
pub use rate_limiter::RateLimiter;
