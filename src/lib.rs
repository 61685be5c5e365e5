//! Personalized media-pick recommendation core.
//!
//! Wires a `StrategyPlanner` cascade, a `CatalogAdapter` over an external
//! discover-style catalog, a `TTLCache`, and three durable collaborator
//! stores into a single `Recommender::recommend`/`record_action` surface.

pub mod bootstrap;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod models;
pub mod planner;
pub mod recommender;
pub mod resilience;
pub mod store;
pub mod transaction;

pub use config::Config;
pub use error::{Error, Result};
pub use recommender::{Attribution, FilteredOverlay, Mode, RecommendationOutcome, Recommender};
pub use transaction::{with_transaction, UnitOfWork};
