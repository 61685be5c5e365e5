//! Single-flight for cache stampede protection.
//!
//! Wraps the `async_singleflight` crate so `TtlCache::get_or_compute`
//! invokes its producer at most once per key even when N callers miss
//! concurrently.
//!
//! # Example
//! ```
//! use pickcore::cache::SingleFlight;
//!
//! # async fn example() {
//! let sf = SingleFlight::<String, String, String>::new();
//! let result = sf.do_work("user:123".to_string(), async {
//!     Ok("user_data".to_string())
//! }).await;
//! # }
//! ```

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Error type for `SingleFlight` operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SingleFlightError<E> {
    /// The worker task panicked or was cancelled.
    #[error("single-flight worker failed - leader dropped or panicked")]
    WorkerFailed,
    /// The underlying operation failed.
    #[error("{0}")]
    Inner(E),
}

/// Prevents duplicate concurrent function executions for the same key.
///
/// Backed by `async_singleflight`, which handles leader failure and
/// automatic retry.
#[derive(Clone)]
pub struct SingleFlight<K, V, E>
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    group: Arc<async_singleflight::Group<K, V, E>>,
}

impl<K, V, E> SingleFlight<K, V, E>
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            group: Arc::new(async_singleflight::Group::new()),
        }
    }

    /// Execute `f` only once for `key`; concurrent callers for the same key
    /// observe the same result.
    pub async fn do_work<Fut>(&self, key: K, f: Fut) -> Result<V, SingleFlightError<E>>
    where
        Fut: std::future::Future<Output = Result<V, E>> + Send,
    {
        self.group
            .work(&key, f)
            .await
            .map_err(|opt_err| match opt_err {
                Some(inner) => SingleFlightError::Inner(inner),
                None => SingleFlightError::WorkerFailed,
            })
    }

    /// Like `do_work`, but collapses a leader failure back into `E` via
    /// `error_factory` instead of exposing `SingleFlightError`.
    pub async fn do_work_with_fallback<Fut, Ef>(
        &self,
        key: K,
        f: Fut,
        error_factory: Ef,
    ) -> Result<V, E>
    where
        Fut: std::future::Future<Output = Result<V, E>> + Send,
        Ef: FnOnce() -> E,
    {
        self.do_work(key, f).await.map_err(|e| match e {
            SingleFlightError::WorkerFailed => error_factory(),
            SingleFlightError::Inner(err) => err,
        })
    }
}

impl<K, V, E> Default for SingleFlight<K, V, E>
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
