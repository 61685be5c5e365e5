//! Per-process FIFO admission queue enforcing minimum call spacing
//! between catalog calls.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Serializes outgoing catalog calls in submission order with a minimum
/// spacing between admissions.
///
/// `tokio::sync::Mutex` wakes waiters in acquisition (FIFO) order, which
/// is enough to serialize bursts in submission order with no reordering —
/// no separate queue data structure is needed (DESIGN.md).
pub struct RateLimiter {
    spacing: Duration,
    next_allowed: Mutex<Instant>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            next_allowed: Mutex::new(Instant::now()),
        }
    }

    #[must_use]
    pub fn from_requests_per_second(rps: f64) -> Self {
        let spacing_ms = if rps <= 0.0 { 100.0 } else { 1000.0 / rps };
        Self::new(Duration::from_millis(spacing_ms as u64))
    }

    /// Block until this call is admitted, honoring FIFO submission order.
    /// Dropping the returned future before it resolves cancels only that
    /// waiter.
    pub async fn acquire(&self) {
        let mut next_allowed = self.next_allowed.lock().await;
        let now = Instant::now();
        if *next_allowed > now {
            tokio::time::sleep_until(*next_allowed).await;
        }
        *next_allowed = (*next_allowed).max(now) + self.spacing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_spacing_enforced() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(20)));
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_fifo_admission_order() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(10)));
        let order = Arc::new(tokio::sync::Mutex::new(Vec::new()));

        let mut handles = vec![];
        for i in 0..5 {
            let limiter = limiter.clone();
            let order = order.clone();
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
                order.lock().await.push(i);
            }));
            // Stagger spawns slightly so submission order is deterministic.
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*order.lock().await, vec![0, 1, 2, 3, 4]);
    }
}
