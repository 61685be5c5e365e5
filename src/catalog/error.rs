use thiserror::Error;

/// Transport-level failures from the external catalog, scoped to the
/// catalog adapter's own surface.
#[derive(Debug, Error, Clone)]
pub enum CatalogError {
    #[error("rate limited (429)")]
    TooManyRequests,

    #[error("service unavailable (503)")]
    ServiceUnavailable,

    #[error("http error: status {status}")]
    Http { status: u16 },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("request timed out")]
    Timeout,
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        if let Some(status) = err.status() {
            return match status.as_u16() {
                429 => Self::TooManyRequests,
                503 => Self::ServiceUnavailable,
                other => Self::Http { status: other },
            };
        }
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        Self::Http { status: 0 }
    }
}

impl CatalogError {
    /// Whether a single delayed retry applies to this failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TooManyRequests | Self::ServiceUnavailable)
    }
}
