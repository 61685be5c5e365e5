use thiserror::Error;

/// Errors surfaced by the recommendation core.
///
/// Profile-incompleteness, no-result, and catalog-unavailability are not
/// represented here — they're `RecommendationOutcome` variants, since
/// `recommend` returns them as a normal (non-error) result rather than
/// failing the call.
#[derive(Error, Debug)]
pub enum Error {
    /// The request overlay failed validation (e.g. FILTERED mode without a kind).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A profile/history/weight store failure prevented a required read.
    #[error("store error: {0}")]
    StoreError(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Error::StoreError("resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                match code.as_ref() {
                    // PostgreSQL unique_violation
                    "23505" => Error::StoreError("record already exists".to_string()),
                    // PostgreSQL check_violation / not_null_violation
                    "23514" | "23502" => {
                        Error::InvalidRequest("constraint check failed".to_string())
                    }
                    _ => Error::Database(err),
                }
            }
            _ => Error::Database(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
