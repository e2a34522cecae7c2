//! Error taxonomy shared by the ingestion pipeline and the query surface.

use thiserror::Error;

/// Longest upstream body kept on a [`FetchError`] for diagnostics.
const MAX_BODY_CHARS: usize = 512;

/// A malformed upstream snapshot. Never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("malformed snapshot: {0}")]
    Malformed(String),
}

/// The upstream price-data source could not deliver a usable body.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream transport error: {0}")]
    Transport(String),

    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream returned an unusable body (HTTP {status}): {body}")]
    InvalidBody { status: u16, body: String },
}

impl FetchError {
    pub fn status(status: u16, body: &str) -> Self {
        FetchError::Status {
            status,
            body: truncate_body(body),
        }
    }

    pub fn invalid_body(status: u16, body: &str) -> Self {
        FetchError::InvalidBody {
            status,
            body: truncate_body(body),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_BODY_CHARS {
        body.to_string()
    } else {
        let mut cut: String = body.chars().take(MAX_BODY_CHARS).collect();
        cut.push_str("...");
        cut
    }
}

/// The persistence layer is unavailable or rejected a statement.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database pool error: {0}")]
    Pool(String),

    #[error("database query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("database migration failed: {0}")]
    Migration(String),

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<diesel::r2d2::PoolError> for StorageError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        StorageError::Pool(err.to_string())
    }
}

/// Failure of one ingestion run. Each step of the pipeline surfaces its own variant.
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("no municipality on record")]
    NoMunicipality,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("tank size must be a positive finite number of liters, got {0}")]
    InvalidTankSize(f64),

    #[error("no station has a price for fuel type {fuel_type_id}")]
    NoEligibleStation { fuel_type_id: i32 },
}

/// Errors of the read-side query surface.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<ResolveError> for QueryError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::InvalidTankSize(_) => QueryError::InvalidInput(err.to_string()),
            ResolveError::NoEligibleStation { .. } => QueryError::NotFound(err.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(String),

    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },

    #[error("failed to read reference data: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse reference data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to store reference data: {0}")]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_truncates_long_bodies() {
        let body = "x".repeat(2000);
        match FetchError::status(500, &body) {
            FetchError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.chars().count(), MAX_BODY_CHARS + 3);
                assert!(body.ends_with("..."));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_fetch_error_keeps_short_bodies() {
        let err = FetchError::invalid_body(200, "not json");
        assert_eq!(
            err,
            FetchError::InvalidBody {
                status: 200,
                body: "not json".to_string()
            }
        );
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::MissingField("latitude".to_string());
        assert_eq!(err.to_string(), "missing required field: latitude");
    }

    #[test]
    fn test_resolve_error_maps_to_query_error() {
        let invalid: QueryError = ResolveError::InvalidTankSize(-1.0).into();
        assert!(matches!(invalid, QueryError::InvalidInput(_)));

        let missing: QueryError = ResolveError::NoEligibleStation { fuel_type_id: 2 }.into();
        assert!(matches!(missing, QueryError::NotFound(_)));
    }

    #[test]
    fn test_ingestion_error_is_transparent() {
        let err: IngestionError = ValidationError::MissingField("fullName".to_string()).into();
        assert_eq!(err.to_string(), "missing required field: fullName");
    }
}
