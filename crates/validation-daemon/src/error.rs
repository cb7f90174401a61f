//! Error types for validation-daemon

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rule catalog error
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Server startup error
    #[error("Server error: {0}")]
    Server(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors talking to the SPARQL endpoint
#[derive(Debug, Error)]
pub enum SparqlError {
    /// The request could not be sent or the response not received
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status
    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a valid SPARQL JSON result
    #[error("invalid SPARQL response: {0}")]
    Decode(String),
}

/// Storage-specific errors (the store rejected or failed a read/write)
#[derive(Debug, Error)]
pub enum StorageError {
    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data read back from the store
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query error
    #[error("Query error: {0}")]
    Query(String),
}

impl From<SparqlError> for StorageError {
    fn from(err: SparqlError) -> Self {
        match err {
            SparqlError::Transport(msg) => StorageError::Connection(msg),
            other => StorageError::Query(other.to_string()),
        }
    }
}

/// A validation rule failed to evaluate
#[derive(Debug, Error)]
pub enum RuleError {
    /// The rule's query failed
    #[error("query for rule '{rule}' failed: {source}")]
    Query {
        rule: String,
        #[source]
        source: SparqlError,
    },

    /// Recording the rule's outcome failed
    #[error("storage failure in rule '{rule}': {source}")]
    Storage {
        rule: String,
        #[source]
        source: StorageError,
    },
}

/// Failure of the orchestration machinery itself, outside per-rule isolation
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// A rule pipeline could not be dispatched or joined
    #[error("dispatch failed: {0}")]
    Dispatch(String),

    /// A validation status could not be written
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

/// Rule catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog source could not be read or parsed
    #[error("failed to load catalog: {0}")]
    Load(String),

    /// A rule definition is missing a required field
    #[error("validation #{index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    /// Two rules share a name
    #[error("duplicate validation name: {0}")]
    DuplicateName(String),
}

/// API-specific errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Storage(StorageError::NotFound(_)) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;

/// Result type alias for rule evaluation
pub type RuleResult<T> = Result<T, RuleError>;
