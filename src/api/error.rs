//! Backend error types.

use thiserror::Error;

/// Result type for backend responses.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced from the query backend.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend rejected the query and said why.
    #[error("query failed: {0}")]
    Query(String),

    /// Non-2xx response without a readable error body.
    #[error("unexpected HTTP status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A 2xx response whose body did not match the contract.
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ApiError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Query(message) => message.clone(),
            other => other.to_string(),
        }
    }
}
