//! HTTP contract of the query backend.
//!
//! Transport is the caller's concern; this module builds request bodies and
//! interprets `(status, body)` pairs. Failures are never retried here.

mod error;
mod protocol;

pub use error::{ApiError, ApiResult};
pub use protocol::{
    ErrorBody, FacetResponse, FacetValue, QueryResult, Row, SchemaColumn, TableSchema,
    EXECUTE_PATH, FACETS_PATH, SCHEMA_PATH,
};

use serde::de::DeserializeOwned;

use crate::model::{FacetQueryConfig, QueryConfig};

/// Join a base URL and an endpoint path without doubling the slash.
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// JSON body for `POST /api/query/execute`.
pub fn execute_request_body(config: &QueryConfig) -> Result<String, serde_json::Error> {
    serde_json::to_string(config)
}

/// JSON body for `POST /api/query/facets`.
pub fn facet_request_body(config: &FacetQueryConfig) -> Result<String, serde_json::Error> {
    serde_json::to_string(config)
}

fn parse_response<T: DeserializeOwned>(status: u16, body: &str) -> ApiResult<T> {
    if (200..300).contains(&status) {
        return serde_json::from_str(body).map_err(ApiError::Decode);
    }
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => Err(ApiError::Query(err.error)),
        Err(_) => Err(ApiError::Status {
            status,
            body: body.to_string(),
        }),
    }
}

/// Interpret an execute response.
pub fn parse_execute_response(status: u16, body: &str) -> ApiResult<QueryResult> {
    parse_response(status, body)
}

/// Interpret a schema response (a list of tables).
pub fn parse_schema_response(status: u16, body: &str) -> ApiResult<Vec<TableSchema>> {
    parse_response(status, body)
}

/// Interpret a facet response.
pub fn parse_facet_response(status: u16, body: &str) -> ApiResult<FacetResponse> {
    parse_response(status, body)
}
