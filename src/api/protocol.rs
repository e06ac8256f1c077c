//! Wire types of the query backend.
//!
//! `POST /api/query/execute` takes a serialized [`QueryConfig`](crate::model::QueryConfig)
//! and answers `{data, rowCount, sql}` or, with a non-2xx status, `{error}`.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::model::ColumnSpec;

/// Execute a query config.
pub const EXECUTE_PATH: &str = "/api/query/execute";
/// Table and column metadata used to build queries.
pub const SCHEMA_PATH: &str = "/api/query/schema";
/// Distinct values per column for filter dropdowns.
pub const FACETS_PATH: &str = "/api/query/facets";

static NULL: JsonValue = JsonValue::Null;

/// One result row keyed by result column key.
pub type Row = serde_json::Map<String, JsonValue>;

/// Successful query response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub data: Vec<Row>,
    pub row_count: usize,
    #[serde(default)]
    pub sql: String,
}

impl QueryResult {
    /// Value of `spec` in `row`, looked up by the column's result key.
    pub fn column_value<'a>(row: &'a Row, spec: &ColumnSpec) -> Option<&'a JsonValue> {
        row.get(&spec.column_key())
    }

    /// Values of one selected column across all rows; `Null` where absent.
    pub fn values_for(&self, spec: &ColumnSpec) -> Vec<&JsonValue> {
        let key = spec.column_key();
        self.data
            .iter()
            .map(|row| row.get(&key).unwrap_or(&NULL))
            .collect()
    }
}

/// Body of a failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A column as reported by the schema endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaColumn {
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
}

/// A table as reported by the schema endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<SchemaColumn>,
}

impl TableSchema {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }
}

/// One distinct value and how many rows carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetValue {
    pub value: JsonValue,
    pub count: u64,
}

/// Facet lookup response, keyed by requested column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FacetResponse {
    pub facets: BTreeMap<String, Vec<FacetValue>>,
}
