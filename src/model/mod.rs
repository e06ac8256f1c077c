//! Query-configuration data model.
//!
//! Plain value types exchanged between the dashboard UI, the conversion and
//! validation utilities, and the query backend. The JSON form of every type
//! matches what the backend and stored views expect (camelCase fields).

pub mod column;
pub mod filter;
pub mod query;

pub use column::{column_key, AggregateFunction, ColumnSpec, ExpressionColumn};
pub use filter::{
    FilterCondition, FilterGroup, FilterNode, FilterOperator, FilterValue, LogicalOperator,
    QueryFilters,
};
pub use query::{
    FacetQueryConfig, JoinConfig, JoinOn, JoinType, OrderBy, QueryConfig, SortDirection,
    DEFAULT_QUERY_LIMIT,
};
