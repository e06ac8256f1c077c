//! # opengov-query
//!
//! Query-configuration state model of the OpenGov governance dashboard
//! (referenda, bounties, treasury spends).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Table UI state (ViewState)                 │
//! │   sorting, column filters, filter group, pagination     │
//! └─────────────────────────────────────────────────────────┘
//!          │ [view]  URL param / local storage / named views
//!          ▼ [convert]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    QueryConfig                          │
//! │  columns, expressions, joins, filters, groupBy, orderBy │
//! └─────────────────────────────────────────────────────────┘
//!          │ [dates]       partial dates -> range predicates
//!          │ [validation]  stale groupBy/orderBy, schema drift
//!          ▼ [api]
//! ┌─────────────────────────────────────────────────────────┐
//! │          POST /api/query/execute  ->  rows              │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows come back keyed by [`model::column_key`]; [`unified`] keeps regular
//! and expression columns in one display order.

pub mod api;
pub mod categories;
pub mod config;
pub mod convert;
pub mod dates;
pub mod model;
pub mod unified;
pub mod validation;
pub mod view;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::convert::{
        apply_view_state, build_facet_query_config, convert_filters_to_query_config,
        filter_state_to_query_filters, resolve_filter_group_aliases, sorting_state_to_order_by,
        ColumnRefMap, FacetQueryInput,
    };
    pub use crate::dates::{
        expand_query_date_filters, next_boundary, parse_partial_date, partial_date_range,
        previous_boundary,
    };
    pub use crate::model::{
        column_key, AggregateFunction, ColumnSpec, ExpressionColumn, FacetQueryConfig,
        FilterCondition, FilterGroup, FilterNode, FilterOperator, FilterValue, JoinConfig,
        LogicalOperator, OrderBy, QueryConfig, QueryFilters, SortDirection,
    };
    pub use crate::unified::{from_unified_columns, to_unified_columns, UnifiedColumn};
    pub use crate::validation::{prepare_for_save, validate_query_config, QueryConfigValidation};
    pub use crate::view::{
        ColumnFilter, Pagination, SavedView, SortingEntry, ViewOptions, ViewState,
        ViewStateManager,
    };
}
