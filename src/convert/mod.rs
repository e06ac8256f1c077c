//! Translation of table UI state into declarative query pieces.
//!
//! Table widgets identify columns by a UI id (`category`); once a query joins
//! other tables, the backend needs the qualified reference (`c.category`).
//! Every function here takes an optional [`ColumnRefMap`] for that mapping.

mod facet;
mod filters;
mod sorting;

use std::collections::HashMap;

pub use facet::{build_facet_query_config, FacetQueryInput};
#[allow(deprecated)]
pub use filters::group_to_filters;
pub use filters::{
    convert_filters_to_query_config, filter_state_to_query_filters, resolve_filter_group_aliases,
};
pub use sorting::sorting_state_to_order_by;

use crate::model::QueryConfig;
use crate::view::ViewState;

/// UI column id to (possibly joined) column reference.
pub type ColumnRefMap = HashMap<String, String>;

/// Apply a table's sort and filter state on top of a base query.
///
/// Sorting replaces the base `order_by` when the view sorts anything; the
/// view's filters replace the base `filters` when the view filters anything.
pub fn apply_view_state(
    base: &QueryConfig,
    state: &ViewState,
    column_id_to_ref: Option<&ColumnRefMap>,
) -> QueryConfig {
    let mut config = base.clone();

    if !state.sorting.is_empty() {
        config.order_by = sorting_state_to_order_by(&state.sorting, Some(base), column_id_to_ref);
    }

    let filters = convert_filters_to_query_config(
        &state.column_filters,
        state.filter_group.as_ref(),
        column_id_to_ref,
    );
    if !filters.is_empty() {
        config.filters = Some(filters);
    }

    config
}
