//! Table filter state to query filters.

use serde_json::Value as JsonValue;
use tracing::warn;

use crate::model::{
    FilterCondition, FilterGroup, FilterNode, FilterOperator, FilterValue, QueryFilters,
};
use crate::view::ColumnFilter;

use super::ColumnRefMap;

/// Convert flat per-column filters into conditions, one per filter, in order.
///
/// - text: `LIKE '%text%'` (empty text gives `%%`)
/// - list: `IN list` (empty lists included)
/// - null or missing: `IS NULL`
/// - anything else: `= value`
pub fn filter_state_to_query_filters(filters: &[ColumnFilter]) -> Vec<FilterCondition> {
    filters.iter().map(column_filter_to_condition).collect()
}

fn column_filter_to_condition(filter: &ColumnFilter) -> FilterCondition {
    match &filter.value {
        JsonValue::String(text) => {
            FilterCondition::new(&filter.id, FilterOperator::Like, format!("%{}%", text))
        }
        JsonValue::Array(items) => {
            FilterCondition::new(&filter.id, FilterOperator::In, FilterValue::List(items.clone()))
        }
        JsonValue::Null => FilterCondition::is_null(&filter.id),
        other => FilterCondition::new(&filter.id, FilterOperator::Eq, other.clone()),
    }
}

/// Rewrite every leaf's column through `column_id_to_ref`, keeping the tree shape.
pub fn resolve_filter_group_aliases(
    group: &FilterGroup,
    column_id_to_ref: &ColumnRefMap,
) -> FilterGroup {
    group.map_conditions(&|condition| match column_id_to_ref.get(&condition.column) {
        Some(reference) => condition.with_column(reference),
        None => condition.clone(),
    })
}

/// Pick the filters to send with a query.
///
/// A non-empty `filter_group` always wins, alias-resolved when a mapping is
/// given. Otherwise non-empty `column_filters` are converted as a flat list.
/// Otherwise the result is an empty list.
pub fn convert_filters_to_query_config(
    column_filters: &[ColumnFilter],
    filter_group: Option<&FilterGroup>,
    column_id_to_ref: Option<&ColumnRefMap>,
) -> QueryFilters {
    if let Some(group) = filter_group.filter(|g| !g.is_empty()) {
        let group = match column_id_to_ref {
            Some(map) => resolve_filter_group_aliases(group, map),
            None => group.clone(),
        };
        return QueryFilters::Group(group);
    }

    if !column_filters.is_empty() {
        return QueryFilters::List(filter_state_to_query_filters(column_filters));
    }

    QueryFilters::List(Vec::new())
}

/// Flatten a group into a list of conditions.
///
/// Lossy: nested AND/OR operators are dropped. Logs a warning on every call
/// and one more per nested group it flattens.
#[deprecated(note = "operate on FilterGroup directly; nested AND/OR semantics are lost")]
pub fn group_to_filters(group: &FilterGroup) -> Vec<FilterCondition> {
    warn!(
        operator = ?group.operator,
        "group_to_filters is deprecated and discards nested group operators"
    );
    let mut out = Vec::new();
    flatten_into(group, &mut out);
    out
}

fn flatten_into(group: &FilterGroup, out: &mut Vec<FilterCondition>) {
    for node in &group.conditions {
        match node {
            FilterNode::Condition(condition) => out.push(condition.clone()),
            FilterNode::Group(nested) => {
                warn!(
                    operator = ?nested.operator,
                    conditions = nested.conditions.len(),
                    "flattening nested filter group; its operator is discarded"
                );
                flatten_into(nested, out);
            }
        }
    }
}

impl FilterGroup {
    /// Import flat per-column filters as an AND group.
    pub fn from_legacy(filters: &[ColumnFilter]) -> FilterGroup {
        FilterGroup::and(
            filter_state_to_query_filters(filters)
                .into_iter()
                .map(FilterNode::from)
                .collect(),
        )
    }
}
