//! Table sort state to ORDER BY.

use crate::model::{OrderBy, QueryConfig, SortDirection};
use crate::view::SortingEntry;

use super::ColumnRefMap;

/// Translate the table's sort entries into `orderBy`, keeping priority order.
///
/// Each sort id resolves to a column reference by, in order: the explicit
/// `column_id_to_ref` mapping, the `column` of a selected column whose alias
/// is the id, and finally the id itself.
pub fn sorting_state_to_order_by(
    sorting: &[SortingEntry],
    query_config: Option<&QueryConfig>,
    column_id_to_ref: Option<&ColumnRefMap>,
) -> Vec<OrderBy> {
    sorting
        .iter()
        .map(|entry| OrderBy {
            column: resolve_sort_column(&entry.id, query_config, column_id_to_ref),
            direction: SortDirection::from_desc(entry.desc),
        })
        .collect()
}

fn resolve_sort_column(
    id: &str,
    query_config: Option<&QueryConfig>,
    column_id_to_ref: Option<&ColumnRefMap>,
) -> String {
    if let Some(reference) = column_id_to_ref.and_then(|map| map.get(id)) {
        return reference.clone();
    }
    if let Some(spec) = query_config.and_then(|config| config.column_by_alias(id)) {
        return spec.column.clone();
    }
    id.to_string()
}
