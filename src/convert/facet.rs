//! Distinct-value (facet) lookups for filter dropdowns.

use crate::model::{FacetQueryConfig, JoinConfig, QueryFilters};

use super::filters::resolve_filter_group_aliases;
use super::ColumnRefMap;

/// Inputs for [`build_facet_query_config`].
#[derive(Debug, Clone, Copy)]
pub struct FacetQueryInput<'a> {
    pub source_table: &'a str,
    pub columns: &'a [String],
    pub joins: &'a [JoinConfig],
    pub filters: Option<&'a QueryFilters>,
    pub column_id_to_ref: Option<&'a ColumnRefMap>,
}

impl<'a> FacetQueryInput<'a> {
    pub fn new(source_table: &'a str, columns: &'a [String]) -> Self {
        Self {
            source_table,
            columns,
            joins: &[],
            filters: None,
            column_id_to_ref: None,
        }
    }
}

/// Build the facet request, resolving UI column ids to joined references in
/// both the requested columns and the filters.
pub fn build_facet_query_config(input: FacetQueryInput<'_>) -> FacetQueryConfig {
    let resolve = |id: &String| -> String {
        input
            .column_id_to_ref
            .and_then(|map| map.get(id))
            .cloned()
            .unwrap_or_else(|| id.clone())
    };

    let filters = input
        .filters
        .filter(|f| !f.is_empty())
        .map(|filters| match (filters, input.column_id_to_ref) {
            (QueryFilters::Group(group), Some(map)) => {
                QueryFilters::Group(resolve_filter_group_aliases(group, map))
            }
            (QueryFilters::List(list), Some(map)) => QueryFilters::List(
                list.iter()
                    .map(|c| match map.get(&c.column) {
                        Some(reference) => c.with_column(reference),
                        None => c.clone(),
                    })
                    .collect(),
            ),
            (other, None) => other.clone(),
        });

    FacetQueryConfig {
        source_table: input.source_table.to_string(),
        columns: input.columns.iter().map(resolve).collect(),
        joins: input.joins.to_vec(),
        filters,
    }
}
