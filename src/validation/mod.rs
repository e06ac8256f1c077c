//! Validation of query configurations.
//!
//! Editing a query (removing a column, renaming an alias) can leave `groupBy`
//! and `orderBy` entries pointing at columns that are no longer selected.
//! Those entries are reported, never rejected: the editor shows a warning and
//! [`prepare_for_save`] strips them when the config is saved.

mod schema;

pub use schema::{find_schema_drift, DriftSource, SchemaDrift};

use std::collections::HashSet;
use std::fmt;

use crate::model::{FilterCondition, OrderBy, QueryConfig, QueryFilters};

/// Group-by and order-by entries that reference unselected columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryConfigValidation {
    pub invalid_group_by: Vec<String>,
    pub invalid_order_by: Vec<OrderBy>,
}

impl QueryConfigValidation {
    pub fn has_invalid(&self) -> bool {
        !self.invalid_group_by.is_empty() || !self.invalid_order_by.is_empty()
    }
}

impl fmt::Display for QueryConfigValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_invalid() {
            return write!(f, "Query configuration is valid");
        }
        let mut parts = Vec::new();
        if !self.invalid_group_by.is_empty() {
            parts.push(format!(
                "GROUP BY references unselected columns: {}",
                self.invalid_group_by.join(", ")
            ));
        }
        if !self.invalid_order_by.is_empty() {
            let columns: Vec<_> = self
                .invalid_order_by
                .iter()
                .map(|o| o.column.as_str())
                .collect();
            parts.push(format!(
                "ORDER BY references unselected columns: {}",
                columns.join(", ")
            ));
        }
        write!(f, "{}", parts.join("; "))
    }
}

/// Identifiers a `groupBy`/`orderBy` entry may use: every selected column,
/// every column alias and every expression alias.
fn valid_identifiers(config: &QueryConfig) -> HashSet<&str> {
    let mut valid = HashSet::new();
    for column in &config.columns {
        valid.insert(column.column.as_str());
        if let Some(alias) = &column.alias {
            valid.insert(alias.as_str());
        }
    }
    for expression in &config.expression_columns {
        valid.insert(expression.alias.as_str());
    }
    valid
}

/// Find `groupBy` and `orderBy` entries that do not name a selected column.
pub fn validate_query_config(config: &QueryConfig) -> QueryConfigValidation {
    let valid = valid_identifiers(config);

    let invalid_group_by = config
        .group_by
        .iter()
        .filter(|g| !valid.contains(g.as_str()))
        .cloned()
        .collect();

    let invalid_order_by = config
        .order_by
        .iter()
        .filter(|o| !valid.contains(o.column.as_str()))
        .cloned()
        .collect();

    QueryConfigValidation {
        invalid_group_by,
        invalid_order_by,
    }
}

/// Free-function form of [`QueryConfigValidation::has_invalid`].
pub fn has_invalid_query_config(validation: &QueryConfigValidation) -> bool {
    validation.has_invalid()
}

/// Drop the entries a validation flagged; everything else keeps its order.
pub fn strip_invalid_references(
    config: &QueryConfig,
    validation: &QueryConfigValidation,
) -> QueryConfig {
    let invalid_group_by: HashSet<&str> = validation
        .invalid_group_by
        .iter()
        .map(String::as_str)
        .collect();
    let invalid_order_by: HashSet<&str> = validation
        .invalid_order_by
        .iter()
        .map(|o| o.column.as_str())
        .collect();

    let mut repaired = config.clone();
    repaired
        .group_by
        .retain(|g| !invalid_group_by.contains(g.as_str()));
    repaired
        .order_by
        .retain(|o| !invalid_order_by.contains(o.column.as_str()));
    repaired
}

/// Validate and strip in one step; what the editor does on save.
pub fn prepare_for_save(config: &QueryConfig) -> QueryConfig {
    let validation = validate_query_config(config);
    if !validation.has_invalid() {
        return config.clone();
    }
    tracing::debug!(%validation, "stripping invalid references before save");
    strip_invalid_references(config, &validation)
}

/// Leaf conditions whose value shape does not fit their operator.
pub fn malformed_conditions(filters: &QueryFilters) -> Vec<FilterCondition> {
    filters
        .leaves()
        .into_iter()
        .filter(|c| !c.is_well_formed())
        .cloned()
        .collect()
}
