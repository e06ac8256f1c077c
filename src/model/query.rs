//! Declarative query configuration exchanged with the backend.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::column::{ColumnSpec, ExpressionColumn};
use super::filter::QueryFilters;

/// Row limit applied when a stored config does not carry one.
pub const DEFAULT_QUERY_LIMIT: u64 = 1000;

fn default_limit() -> u64 {
    DEFAULT_QUERY_LIMIT
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_desc(desc: bool) -> Self {
        if desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("ASC"),
            SortDirection::Desc => f.write_str("DESC"),
        }
    }
}

/// One ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Type of join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinType {
    Inner,
    Left,
    Right,
}

/// Equality join condition: `left = right`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinOn {
    pub left: String,
    pub right: String,
}

/// A joined table. Columns of joined tables are referenced as `<alias>.<column>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinConfig {
    #[serde(rename = "type")]
    pub join_type: JoinType,
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub on: JoinOn,
}

impl JoinConfig {
    pub fn left(table: &str, alias: &str, left: &str, right: &str) -> Self {
        Self {
            join_type: JoinType::Left,
            table: table.into(),
            alias: Some(alias.into()),
            on: JoinOn {
                left: left.into(),
                right: right.into(),
            },
        }
    }

    /// Name used to qualify this table's columns.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }
}

/// A complete query against one source table.
///
/// `group_by` and `order_by` entries are expected to name a selected column
/// (by column, alias or expression alias). That is checked by
/// [`crate::validation::validate_query_config`], not at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[must_use = "builders have no effect until used"]
pub struct QueryConfig {
    pub source_table: String,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expression_columns: Vec<ExpressionColumn>,
    /// Display order of `col:`/`expr:` ids; see [`crate::unified`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_order: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<JoinConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<QueryFilters>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

impl QueryConfig {
    pub fn new(source_table: &str) -> Self {
        Self {
            source_table: source_table.into(),
            columns: Vec::new(),
            expression_columns: Vec::new(),
            column_order: None,
            joins: Vec::new(),
            filters: None,
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: DEFAULT_QUERY_LIMIT,
        }
    }

    pub fn with_column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_expression(mut self, expression: ExpressionColumn) -> Self {
        self.expression_columns.push(expression);
        self
    }

    pub fn with_join(mut self, join: JoinConfig) -> Self {
        self.joins.push(join);
        self
    }

    pub fn with_filters(mut self, filters: QueryFilters) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_group_by(mut self, column: &str) -> Self {
        self.group_by.push(column.into());
        self
    }

    pub fn with_order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Find a selected column by its alias.
    pub fn column_by_alias(&self, alias: &str) -> Option<&ColumnSpec> {
        self.columns
            .iter()
            .find(|c| c.alias.as_deref() == Some(alias))
    }
}

/// Request body for the distinct-values (facet) lookup that fills filter dropdowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetQueryConfig {
    pub source_table: String,
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<JoinConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<QueryFilters>,
}
