//! Column references and the result-key resolver.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate applied to a selected column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregateFunction {
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

impl AggregateFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column selected by a query, optionally aliased or aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[must_use = "builders have no effect until used"]
pub struct ColumnSpec {
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_function: Option<AggregateFunction>,
}

impl ColumnSpec {
    pub fn new(column: &str) -> Self {
        Self {
            column: column.into(),
            alias: None,
            aggregate_function: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_aggregate(mut self, aggregate: AggregateFunction) -> Self {
        self.aggregate_function = Some(aggregate);
        self
    }

    /// Key under which this column's values appear in a result row.
    ///
    /// An alias always wins. Aggregated columns without an alias come back as
    /// `<fn>_<column>` with dots and whitespace in the column replaced by `_`
    /// (`SUM` over `t.amount usd` becomes `sum_t_amount_usd`). Anything else is
    /// keyed by the raw column name.
    pub fn column_key(&self) -> String {
        if let Some(alias) = &self.alias {
            return alias.clone();
        }
        match self.aggregate_function {
            Some(aggregate) => format!(
                "{}_{}",
                aggregate.as_str().to_lowercase(),
                sanitize_column_name(&self.column)
            ),
            None => self.column.clone(),
        }
    }
}

/// Free-function form of [`ColumnSpec::column_key`].
pub fn column_key(spec: &ColumnSpec) -> String {
    spec.column_key()
}

fn sanitize_column_name(column: &str) -> String {
    column
        .chars()
        .map(|c| if c == '.' || c.is_whitespace() { '_' } else { c })
        .collect()
}

/// A computed column. The alias is mandatory and must be unique per query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionColumn {
    pub expression: String,
    pub alias: String,
}

impl ExpressionColumn {
    pub fn new(expression: &str, alias: &str) -> Self {
        Self {
            expression: expression.into(),
            alias: alias.into(),
        }
    }
}
