//! A single ordered column list over regular and expression columns.
//!
//! Query configs store regular and expression columns in separate lists plus
//! an optional `columnOrder` of stable ids. The column editor works on one
//! interleaved list; these conversions go back and forth losslessly.

use serde::{Deserialize, Serialize};

use crate::model::{ColumnSpec, ExpressionColumn, QueryConfig};

const REGULAR_PREFIX: &str = "col:";
const EXPRESSION_PREFIX: &str = "expr:";

/// A regular or expression column in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UnifiedColumn {
    Regular(ColumnSpec),
    Expression(ExpressionColumn),
}

impl UnifiedColumn {
    /// Stable id: `col:<column>` or `expr:<alias>`.
    pub fn id(&self) -> String {
        match self {
            UnifiedColumn::Regular(spec) => format!("{}{}", REGULAR_PREFIX, spec.column),
            UnifiedColumn::Expression(expr) => format!("{}{}", EXPRESSION_PREFIX, expr.alias),
        }
    }

    /// Key of this column in result rows.
    pub fn result_key(&self) -> String {
        match self {
            UnifiedColumn::Regular(spec) => spec.column_key(),
            UnifiedColumn::Expression(expr) => expr.alias.clone(),
        }
    }
}

/// The split form stored in a query config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnifiedColumns {
    pub columns: Vec<ColumnSpec>,
    pub expression_columns: Vec<ExpressionColumn>,
    pub column_order: Vec<String>,
}

/// Merge regular and expression columns into one ordered list.
///
/// Without `column_order`, regular columns come first, then expressions. With
/// it, entries follow the listed ids; entries the order does not mention are
/// appended in their original relative order (configs saved before ordering
/// existed). Repeated ids are matched to repeated entries in sequence.
pub fn to_unified_columns(
    columns: &[ColumnSpec],
    expression_columns: &[ExpressionColumn],
    column_order: Option<&[String]>,
) -> Vec<UnifiedColumn> {
    let all: Vec<UnifiedColumn> = columns
        .iter()
        .cloned()
        .map(UnifiedColumn::Regular)
        .chain(expression_columns.iter().cloned().map(UnifiedColumn::Expression))
        .collect();

    let Some(order) = column_order else {
        return all;
    };

    let ids: Vec<String> = all.iter().map(UnifiedColumn::id).collect();
    let mut used = vec![false; all.len()];
    let mut out = Vec::with_capacity(all.len());

    // Place ordered ids first; duplicates are consumed left to right
    for wanted in order {
        let next = ids
            .iter()
            .enumerate()
            .find(|(i, id)| !used[*i] && *id == wanted)
            .map(|(i, _)| i);
        if let Some(i) = next {
            used[i] = true;
            out.push(all[i].clone());
        }
    }

    // Append anything the stored order does not mention
    for (i, column) in all.iter().enumerate() {
        if !used[i] {
            out.push(column.clone());
        }
    }

    out
}

/// Split a unified list back into stored form, recording its order.
pub fn from_unified_columns(unified: &[UnifiedColumn]) -> UnifiedColumns {
    let mut result = UnifiedColumns::default();
    for column in unified {
        result.column_order.push(column.id());
        match column {
            UnifiedColumn::Regular(spec) => result.columns.push(spec.clone()),
            UnifiedColumn::Expression(expr) => result.expression_columns.push(expr.clone()),
        }
    }
    result
}

impl QueryConfig {
    /// Selected columns in display order.
    pub fn unified_columns(&self) -> Vec<UnifiedColumn> {
        to_unified_columns(
            &self.columns,
            &self.expression_columns,
            self.column_order.as_deref(),
        )
    }

    /// Replace the selection with `unified`, recording its order.
    pub fn with_unified_columns(mut self, unified: &[UnifiedColumn]) -> Self {
        let split = from_unified_columns(unified);
        self.columns = split.columns;
        self.expression_columns = split.expression_columns;
        self.column_order = Some(split.column_order);
        self
    }
}
