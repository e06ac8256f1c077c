//! Drift between a saved query config and the live table schema.

use std::collections::HashSet;
use std::fmt;

use crate::api::TableSchema;
use crate::model::QueryConfig;

/// Where a drifted reference was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriftSource {
    Column,
    Filter,
}

/// A column reference the live schema no longer knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDrift {
    /// Reference as written in the config (`c.category`).
    pub reference: String,
    /// Table it resolved to.
    pub table: String,
    /// Whether the table itself is missing from the schema.
    pub missing_table: bool,
    pub source: DriftSource,
}

impl fmt::Display for SchemaDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let place = match self.source {
            DriftSource::Column => "column",
            DriftSource::Filter => "filter",
        };
        if self.missing_table {
            write!(
                f,
                "{} '{}' references unknown table '{}'",
                place, self.reference, self.table
            )
        } else {
            write!(
                f,
                "{} '{}' references unknown column of '{}'",
                place, self.reference, self.table
            )
        }
    }
}

/// Split a reference into (table, column), resolving join aliases.
///
/// `c.category` with a join aliased `c` resolves to the joined table; a
/// prefix equal to the source table resolves to it; anything else is a
/// column of the source table.
fn resolve_reference<'a>(config: &'a QueryConfig, reference: &'a str) -> (&'a str, &'a str) {
    if let Some((prefix, column)) = reference.split_once('.') {
        if let Some(join) = config.joins.iter().find(|j| j.qualifier() == prefix) {
            return (join.table.as_str(), column);
        }
        if prefix == config.source_table {
            return (config.source_table.as_str(), column);
        }
    }
    (config.source_table.as_str(), reference)
}

/// Report selected and filtered columns missing from the live schema.
///
/// Expression columns are not checked; their SQL is opaque here. Each
/// reference is reported once per source.
pub fn find_schema_drift(config: &QueryConfig, schema: &[TableSchema]) -> Vec<SchemaDrift> {
    let mut references: Vec<(&str, DriftSource)> = config
        .columns
        .iter()
        .map(|c| (c.column.as_str(), DriftSource::Column))
        .collect();
    if let Some(filters) = &config.filters {
        references.extend(
            filters
                .leaves()
                .into_iter()
                .map(|c| (c.column.as_str(), DriftSource::Filter)),
        );
    }

    let mut seen = HashSet::new();
    let mut drift = Vec::new();
    for (reference, source) in references {
        if !seen.insert((reference, source)) {
            continue;
        }
        let (table_name, column) = resolve_reference(config, reference);
        let table = schema.iter().find(|t| t.name == table_name);
        let missing_table = table.is_none();
        if table.is_some_and(|t| t.has_column(column)) {
            continue;
        }
        drift.push(SchemaDrift {
            reference: reference.to_string(),
            table: table_name.to_string(),
            missing_table,
            source,
        });
    }
    drift
}
