//! Column rendering rules.
//!
//! A [`ColumnPatterns`] registry maps a column name to how its values are
//! shown (currency, date, account address, ...). It is built once, from
//! settings or the built-in defaults, and passed to whatever renders.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a column's values are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RenderKind {
    #[default]
    Text,
    Number,
    Currency,
    Date,
    Address,
    Badge,
    Link,
}

impl RenderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderKind::Text => "text",
            RenderKind::Number => "number",
            RenderKind::Currency => "currency",
            RenderKind::Date => "date",
            RenderKind::Address => "address",
            RenderKind::Badge => "badge",
            RenderKind::Link => "link",
        }
    }
}

impl fmt::Display for RenderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Prefix,
    Suffix,
    Contains,
}

/// One `[[patterns]]` entry.
///
/// ```toml
/// [[patterns]]
/// match = "prefix"
/// value = "DOT_"
/// render = "currency"
/// decimals = 0
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRule {
    #[serde(rename = "match")]
    pub match_kind: MatchKind,
    pub value: String,
    pub render: RenderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
}

impl PatternRule {
    pub fn new(match_kind: MatchKind, value: &str, render: RenderKind) -> Self {
        Self {
            match_kind,
            value: value.into(),
            render,
            decimals: None,
        }
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = Some(decimals);
        self
    }

    /// Case-insensitive match against a bare column name.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        let value = self.value.to_lowercase();
        match self.match_kind {
            MatchKind::Exact => name == value,
            MatchKind::Prefix => name.starts_with(&value),
            MatchKind::Suffix => name.ends_with(&value),
            MatchKind::Contains => name.contains(&value),
        }
    }
}

/// Resolved display of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnRender {
    pub kind: RenderKind,
    pub decimals: Option<u32>,
}

/// Immutable, ordered rule list; the first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPatterns {
    rules: Vec<PatternRule>,
}

impl ColumnPatterns {
    pub fn new(rules: Vec<PatternRule>) -> Self {
        Self { rules }
    }

    /// Rules for the governance tables.
    pub fn builtin() -> Self {
        Self::new(vec![
            PatternRule::new(MatchKind::Prefix, "DOT_", RenderKind::Currency).with_decimals(0),
            PatternRule::new(MatchKind::Prefix, "USD_", RenderKind::Currency).with_decimals(0),
            PatternRule::new(MatchKind::Prefix, "USDC_", RenderKind::Currency).with_decimals(2),
            PatternRule::new(MatchKind::Prefix, "USDT_", RenderKind::Currency).with_decimals(2),
            PatternRule::new(MatchKind::Exact, "proposer", RenderKind::Address),
            PatternRule::new(MatchKind::Exact, "beneficiary", RenderKind::Address),
            PatternRule::new(MatchKind::Suffix, "_address", RenderKind::Address),
            PatternRule::new(MatchKind::Exact, "status", RenderKind::Badge),
            PatternRule::new(MatchKind::Suffix, "_url", RenderKind::Link),
            PatternRule::new(MatchKind::Suffix, "_count", RenderKind::Number),
            PatternRule::new(MatchKind::Exact, "id", RenderKind::Number),
            PatternRule::new(MatchKind::Suffix, "_date", RenderKind::Date),
            PatternRule::new(MatchKind::Suffix, "_at", RenderKind::Date),
        ])
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Display of `column`, which may carry a table qualifier (`c.category`).
    pub fn resolve(&self, column: &str) -> ColumnRender {
        let name = column.rsplit('.').next().unwrap_or(column);
        self.rules
            .iter()
            .find(|rule| rule.matches(name))
            .map(|rule| ColumnRender {
                kind: rule.render,
                decimals: rule.decimals,
            })
            .unwrap_or_default()
    }
}

impl Default for ColumnPatterns {
    fn default() -> Self {
        Self::builtin()
    }
}
