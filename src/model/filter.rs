//! Filter predicates: leaf conditions and recursive AND/OR groups.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Comparison operator of a leaf condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    GtEq,
    #[serde(rename = "<=")]
    LtEq,
    #[serde(rename = "LIKE")]
    Like,
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "NOT IN")]
    NotIn,
    #[serde(rename = "IS NULL")]
    IsNull,
    #[serde(rename = "IS NOT NULL")]
    IsNotNull,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::NotEq => "!=",
            FilterOperator::Gt => ">",
            FilterOperator::Lt => "<",
            FilterOperator::GtEq => ">=",
            FilterOperator::LtEq => "<=",
            FilterOperator::Like => "LIKE",
            FilterOperator::In => "IN",
            FilterOperator::NotIn => "NOT IN",
            FilterOperator::IsNull => "IS NULL",
            FilterOperator::IsNotNull => "IS NOT NULL",
        }
    }

    /// Operators whose value must be a list.
    pub fn takes_list(&self) -> bool {
        matches!(self, FilterOperator::In | FilterOperator::NotIn)
    }

    /// Operators that carry no value.
    pub fn takes_no_value(&self) -> bool {
        matches!(self, FilterOperator::IsNull | FilterOperator::IsNotNull)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value side of a leaf condition.
///
/// Untagged so the wire form is plain JSON: `null`, `true`, `42`, `"x"`, `["a","b"]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<JsonValue>),
    Object(serde_json::Map<String, JsonValue>),
}

impl FilterValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FilterValue::Null)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            FilterValue::Bool(_) | FilterValue::Number(_) | FilterValue::Text(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FilterValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<JsonValue> for FilterValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => FilterValue::Null,
            JsonValue::Bool(b) => FilterValue::Bool(b),
            JsonValue::Number(n) => FilterValue::Number(n),
            JsonValue::String(s) => FilterValue::Text(s),
            JsonValue::Array(items) => FilterValue::List(items),
            JsonValue::Object(map) => FilterValue::Object(map),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Number(value.into())
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Number(value.into())
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(FilterValue::Number)
            .unwrap_or(FilterValue::Null)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(values: Vec<&str>) -> Self {
        FilterValue::List(values.into_iter().map(JsonValue::from).collect())
    }
}

/// A single predicate on one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub column: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: FilterValue,
}

impl FilterCondition {
    pub fn new(column: &str, operator: FilterOperator, value: impl Into<FilterValue>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn is_null(column: &str) -> Self {
        Self::new(column, FilterOperator::IsNull, FilterValue::Null)
    }

    pub fn is_not_null(column: &str) -> Self {
        Self::new(column, FilterOperator::IsNotNull, FilterValue::Null)
    }

    /// Whether the value shape agrees with the operator.
    ///
    /// `IN`/`NOT IN` need a list, `IS NULL`/`IS NOT NULL` need null, and every
    /// other operator needs a scalar.
    pub fn is_well_formed(&self) -> bool {
        if self.operator.takes_list() {
            matches!(self.value, FilterValue::List(_))
        } else if self.operator.takes_no_value() {
            self.value.is_null()
        } else {
            self.value.is_scalar()
        }
    }

    pub fn with_column(&self, column: &str) -> Self {
        Self {
            column: column.into(),
            operator: self.operator,
            value: self.value.clone(),
        }
    }
}

/// Boolean connective of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    Or,
}

/// Either a leaf predicate or a nested group.
///
/// A group is recognised by its `conditions` field; anything else is a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterNode {
    Group(FilterGroup),
    Condition(FilterCondition),
}

impl From<FilterCondition> for FilterNode {
    fn from(condition: FilterCondition) -> Self {
        FilterNode::Condition(condition)
    }
}

impl From<FilterGroup> for FilterNode {
    fn from(group: FilterGroup) -> Self {
        FilterNode::Group(group)
    }
}

/// A recursive AND/OR predicate tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct FilterGroup {
    pub operator: LogicalOperator,
    pub conditions: Vec<FilterNode>,
}

impl FilterGroup {
    pub fn new(operator: LogicalOperator) -> Self {
        Self {
            operator,
            conditions: Vec::new(),
        }
    }

    pub fn and(conditions: Vec<FilterNode>) -> Self {
        Self {
            operator: LogicalOperator::And,
            conditions,
        }
    }

    pub fn or(conditions: Vec<FilterNode>) -> Self {
        Self {
            operator: LogicalOperator::Or,
            conditions,
        }
    }

    pub fn with(mut self, node: impl Into<FilterNode>) -> Self {
        self.conditions.push(node.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// All leaf conditions, depth-first in declaration order.
    pub fn leaves(&self) -> Vec<&FilterCondition> {
        let mut out = Vec::new();
        collect_leaves(self, &mut out);
        out
    }

    /// Rebuild the tree with every leaf passed through `f`.
    ///
    /// Group operators and nesting are preserved exactly.
    pub fn map_conditions<F>(&self, f: &F) -> FilterGroup
    where
        F: Fn(&FilterCondition) -> FilterCondition,
    {
        FilterGroup {
            operator: self.operator,
            conditions: self
                .conditions
                .iter()
                .map(|node| match node {
                    FilterNode::Condition(c) => FilterNode::Condition(f(c)),
                    FilterNode::Group(g) => FilterNode::Group(g.map_conditions(f)),
                })
                .collect(),
        }
    }

    /// Rebuild the tree with every leaf replaced by the node `f` returns.
    pub fn flat_map_conditions<F>(&self, f: &F) -> FilterGroup
    where
        F: Fn(&FilterCondition) -> FilterNode,
    {
        FilterGroup {
            operator: self.operator,
            conditions: self
                .conditions
                .iter()
                .map(|node| match node {
                    FilterNode::Condition(c) => f(c),
                    FilterNode::Group(g) => FilterNode::Group(g.flat_map_conditions(f)),
                })
                .collect(),
        }
    }
}

fn collect_leaves<'a>(group: &'a FilterGroup, out: &mut Vec<&'a FilterCondition>) {
    for node in &group.conditions {
        match node {
            FilterNode::Condition(c) => out.push(c),
            FilterNode::Group(g) => collect_leaves(g, out),
        }
    }
}

/// The `filters` field of a query: a flat list (legacy) or a group tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryFilters {
    Group(FilterGroup),
    List(Vec<FilterCondition>),
}

impl Default for QueryFilters {
    fn default() -> Self {
        QueryFilters::List(Vec::new())
    }
}

impl QueryFilters {
    pub fn is_empty(&self) -> bool {
        match self {
            QueryFilters::Group(g) => g.is_empty(),
            QueryFilters::List(l) => l.is_empty(),
        }
    }

    pub fn leaves(&self) -> Vec<&FilterCondition> {
        match self {
            QueryFilters::Group(g) => g.leaves(),
            QueryFilters::List(l) => l.iter().collect(),
        }
    }

    pub fn map_conditions<F>(&self, f: &F) -> QueryFilters
    where
        F: Fn(&FilterCondition) -> FilterCondition,
    {
        match self {
            QueryFilters::Group(g) => QueryFilters::Group(g.map_conditions(f)),
            QueryFilters::List(l) => QueryFilters::List(l.iter().map(f).collect()),
        }
    }
}
