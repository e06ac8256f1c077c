//! Serializable per-table UI state.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::model::FilterGroup;

/// Page size used when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// One entry of the table's multi-column sort, highest priority first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortingEntry {
    pub id: String,
    #[serde(default)]
    pub desc: bool,
}

impl SortingEntry {
    pub fn asc(id: &str) -> Self {
        Self {
            id: id.into(),
            desc: false,
        }
    }

    pub fn desc(id: &str) -> Self {
        Self {
            id: id.into(),
            desc: true,
        }
    }
}

/// A per-column filter as the table widget reports it.
///
/// The value is whatever the column's filter input produced: text, a list of
/// selected options, a number, or nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub id: String,
    #[serde(default)]
    pub value: JsonValue,
}

impl ColumnFilter {
    pub fn new(id: &str, value: impl Into<JsonValue>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}

/// Missing fields take their defaults, so `{"pageIndex": 2}` is a valid page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Everything needed to restore one table view.
///
/// `column_filters` is the flat per-column form older saved views use;
/// `filter_group` is the tree form and wins whenever it has conditions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewState {
    pub sorting: Vec<SortingEntry>,
    pub column_filters: Vec<ColumnFilter>,
    pub column_visibility: BTreeMap<String, bool>,
    pub pagination: Pagination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_group: Option<FilterGroup>,
}

impl ViewState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            pagination: Pagination {
                page_index: 0,
                page_size,
            },
            ..Self::default()
        }
    }

    /// Whether any filter, in either form, is active.
    pub fn is_filtered(&self) -> bool {
        !self.column_filters.is_empty()
            || self.filter_group.as_ref().is_some_and(|g| !g.is_empty())
    }

    /// Columns explicitly hidden by the user.
    pub fn hidden_columns(&self) -> Vec<&str> {
        self.column_visibility
            .iter()
            .filter(|(_, visible)| !**visible)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// A named snapshot of a table view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedView {
    pub name: String,
    pub state: ViewState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

impl SavedView {
    pub fn new(name: &str, state: ViewState) -> Self {
        Self {
            name: name.into(),
            state,
            is_default: None,
        }
    }
}
