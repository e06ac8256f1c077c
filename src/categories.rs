//! Treasury spend categories.
//!
//! Categories form a two-level list: each row is a category plus an optional
//! subcategory. A row without a subcategory is the category's catch-all
//! ("Other") entry.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
}

/// Result of [`find_category_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryLookup {
    Found(i64),
    /// No row carries this category (and subcategory, when given).
    NotFound,
    /// The category exists but has no catch-all row, so a lookup without a
    /// subcategory cannot pick one. Such data needs a catch-all row added;
    /// this is reported rather than guessed.
    MissingCatchAll,
}

impl CategoryLookup {
    pub fn id(&self) -> Option<i64> {
        match self {
            CategoryLookup::Found(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for CategoryLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryLookup::Found(id) => write!(f, "category id {}", id),
            CategoryLookup::NotFound => write!(f, "no such category"),
            CategoryLookup::MissingCatchAll => {
                write!(f, "category has no catch-all entry for an unspecified subcategory")
            }
        }
    }
}

/// Resolve a category and optional subcategory to a row id.
///
/// With a subcategory, the row matching both wins. Without one (or with a
/// blank one), only the category's catch-all row matches.
pub fn find_category_id(
    categories: &[Category],
    category: &str,
    subcategory: Option<&str>,
) -> CategoryLookup {
    let subcategory = subcategory.map(str::trim).filter(|s| !s.is_empty());

    if let Some(sub) = subcategory {
        return categories
            .iter()
            .find(|c| c.category == category && c.subcategory.as_deref() == Some(sub))
            .map_or(CategoryLookup::NotFound, |c| CategoryLookup::Found(c.id));
    }

    let mut rows = categories.iter().filter(|c| c.category == category).peekable();
    if rows.peek().is_none() {
        return CategoryLookup::NotFound;
    }
    rows.find(|c| c.subcategory.is_none())
        .map_or(CategoryLookup::MissingCatchAll, |c| CategoryLookup::Found(c.id))
}
