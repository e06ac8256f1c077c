//! Per-table view state: what the table shows, how it is shared through the
//! URL and how it is kept across visits.
//!
//! - [`ViewState`]: sorting, filters, visibility, pagination
//! - [`codec`]: the `?view=` parameter encoding
//! - [`storage`]: local storage and URL backends
//! - [`ViewStateManager`]: hydration, debounced URL sync, named views

pub mod codec;
mod manager;
mod state;
pub mod storage;

pub use codec::{decode_view_state, encode_view_state, DecodeError};
pub use manager::{
    ViewError, ViewOptions, ViewResult, ViewStateManager, DEFAULT_DEBOUNCE, DEFAULT_URL_PARAM,
};
pub use state::{
    ColumnFilter, Pagination, SavedView, SortingEntry, ViewState, DEFAULT_PAGE_SIZE,
};
pub use storage::{
    legacy_view_key, named_views_key, MemoryStorage, MemoryUrl, SqliteStorage, StorageError,
    StorageResult, UrlState, ViewStorage,
};
