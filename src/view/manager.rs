//! Per-table view state with URL sync and named views.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{debug, warn};

use super::codec::{decode_view_state, encode_view_state};
use super::state::{ColumnFilter, Pagination, SavedView, SortingEntry, ViewState};
use super::storage::{legacy_view_key, named_views_key, StorageError, UrlState, ViewStorage};
use crate::model::FilterGroup;

/// URL parameter carrying the encoded view.
pub const DEFAULT_URL_PARAM: &str = "view";
/// Delay between the last state change and the URL write.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("a view named '{0}' already exists")]
    AlreadyExists(String),

    #[error("no view named '{0}'")]
    NotFound(String),

    #[error("view name must not be empty")]
    EmptyName,

    #[error("saved views under '{0}' are unreadable; refusing to overwrite them")]
    UnreadableViews(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to serialize view state: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type ViewResult<T> = Result<T, ViewError>;

/// How a manager hydrates and syncs.
#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub url_param: String,
    pub debounce: Duration,
    pub default_page_size: usize,
    /// Never read from or write to the URL.
    pub disable_url_sync: bool,
    /// Caller-supplied views; the first one seeds a fresh page.
    pub default_views: Vec<SavedView>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            url_param: DEFAULT_URL_PARAM.to_string(),
            debounce: DEFAULT_DEBOUNCE,
            default_page_size: super::DEFAULT_PAGE_SIZE,
            disable_url_sync: false,
            default_views: Vec::new(),
        }
    }
}

/// Named views as stored, with the entries that no longer parse kept aside
/// so a rewrite does not drop them.
struct StoredViews {
    views: Vec<SavedView>,
    unreadable: Vec<JsonValue>,
}

/// View state of one table.
///
/// Hydrates once on construction: URL parameter, then the first default
/// view, then the first stored named view, then defaults. Every change
/// marks the URL stale. The host drives time with [`tick`](Self::tick):
/// the first tick that sees a change opens a `debounce` window on the
/// host's clock, and a further change reopens it. Loading or deleting a
/// view writes the URL at once.
pub struct ViewStateManager<S: ViewStorage, U: UrlState> {
    table: String,
    storage: S,
    url: U,
    options: ViewOptions,
    state: ViewState,
    active_view: Option<String>,
    url_pending: bool,
    url_due: Option<Instant>,
    last_url_value: Option<String>,
}

impl<S: ViewStorage, U: UrlState> ViewStateManager<S, U> {
    pub fn new(table: &str, storage: S, url: U, options: ViewOptions) -> Self {
        let mut manager = Self {
            table: table.to_string(),
            storage,
            url,
            options,
            state: ViewState::default(),
            active_view: None,
            url_pending: false,
            url_due: None,
            last_url_value: None,
        };
        let (state, active_view) = manager.hydrate();
        manager.state = state;
        manager.active_view = active_view;
        manager
    }

    fn hydrate(&mut self) -> (ViewState, Option<String>) {
        // The URL wins when present, even if it does not decode
        if !self.options.disable_url_sync {
            if let Some(param) = self.url.query_param(&self.options.url_param) {
                return match decode_view_state(&param) {
                    Ok(state) => {
                        self.last_url_value = Some(param);
                        (state, None)
                    }
                    Err(e) => {
                        debug!(
                            table = %self.table,
                            error = %e,
                            "ignoring undecodable view parameter"
                        );
                        (self.default_state(), None)
                    }
                };
            }
        }

        // Then caller defaults, then whatever the user saved
        if let Some(view) = self.options.default_views.first() {
            return (view.state.clone(), Some(view.name.clone()));
        }

        if let Some(view) = self.saved_views().into_iter().next() {
            return (view.state, Some(view.name));
        }

        (self.default_state(), None)
    }

    fn default_state(&self) -> ViewState {
        ViewState::with_page_size(self.options.default_page_size)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn url(&self) -> &U {
        &self.url
    }

    /// Name of the view last loaded or saved, if any.
    pub fn active_view(&self) -> Option<&str> {
        self.active_view.as_deref()
    }

    pub fn set_sorting(&mut self, sorting: Vec<SortingEntry>) {
        self.state.sorting = sorting;
        self.changed();
    }

    pub fn set_column_filters(&mut self, filters: Vec<ColumnFilter>) {
        self.state.column_filters = filters;
        self.changed();
    }

    pub fn set_column_visibility(&mut self, visibility: BTreeMap<String, bool>) {
        self.state.column_visibility = visibility;
        self.changed();
    }

    pub fn set_pagination(&mut self, pagination: Pagination) {
        self.state.pagination = pagination;
        self.changed();
    }

    pub fn set_filter_group(&mut self, group: Option<FilterGroup>) {
        self.state.filter_group = group;
        self.changed();
    }

    /// Replace the whole state.
    pub fn set_state(&mut self, state: ViewState) {
        self.state = state;
        self.changed();
    }

    /// Back to defaults, detached from any named view.
    pub fn reset(&mut self) {
        self.state = self.default_state();
        self.active_view = None;
        self.changed();
    }

    fn changed(&mut self) {
        if !self.options.disable_url_sync {
            self.url_pending = true;
            // Restart the window at the next tick
            self.url_due = None;
        }
    }

    /// Whether a URL write is scheduled.
    pub fn url_write_pending(&self) -> bool {
        self.url_pending
    }

    /// Advance the host clock to `now`; writes the URL once the window of
    /// the latest change has elapsed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.url_pending {
            return false;
        }
        let due = *self.url_due.get_or_insert(now + self.options.debounce);
        if due <= now {
            self.write_url();
            true
        } else {
            false
        }
    }

    /// Perform any scheduled URL write immediately.
    pub fn flush_url(&mut self) {
        if self.url_pending {
            self.write_url();
        }
    }

    fn write_url(&mut self) {
        self.url_pending = false;
        self.url_due = None;
        if self.options.disable_url_sync {
            return;
        }
        let encoded = match encode_view_state(&self.state) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(table = %self.table, error = %e, "failed to encode view state");
                return;
            }
        };
        if self.last_url_value.as_deref() == Some(encoded.as_str()) {
            return;
        }
        self.url.set_query_param(&self.options.url_param, &encoded);
        self.last_url_value = Some(encoded);
    }

    /// Named views stored for this table.
    ///
    /// Entries that fail to parse are skipped; unreadable storage or a
    /// corrupt list yields an empty list.
    pub fn saved_views(&self) -> Vec<SavedView> {
        match self.read_views() {
            Ok(stored) => stored.views,
            Err(e) => {
                warn!(table = %self.table, error = %e, "failed to read saved views");
                Vec::new()
            }
        }
    }

    fn read_views(&self) -> ViewResult<StoredViews> {
        let key = named_views_key(&self.table);
        let mut stored = StoredViews {
            views: Vec::new(),
            unreadable: Vec::new(),
        };
        let Some(raw) = self.storage.get_item(&key)? else {
            return Ok(stored);
        };
        let entries: Vec<JsonValue> =
            serde_json::from_str(&raw).map_err(|_| ViewError::UnreadableViews(key.clone()))?;

        // Parse entry by entry so one bad view does not hide the others
        for entry in entries {
            match serde_json::from_value::<SavedView>(entry.clone()) {
                Ok(view) => stored.views.push(view),
                Err(e) => {
                    warn!(key = %key, error = %e, "skipping unreadable saved view");
                    stored.unreadable.push(entry);
                }
            }
        }
        Ok(stored)
    }

    fn store_views(&mut self, stored: &StoredViews) -> ViewResult<()> {
        let key = named_views_key(&self.table);
        if stored.views.is_empty() && stored.unreadable.is_empty() {
            self.storage.remove_item(&key)?;
            return Ok(());
        }
        let mut entries = Vec::with_capacity(stored.views.len() + stored.unreadable.len());
        for view in &stored.views {
            entries.push(serde_json::to_value(view)?);
        }
        entries.extend(stored.unreadable.iter().cloned());
        self.storage.set_item(&key, &serde_json::to_string(&entries)?)?;
        Ok(())
    }

    /// Save the current state under `name`.
    ///
    /// An existing view of that name is replaced only with `overwrite`.
    pub fn save_view(&mut self, name: &str, overwrite: bool) -> ViewResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ViewError::EmptyName);
        }
        let mut stored = self.read_views()?;
        match stored.views.iter_mut().find(|v| v.name == name) {
            Some(_) if !overwrite => return Err(ViewError::AlreadyExists(name.to_string())),
            Some(existing) => existing.state = self.state.clone(),
            None => stored.views.push(SavedView::new(name, self.state.clone())),
        }
        self.store_views(&stored)?;
        self.active_view = Some(name.to_string());
        debug!(table = %self.table, view = name, "saved view");
        Ok(())
    }

    /// Find a view by name among stored views, then default views.
    fn find_view(&self, name: &str) -> Option<SavedView> {
        self.saved_views()
            .into_iter()
            .find(|v| v.name == name)
            .or_else(|| {
                self.options
                    .default_views
                    .iter()
                    .find(|v| v.name == name)
                    .cloned()
            })
    }

    /// Apply a named view and write the URL immediately.
    pub fn load_view(&mut self, name: &str) -> ViewResult<()> {
        let name = name.trim();
        let view = self
            .find_view(name)
            .ok_or_else(|| ViewError::NotFound(name.to_string()))?;
        self.state = view.state;
        self.active_view = Some(view.name);
        self.write_url();
        Ok(())
    }

    /// Delete a stored view.
    ///
    /// Deleting the active view switches to the first remaining view, or to
    /// defaults when none remain.
    pub fn delete_view(&mut self, name: &str) -> ViewResult<()> {
        let name = name.trim();
        let mut stored = self.read_views()?;
        let before = stored.views.len();
        stored.views.retain(|v| v.name != name);
        if stored.views.len() == before {
            return Err(ViewError::NotFound(name.to_string()));
        }
        self.store_views(&stored)?;

        if self.active_view.as_deref() == Some(name) {
            // Fall back to the next view, or to defaults
            match stored.views.into_iter().next() {
                Some(next) => {
                    self.state = next.state;
                    self.active_view = Some(next.name);
                }
                None => {
                    self.state = self.default_state();
                    self.active_view = None;
                }
            }
            self.write_url();
        }
        Ok(())
    }

    /// Whether the state differs from the active view (or from defaults).
    pub fn is_modified(&self) -> bool {
        match &self.active_view {
            Some(name) => match self.find_view(name) {
                Some(view) => view.state != self.state,
                None => true,
            },
            None => self.state != self.default_state(),
        }
    }

    /// Write the state to the legacy single-view slot.
    pub fn save_legacy(&mut self) -> ViewResult<()> {
        let json = serde_json::to_string(&self.state)?;
        self.storage.set_item(&legacy_view_key(&self.table), &json)?;
        Ok(())
    }

    /// Apply the legacy single-view slot, if present and readable.
    pub fn load_legacy(&mut self) -> ViewResult<bool> {
        let key = legacy_view_key(&self.table);
        let Some(raw) = self.storage.get_item(&key)? else {
            return Ok(false);
        };
        match serde_json::from_str::<ViewState>(&raw) {
            Ok(state) => {
                self.state = state;
                self.changed();
                Ok(true)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "discarding corrupt legacy view");
                Ok(false)
            }
        }
    }

    pub fn clear_legacy(&mut self) -> ViewResult<()> {
        self.storage.remove_item(&legacy_view_key(&self.table))?;
        Ok(())
    }
}
