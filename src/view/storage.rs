//! Key/value stores for view state.
//!
//! Two stores back a [`ViewStateManager`](super::ViewStateManager): a durable
//! string store ([`ViewStorage`]) holding legacy and named views, and the
//! page URL ([`UrlState`]) holding the shareable `view` parameter.
//!
//! # Key Format
//!
//! ```text
//! opengov-view-{table}    -> ViewState        (legacy single view)
//! opengov-views-{table}   -> [SavedView, ...] (named views)
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rusqlite::{params, Connection, OptionalExtension};

/// Current store schema version. Bump this when the table layout changes.
const STORE_VERSION: i32 = 1;

const LEGACY_PREFIX: &str = "opengov-view-";
const NAMED_PREFIX: &str = "opengov-views-";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to determine data directory")]
    NoDataDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Key of the legacy single-view slot of `table`.
pub fn legacy_view_key(table: &str) -> String {
    format!("{}{}", LEGACY_PREFIX, table)
}

/// Key of the named-view list of `table`.
pub fn named_views_key(table: &str) -> String {
    format!("{}{}", NAMED_PREFIX, table)
}

/// Table name of a named-view list key, if `key` is one.
pub fn table_of_named_views_key(key: &str) -> Option<&str> {
    key.strip_prefix(NAMED_PREFIX)
}

/// Durable string storage, shaped like browser local storage.
pub trait ViewStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()>;
    fn remove_item(&mut self, key: &str) -> StorageResult<()>;
}

/// The page URL's query string.
pub trait UrlState {
    fn query_param(&self, name: &str) -> Option<String>;
    fn set_query_param(&mut self, name: &str, value: &str);
    fn remove_query_param(&mut self, name: &str);
}

/// Shared handles let several managers, or a test, see the same store.
impl<T: ViewStorage> ViewStorage for Rc<RefCell<T>> {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        self.borrow().get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.borrow_mut().set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        self.borrow_mut().remove_item(key)
    }
}

impl<T: UrlState> UrlState for Rc<RefCell<T>> {
    fn query_param(&self, name: &str) -> Option<String> {
        self.borrow().query_param(name)
    }

    fn set_query_param(&mut self, name: &str, value: &str) {
        self.borrow_mut().set_query_param(name, value)
    }

    fn remove_query_param(&mut self, name: &str) {
        self.borrow_mut().remove_query_param(name)
    }
}

/// Process-local storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ViewStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// In-memory URL query string that counts writes.
#[derive(Debug, Default, Clone)]
pub struct MemoryUrl {
    params: BTreeMap<String, String>,
    writes: usize,
}

impl MemoryUrl {
    pub fn new() -> Self {
        Self::default()
    }

    /// A URL that already carries `name=value`.
    pub fn with_param(name: &str, value: &str) -> Self {
        let mut url = Self::default();
        url.params.insert(name.to_string(), value.to_string());
        url
    }

    /// Number of `set_query_param` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl UrlState for MemoryUrl {
    fn query_param(&self, name: &str) -> Option<String> {
        self.params.get(name).cloned()
    }

    fn set_query_param(&mut self, name: &str, value: &str) {
        self.writes += 1;
        self.params.insert(name.to_string(), value.to_string());
    }

    fn remove_query_param(&mut self, name: &str) {
        self.params.remove(name);
    }
}

/// SQLite-backed view storage, used by the CLI.
///
/// Stored at `<data_dir>/opengov/views.db` unless a path is given.
/// A version mismatch clears every stored view.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open or create the store at `path`.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let storage = Self {
            conn: Connection::open(path)?,
        };
        storage.init()?;
        Ok(storage)
    }

    /// Open the store at its default location.
    pub fn open_default() -> StorageResult<Self> {
        Self::open(&Self::default_path()?)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        let storage = Self {
            conn: Connection::open_in_memory()?,
        };
        storage.init()?;
        Ok(storage)
    }

    pub fn default_path() -> StorageResult<PathBuf> {
        let base = dirs::data_dir().ok_or(StorageError::NoDataDir)?;
        Ok(base.join("opengov").join("views.db"))
    }

    fn init(&self) -> StorageResult<()> {
        // Create tables
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS views (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;

        // Check version
        let stored_version: Option<i32> = self
            .conn
            .query_row("SELECT value FROM meta WHERE key = 'version'", [], |row| {
                let s: String = row.get(0)?;
                Ok(s.parse().unwrap_or(0))
            })
            .optional()?;

        match stored_version {
            Some(v) if v == STORE_VERSION => {}
            Some(_) => {
                // Version mismatch, drop stored views
                self.conn.execute("DELETE FROM views", [])?;
                self.set_version()?;
            }
            // New store
            None => self.set_version()?,
        }

        Ok(())
    }

    fn set_version(&self) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('version', ?)",
            params![STORE_VERSION.to_string()],
        )?;
        Ok(())
    }

    /// Tables that have at least one named view stored, sorted.
    pub fn tables_with_views(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM views WHERE key LIKE ? ORDER BY key")?;
        let keys = stmt
            .query_map(params![format!("{}%", NAMED_PREFIX)], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys
            .iter()
            .filter_map(|k| table_of_named_views_key(k))
            .map(str::to_string)
            .collect())
    }
}

impl ViewStorage for SqliteStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM views WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO views (key, value) VALUES (?, ?)",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM views WHERE key = ?", params![key])?;
        Ok(())
    }
}
