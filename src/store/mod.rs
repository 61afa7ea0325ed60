//! Table store: the in-memory owner of all named record sequences,
//! optionally synchronized with a single JSON document on disk.
//!
//! The backing file maps table name to an array of record objects and carries
//! no schema or version field. A missing file is "first run", not a failure;
//! an unreadable or malformed file is surfaced as [`Error::Corrupted`] so a
//! later save cannot silently overwrite data we failed to read. Writes are
//! whole-file and synchronous, with no atomic rename: a crash mid-write can
//! corrupt the file.

use crate::config::DbConfig;
use crate::error::{Error, Result};
use crate::types::{Record, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Tables every fresh store starts with. The store stays schema-less;
/// unknown names still work and simply begin empty.
pub const DEFAULT_TABLES: &[&str] = &[
    "admin_settings",
    "tournaments",
    "tournament_registrations",
    "registrations",
    "demo_requests",
    "admin_users",
    "discount_codes",
    "gallery_images",
    "blogs",
];

/// The canonical in-memory representation of all tables.
///
/// Owned exclusively by the connection; every mutation flows through the
/// statement execution path and ends with [`TableStore::save`].
pub struct TableStore {
    tables: BTreeMap<String, Vec<Record>>,
    path: Option<PathBuf>,
    pretty: bool,
}

static EMPTY: Vec<Record> = Vec::new();

impl TableStore {
    /// In-memory store seeded with the default tables. Saves are no-ops.
    pub fn in_memory() -> Self {
        // Default config has no path, so with_config cannot fail.
        match Self::with_config(&DbConfig::default()) {
            Ok(store) => store,
            Err(_) => unreachable!("in-memory store performs no IO"),
        }
    }

    /// File-backed store. Reads the file when it exists, seeds the default
    /// tables otherwise.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(&DbConfig::at_path(path.as_ref()))
    }

    pub fn with_config(config: &DbConfig) -> Result<Self> {
        let mut store = Self {
            tables: BTreeMap::new(),
            path: config.path.clone(),
            pretty: config.pretty_json,
        };

        if let Some(path) = &store.path {
            if path.exists() {
                let bytes = fs::read(path)?;
                store.tables = serde_json::from_slice(&bytes)
                    .map_err(|e| Error::Corrupted(path.clone(), e.to_string()))?;
                return Ok(store);
            }
        }

        if config.seed_default_tables {
            for name in DEFAULT_TABLES {
                store.tables.insert((*name).to_string(), Vec::new());
            }
        }
        Ok(store)
    }

    /// Records of a table. Unknown names read as empty rather than erroring.
    pub fn table(&self, name: &str) -> &[Record] {
        self.tables.get(name).unwrap_or(&EMPTY)
    }

    /// Live mutable records of a table, creating an empty table for unknown
    /// names. A typo therefore grows a new table instead of failing; that is
    /// the permissive contract callers of the store expect.
    pub fn table_mut(&mut self, name: &str) -> &mut Vec<Record> {
        self.tables.entry(name.to_string()).or_default()
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Next id for a table: `max(existing ids) + 1`, or 1 when empty. Not a
    /// monotonic counter, so ids freed by a delete can be reused.
    pub fn next_id(&self, name: &str) -> i64 {
        self.table(name)
            .iter()
            .filter_map(|record| record.get("id").and_then(Value::as_i64))
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Serialize the full mapping to the backing file, if any. Called
    /// synchronously after every successful mutation, before the caller's
    /// call returns.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&self.tables)
        } else {
            serde_json::to_vec(&self.tables)
        }
        .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(path, bytes)?;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
