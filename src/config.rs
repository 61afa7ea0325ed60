//! Engine configuration
//!
//! Controls where the table store lives and how the backing file is written.

use std::path::PathBuf;

/// Configuration for opening a [`Connection`](crate::Connection).
///
/// The default configuration is a purely in-memory store seeded with the
/// fixed set of application tables.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Backing file path. `None` keeps the store purely in memory and turns
    /// every save into a no-op.
    pub path: Option<PathBuf>,

    /// Seed the fixed set of known application tables on first run (that is,
    /// when no backing file exists yet). The store stays schema-less either
    /// way; seeding only pre-creates empty tables.
    pub seed_default_tables: bool,

    /// Write the backing file with 2-space indentation. Compact output is
    /// smaller but unreadable in a diff.
    pub pretty_json: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: None,
            seed_default_tables: true,
            pretty_json: true,
        }
    }
}

impl DbConfig {
    /// Configuration backed by a JSON file at `path`.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }
}
