//! Public connection surface: prepared statements with positional parameters.
//!
//! The table store sits behind a `parking_lot::RwLock`; selects take the read
//! lock, mutations the write lock. Serialization to the backing file happens
//! inside the mutation, before the caller's call returns. There is no
//! cross-process coordination: two processes opening the same file race
//! last-writer-wins.

use crate::config::DbConfig;
use crate::error::{Error, Result};
use crate::sql::executor::{select_rows, QueryExecutor, RunSummary};
use crate::sql::{parse_statement, Statement};
use crate::store::TableStore;
use crate::types::{Record, Value};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

/// Handle to one table store. Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct Connection {
    store: Arc<RwLock<TableStore>>,
}

impl Connection {
    /// In-memory connection seeded with the default tables.
    pub fn in_memory() -> Self {
        Self::from_store(TableStore::in_memory())
    }

    /// File-backed connection. A missing file is first run; an unreadable
    /// one is an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_store(TableStore::open(path)?))
    }

    pub fn open_with_config(config: &DbConfig) -> Result<Self> {
        Ok(Self::from_store(TableStore::with_config(config)?))
    }

    fn from_store(store: TableStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Parse `sql` into a prepared statement. Parse failures surface here as
    /// [`Error::Parse`], never as empty results later.
    pub fn prepare(&self, sql: &str) -> Result<Prepared> {
        let (statement, param_count) = parse_statement(sql)?;
        Ok(Prepared {
            store: Arc::clone(&self.store),
            statement,
            param_count,
        })
    }

    /// One-shot convenience: prepare and `run` in a single call.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<RunSummary> {
        self.prepare(sql)?.run(params)
    }
}

/// A parsed statement bound to a store, awaiting parameters.
pub struct Prepared {
    store: Arc<RwLock<TableStore>>,
    statement: Statement,
    param_count: usize,
}

impl Prepared {
    /// Execute and return every matching row. Only SELECT returns rows.
    pub fn all(&self, params: &[Value]) -> Result<Vec<Record>> {
        self.check_params(params)?;
        match &self.statement {
            Statement::Select(select) => {
                let store = self.store.read();
                select_rows(&store, select, params)
            }
            _ => Err(Error::InvalidArgument(
                "statement does not return rows; use run()".to_string(),
            )),
        }
    }

    /// Execute and return the first matching row, if any.
    pub fn get(&self, params: &[Value]) -> Result<Option<Record>> {
        Ok(self.all(params)?.into_iter().next())
    }

    /// Execute for effect and return the mutation summary. A SELECT runs and
    /// reports zero changes.
    pub fn run(&self, params: &[Value]) -> Result<RunSummary> {
        self.check_params(params)?;
        let mut store = self.store.write();
        QueryExecutor::new(&mut store).run(&self.statement, params)
    }

    /// Number of `?` placeholders in the statement.
    pub fn param_count(&self) -> usize {
        self.param_count
    }

    fn check_params(&self, params: &[Value]) -> Result<()> {
        if params.len() != self.param_count {
            return Err(Error::InvalidArgument(format!(
                "statement takes {} parameters but {} were bound",
                self.param_count,
                params.len()
            )));
        }
        Ok(())
    }
}
