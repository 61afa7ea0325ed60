//! flatdb — an embedded SQL-subset engine over a JSON flat file.
//!
//! ## Architecture
//! - Store layer: in-memory table map, flushed synchronously to a single
//!   JSON document after every mutation
//! - SQL layer: Lexer -> Parser -> typed AST -> Executor
//! - Surface: prepared statements with positional `?` parameters and three
//!   call modes (`all`, `get`, `run`)
//!
//! ## Quick start
//! ```
//! use flatdb::{Connection, Value};
//!
//! let conn = Connection::in_memory();
//! conn.prepare("INSERT INTO blogs (title, status) VALUES (?, ?)")
//!     .unwrap()
//!     .run(&[Value::from("Opening lines"), Value::from("published")])
//!     .unwrap();
//! let rows = conn
//!     .prepare("SELECT * FROM blogs WHERE status = ?")
//!     .unwrap()
//!     .all(&[Value::from("published")])
//!     .unwrap();
//! assert_eq!(rows.len(), 1);
//! ```

pub mod config;
pub mod sql;
pub mod store;
pub mod types;

mod connection;
mod error;

pub use config::DbConfig;
pub use connection::{Connection, Prepared};
pub use error::{Error, Result};
pub use sql::executor::RunSummary;
pub use store::TableStore;
pub use types::{Record, Value};
