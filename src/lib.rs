//! Typed parameter binding and execution over prepared SQL statements.
//!
//! ```rust,ignore
//! use sqlbind::{Database, Record};
//!
//! #[derive(Record)]
//! struct Server {
//!     id: i64,
//!     kind: String,
//! }
//!
//! let db = Database::<SqliteConnection>::connect("sqlite://servers.db?mode=rwc")?;
//! let mut statement = db.prepare("SELECT id, kind FROM servers WHERE id = ?int_id")?;
//! let server: Option<Server> = statement.bind("int_id", 2).fetch_one_as(())?;
//! ```
pub use ::sqlbind_core::*;
pub use ::sqlbind_macros::*;
