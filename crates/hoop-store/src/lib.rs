//! Storage backends for the Hoop Hub data store.
//!
//! [`SqliteStore`] wraps [`tokio_rusqlite`] so all database access runs on a
//! dedicated thread without blocking the async runtime. [`MemoryStore`] keeps
//! the same contract in process memory. [`Store`] picks one at construction
//! time and degrades to memory when SQLite cannot be opened.

mod backend;
mod encode;
mod memory;
mod schema;
mod sqlite;

pub mod error;

pub use backend::{Store, StoreConfig};
pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
