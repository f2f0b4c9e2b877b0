//! SQLite backend for the activity feed store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Because every operation
//! funnels through that single connection, the grouping upsert's
//! read-then-write executes serially per store.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
