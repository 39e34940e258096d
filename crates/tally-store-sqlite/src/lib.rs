//! SQLite backend for the tally snapshot store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. This is also the backend the bundled
//! seed dataset ships in, so the replay path reads seeds through this crate.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
