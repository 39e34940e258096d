//! PostgreSQL backend for the tally snapshot store.
//!
//! Same SQL-level contract as `tally-store-sqlite`: ISO 8601 text dates,
//! integer counters, NULL rank for unranked, and native ignore-on-conflict
//! writes (`ON CONFLICT … DO NOTHING` here, `INSERT OR IGNORE` there). The
//! application never branches on which backend is active.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::PgStore;
