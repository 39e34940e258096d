//! Core types and trait definitions for the tally snapshot store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Both storage backends and the collector depend on it; it depends on
//! nothing proprietary.

pub mod snapshot;
pub mod store;
pub mod subject;

pub use snapshot::Snapshot;
pub use store::{HistoryRange, SnapshotStore};
