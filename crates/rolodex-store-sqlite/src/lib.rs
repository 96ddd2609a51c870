//! SQLite backend for the Rolodex contact schema.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The [`Migrator`] moves a database
//! along the changeset sequence; [`SqliteStore`] reads and writes contact
//! rows once it is there.

mod encode;
mod schema;
mod sequence;
mod store;

pub mod ddl;
pub mod error;
pub mod introspect;
pub mod migrate;

pub use error::{ConstraintKind, Error, Result};
pub use migrate::{ChangesetStatus, Drift, Migrator, PlannedStep};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
