//! Error types for `rolodex-core`.

use thiserror::Error;

use crate::{changeset::Version, property::PropertyKind};

#[derive(Debug, Error)]
pub enum Error {
  #[error("table already exists: {0}")]
  TableExists(String),

  #[error("no such table: {0}")]
  NoSuchTable(String),

  #[error("column {table}.{column} already exists")]
  ColumnExists { table: String, column: String },

  #[error("no such column: {table}.{column}")]
  NoSuchColumn { table: String, column: String },

  /// The column is part of a primary key or foreign key.
  #[error("column {table}.{column} is part of a key")]
  ColumnInUse { table: String, column: String },

  #[error("table {table} is still referenced by {by}")]
  TableReferenced { table: String, by: String },

  #[error("foreign key on {table}.{column} already exists")]
  ForeignKeyExists { table: String, column: String },

  #[error("no foreign key on {table}.{column}")]
  NoSuchForeignKey { table: String, column: String },

  #[error("operation has no automatic inverse: {0}")]
  Irreversible(String),

  #[error("malformed changeset: {0}")]
  Malformed(String),

  #[error("changeset versions must increase: {previous} is followed by {next}")]
  OutOfOrder { previous: Version, next: Version },

  #[error("invalid contact uid {uid:?}: {reason}")]
  InvalidUid { uid: String, reason: &'static str },

  #[error("{kind} properties have no {column} column")]
  Unsupported { kind: PropertyKind, column: &'static str },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
