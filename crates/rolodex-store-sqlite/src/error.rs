//! Error type for `rolodex-store-sqlite`.

use rolodex_core::{changeset::Version, property::PropertyKind};
use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] rolodex_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown changeset version: {0}")]
  UnknownVersion(Version),

  /// The bookkeeping table records a version the sequence does not know.
  #[error("applied version {0} is not in the changeset sequence")]
  UnknownApplied(Version),

  #[error("changeset {pending} is pending but {applied} is already applied")]
  PendingBehindApplied { pending: Version, applied: Version },

  /// `PRAGMA foreign_key_check` found rows without a parent.
  #[error("rows in {table} have no parent in {parent}")]
  DanglingRows { table: String, parent: String },

  #[error("{0} properties have no type labels")]
  NoTypeRelation(PropertyKind),

  #[error("changeset {version} ({name}) failed: {source}")]
  Changeset {
    version: Version,
    name:    &'static str,
    #[source]
    source:  Box<Error>,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The kind of engine constraint a write violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
  ForeignKey,
  PrimaryKey,
  Unique,
  Check,
  NotNull,
}

impl Error {
  /// Classify a constraint violation reported by SQLite.
  pub fn constraint(&self) -> Option<ConstraintKind> {
    let failure = match self {
      Self::Changeset { source, .. } => return source.constraint(),
      Self::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(failure, _),
      )) => failure,
      _ => return None,
    };

    match failure.extended_code {
      ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(ConstraintKind::ForeignKey),
      ffi::SQLITE_CONSTRAINT_PRIMARYKEY => Some(ConstraintKind::PrimaryKey),
      ffi::SQLITE_CONSTRAINT_UNIQUE => Some(ConstraintKind::Unique),
      ffi::SQLITE_CONSTRAINT_CHECK => Some(ConstraintKind::Check),
      ffi::SQLITE_CONSTRAINT_NOTNULL => Some(ConstraintKind::NotNull),
      _ => None,
    }
  }
}
