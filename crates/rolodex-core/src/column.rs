//! Column definitions and the option vocabulary used by changesets.

use serde::{Deserialize, Serialize};

/// Abstract column type; backends pick the concrete engine type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
  /// Variable-length string. Engine-chosen width unless `limit` is set.
  String,
  Text,
  Integer,
  SmallInteger,
  /// Point in time, stored as RFC 3339 text.
  Timestamp,
  Binary,
}

/// A single column as it exists in the schema model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
  pub name:    String,
  #[serde(rename = "type")]
  pub ty:      ColumnType,
  /// Maximum character length (strings) or display width (numbers).
  pub limit:   Option<u32>,
  pub null:    bool,
  pub signed:  bool,
  /// Documentation only, e.g. marking a deprecated column.
  pub comment: Option<String>,
}

impl Column {
  pub fn new(name: &str, ty: ColumnType, options: ColumnOptions) -> Self {
    Self {
      name: name.to_owned(),
      ty,
      limit: options.limit,
      null: options.null,
      signed: options.signed,
      comment: options.comment,
    }
  }

  /// The integer column backing a surrogate key.
  pub fn surrogate(name: &str) -> Self {
    Self::new(name, ColumnType::Integer, ColumnOptions::new().unsigned())
  }
}

/// `limit`, `null`, `signed` and `comment`, with the usual defaults:
/// not null, signed, no limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnOptions {
  pub limit:   Option<u32>,
  pub null:    bool,
  pub signed:  bool,
  pub comment: Option<String>,
}

impl Default for ColumnOptions {
  fn default() -> Self {
    Self { limit: None, null: false, signed: true, comment: None }
  }
}

impl ColumnOptions {
  pub fn new() -> Self { Self::default() }

  pub fn limit(mut self, limit: u32) -> Self {
    self.limit = Some(limit);
    self
  }

  pub fn nullable(mut self) -> Self {
    self.null = true;
    self
  }

  pub fn unsigned(mut self) -> Self {
    self.signed = false;
    self
  }

  pub fn comment(mut self, comment: &str) -> Self {
    self.comment = Some(comment.to_owned());
    self
  }
}
