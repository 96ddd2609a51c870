//! Table definitions: columns, keys and foreign-key constraints.

use serde::{Deserialize, Serialize};

use crate::column::Column;

// ─── Foreign keys ────────────────────────────────────────────────────────────

/// Referential action taken on the child rows when the parent key changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FkAction {
  #[default]
  NoAction,
  Restrict,
  SetNull,
  Cascade,
}

impl FkAction {
  pub fn as_sql(self) -> &'static str {
    match self {
      Self::NoAction => "NO ACTION",
      Self::Restrict => "RESTRICT",
      Self::SetNull => "SET NULL",
      Self::Cascade => "CASCADE",
    }
  }
}

/// `delete` and `update` actions for [`crate::plan::TableBuilder::add_foreign_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ForeignKeyOptions {
  pub on_delete: FkAction,
  pub on_update: FkAction,
}

impl ForeignKeyOptions {
  /// ON DELETE CASCADE, ON UPDATE CASCADE. Used for every
  /// child-to-parent reference in the contact schema.
  pub fn cascade() -> Self {
    Self { on_delete: FkAction::Cascade, on_update: FkAction::Cascade }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
  pub column:     String,
  pub ref_table:  String,
  pub ref_column: String,
  pub on_delete:  FkAction,
  pub on_update:  FkAction,
}

// ─── Table options ───────────────────────────────────────────────────────────

/// Table-level options: the surrogate key (`id`) and explicit key columns
/// (`primary_key`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOptions {
  /// Name of the auto surrogate integer key, or `None` to disable it.
  pub id:          Option<String>,
  pub primary_key: Vec<String>,
}

impl TableOptions {
  /// A table keyed by a surrogate integer column called `id`.
  pub fn surrogate(id: &str) -> Self {
    Self { id: Some(id.to_owned()), primary_key: Vec::new() }
  }

  /// A table with no surrogate key, keyed by the given columns.
  pub fn keyed(columns: &[&str]) -> Self {
    Self {
      id:          None,
      primary_key: columns.iter().map(|c| (*c).to_owned()).collect(),
    }
  }
}

// ─── Table ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
  pub name:          String,
  pub columns:       Vec<Column>,
  pub primary_key:   Vec<String>,
  /// Set when the primary key is a generated surrogate column.
  pub surrogate_key: Option<String>,
  pub foreign_keys:  Vec<ForeignKey>,
}

impl TableDef {
  pub fn column(&self, name: &str) -> Option<&Column> {
    self.columns.iter().find(|c| c.name == name)
  }

  pub fn has_column(&self, name: &str) -> bool { self.column(name).is_some() }

  pub fn foreign_key(&self, column: &str) -> Option<&ForeignKey> {
    self.foreign_keys.iter().find(|fk| fk.column == column)
  }

  /// Whether any foreign key of this table points at `table`.
  pub fn references(&self, table: &str) -> bool {
    self.foreign_keys.iter().any(|fk| fk.ref_table == table)
  }

  pub fn column_names(&self) -> impl Iterator<Item = &str> {
    self.columns.iter().map(|c| c.name.as_str())
  }
}
