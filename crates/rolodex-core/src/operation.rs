//! Structural schema operations recorded by changesets.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  column::Column,
  table::{ForeignKey, TableDef},
};

/// One structural change to the schema.
///
/// Operations are engine-neutral; a backend renders them to DDL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SchemaOp {
  CreateTable(TableDef),
  DropTable { table: String },
  AddColumn { table: String, column: Column },
  RemoveColumn { table: String, column: String },
  AddForeignKey { table: String, foreign_key: ForeignKey },
  DropForeignKey { table: String, column: String },
}

impl SchemaOp {
  /// The table this operation targets.
  pub fn table(&self) -> &str {
    match self {
      Self::CreateTable(def) => &def.name,
      Self::DropTable { table }
      | Self::AddColumn { table, .. }
      | Self::RemoveColumn { table, .. }
      | Self::AddForeignKey { table, .. }
      | Self::DropForeignKey { table, .. } => table,
    }
  }

  /// The mechanical inverse used to roll back a reversible changeset.
  ///
  /// Only additive operations can be inverted: a drop or removal does not
  /// carry enough information to rebuild what it removed.
  pub fn invert(&self) -> Result<SchemaOp> {
    match self {
      Self::CreateTable(def) => Ok(Self::DropTable { table: def.name.clone() }),
      Self::AddColumn { table, column } => Ok(Self::RemoveColumn {
        table:  table.clone(),
        column: column.name.clone(),
      }),
      Self::AddForeignKey { table, foreign_key } => Ok(Self::DropForeignKey {
        table:  table.clone(),
        column: foreign_key.column.clone(),
      }),
      Self::DropTable { .. }
      | Self::RemoveColumn { .. }
      | Self::DropForeignKey { .. } => Err(Error::Irreversible(self.to_string())),
    }
  }
}

impl fmt::Display for SchemaOp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::CreateTable(def) => write!(f, "create table {}", def.name),
      Self::DropTable { table } => write!(f, "drop table {table}"),
      Self::AddColumn { table, column } => {
        write!(f, "add column {table}.{}", column.name)
      }
      Self::RemoveColumn { table, column } => {
        write!(f, "remove column {table}.{column}")
      }
      Self::AddForeignKey { table, foreign_key } => write!(
        f,
        "add foreign key {table}.{} -> {}.{}",
        foreign_key.column, foreign_key.ref_table, foreign_key.ref_column
      ),
      Self::DropForeignKey { table, column } => {
        write!(f, "drop foreign key {table}.{column}")
      }
    }
  }
}
