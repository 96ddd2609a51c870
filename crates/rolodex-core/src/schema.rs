//! In-memory schema model.
//!
//! Every [`SchemaOp`] is validated against the model before a backend runs
//! it, so a malformed changeset fails before touching the database.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  changeset::Changeset,
  changeset::Direction,
  operation::SchemaOp,
  table::{ForeignKey, TableDef},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
  tables: BTreeMap<String, TableDef>,
}

impl Schema {
  pub fn new() -> Self { Self::default() }

  /// Build the model by applying the forward plan of each changeset in turn.
  pub fn replay<'a>(
    changesets: impl IntoIterator<Item = &'a Changeset>,
  ) -> Result<Self> {
    let mut schema = Self::new();
    for changeset in changesets {
      for op in changeset.plan(Direction::Up)? {
        schema.apply(&op)?;
      }
    }
    Ok(schema)
  }

  pub fn table(&self, name: &str) -> Option<&TableDef> { self.tables.get(name) }

  pub fn contains(&self, name: &str) -> bool { self.tables.contains_key(name) }

  pub fn tables(&self) -> impl Iterator<Item = &TableDef> { self.tables.values() }

  pub fn is_empty(&self) -> bool { self.tables.is_empty() }

  pub fn len(&self) -> usize { self.tables.len() }

  /// Tables (other than `name` itself) holding a foreign key into `name`.
  pub fn referencing(&self, name: &str) -> impl Iterator<Item = &TableDef> {
    self
      .tables
      .values()
      .filter(move |t| t.name != name && t.references(name))
  }

  /// Validate `op` against the current model and apply it.
  ///
  /// On error the model is left unchanged.
  pub fn apply(&mut self, op: &SchemaOp) -> Result<()> {
    match op {
      SchemaOp::CreateTable(def) => self.create_table(def),
      SchemaOp::DropTable { table } => self.drop_table(table),
      SchemaOp::AddColumn { table, column } => {
        let def = self.table_mut(table)?;
        if def.has_column(&column.name) {
          return Err(Error::ColumnExists {
            table:  table.clone(),
            column: column.name.clone(),
          });
        }
        def.columns.push(column.clone());
        Ok(())
      }
      SchemaOp::RemoveColumn { table, column } => self.remove_column(table, column),
      SchemaOp::AddForeignKey { table, foreign_key } => {
        self.check_foreign_key(table, foreign_key)?;
        let def = self.table_mut(table)?;
        if def.foreign_key(&foreign_key.column).is_some() {
          return Err(Error::ForeignKeyExists {
            table:  table.clone(),
            column: foreign_key.column.clone(),
          });
        }
        def.foreign_keys.push(foreign_key.clone());
        Ok(())
      }
      SchemaOp::DropForeignKey { table, column } => {
        let def = self.table_mut(table)?;
        let before = def.foreign_keys.len();
        def.foreign_keys.retain(|fk| fk.column != *column);
        if def.foreign_keys.len() == before {
          return Err(Error::NoSuchForeignKey {
            table:  table.clone(),
            column: column.clone(),
          });
        }
        Ok(())
      }
    }
  }

  fn table_mut(&mut self, name: &str) -> Result<&mut TableDef> {
    self
      .tables
      .get_mut(name)
      .ok_or_else(|| Error::NoSuchTable(name.to_owned()))
  }

  fn create_table(&mut self, def: &TableDef) -> Result<()> {
    if self.contains(&def.name) {
      return Err(Error::TableExists(def.name.clone()));
    }

    for (i, col) in def.columns.iter().enumerate() {
      if def.columns[..i].iter().any(|c| c.name == col.name) {
        return Err(Error::ColumnExists {
          table:  def.name.clone(),
          column: col.name.clone(),
        });
      }
    }

    if def.primary_key.is_empty() {
      return Err(Error::Malformed(format!("table {} has no primary key", def.name)));
    }
    for key in &def.primary_key {
      if !def.has_column(key) {
        return Err(Error::NoSuchColumn {
          table:  def.name.clone(),
          column: key.clone(),
        });
      }
    }

    for fk in &def.foreign_keys {
      if !def.has_column(&fk.column) {
        return Err(Error::NoSuchColumn {
          table:  def.name.clone(),
          column: fk.column.clone(),
        });
      }
      // Self-references resolve against the table being created.
      if fk.ref_table == def.name {
        if !def.has_column(&fk.ref_column) {
          return Err(Error::NoSuchColumn {
            table:  def.name.clone(),
            column: fk.ref_column.clone(),
          });
        }
      } else {
        self.check_target(fk)?;
      }
    }

    self.tables.insert(def.name.clone(), def.clone());
    Ok(())
  }

  fn drop_table(&mut self, name: &str) -> Result<()> {
    if !self.contains(name) {
      return Err(Error::NoSuchTable(name.to_owned()));
    }
    if let Some(child) = self.referencing(name).next() {
      return Err(Error::TableReferenced {
        table: name.to_owned(),
        by:    child.name.clone(),
      });
    }
    self.tables.remove(name);
    Ok(())
  }

  fn remove_column(&mut self, table: &str, column: &str) -> Result<()> {
    let in_use = Error::ColumnInUse {
      table:  table.to_owned(),
      column: column.to_owned(),
    };

    let referenced = self.referencing(table).any(|child| {
      child
        .foreign_keys
        .iter()
        .any(|fk| fk.ref_table == table && fk.ref_column == column)
    });

    let def = self.table_mut(table)?;
    if !def.has_column(column) {
      return Err(Error::NoSuchColumn {
        table:  table.to_owned(),
        column: column.to_owned(),
      });
    }
    if referenced
      || def.primary_key.iter().any(|k| k == column)
      || def.foreign_key(column).is_some()
    {
      return Err(in_use);
    }

    def.columns.retain(|c| c.name != column);
    Ok(())
  }

  fn check_foreign_key(&self, table: &str, fk: &ForeignKey) -> Result<()> {
    let def = self
      .table(table)
      .ok_or_else(|| Error::NoSuchTable(table.to_owned()))?;
    if !def.has_column(&fk.column) {
      return Err(Error::NoSuchColumn {
        table:  table.to_owned(),
        column: fk.column.clone(),
      });
    }
    self.check_target(fk)
  }

  fn check_target(&self, fk: &ForeignKey) -> Result<()> {
    let target = self
      .table(&fk.ref_table)
      .ok_or_else(|| Error::NoSuchTable(fk.ref_table.clone()))?;
    if !target.has_column(&fk.ref_column) {
      return Err(Error::NoSuchColumn {
        table:  fk.ref_table.clone(),
        column: fk.ref_column.clone(),
      });
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    column::{ColumnOptions, ColumnType},
    plan::Plan,
    table::{ForeignKeyOptions, TableOptions},
  };

  fn contact_and_tel() -> Schema {
    let mut plan = Plan::new();
    plan
      .table("CONTACT", TableOptions::keyed(&["UID"]))
      .add_column("UID", ColumnType::String, ColumnOptions::new().limit(45))
      .add_column("FN", ColumnType::String, ColumnOptions::new())
      .create();
    plan
      .table("CONTACT_TEL", TableOptions::surrogate("TEL_ID"))
      .add_column("UID", ColumnType::String, ColumnOptions::new().limit(45))
      .add_column("TEL", ColumnType::String, ColumnOptions::new())
      .add_foreign_key("UID", "CONTACT", "UID", ForeignKeyOptions::cascade())
      .create();

    let mut schema = Schema::new();
    for op in plan.finish().unwrap() {
      schema.apply(&op).unwrap();
    }
    schema
  }

  #[test]
  fn create_registers_tables() {
    let schema = contact_and_tel();
    assert_eq!(schema.len(), 2);
    let tel = schema.table("CONTACT_TEL").unwrap();
    assert_eq!(tel.primary_key, ["TEL_ID"]);
    assert_eq!(tel.surrogate_key.as_deref(), Some("TEL_ID"));
    assert_eq!(tel.column_names().next(), Some("TEL_ID"));
  }

  #[test]
  fn duplicate_table_rejected() {
    let mut schema = contact_and_tel();
    let def = schema.table("CONTACT").unwrap().clone();
    let err = schema.apply(&SchemaOp::CreateTable(def)).unwrap_err();
    assert!(matches!(err, Error::TableExists(t) if t == "CONTACT"));
  }

  #[test]
  fn dropping_referenced_parent_rejected() {
    let mut schema = contact_and_tel();
    let err = schema
      .apply(&SchemaOp::DropTable { table: "CONTACT".into() })
      .unwrap_err();
    assert!(
      matches!(err, Error::TableReferenced { ref table, ref by } if table == "CONTACT" && by == "CONTACT_TEL")
    );
    assert!(schema.contains("CONTACT"));
  }

  #[test]
  fn child_then_parent_drop_succeeds() {
    let mut schema = contact_and_tel();
    schema
      .apply(&SchemaOp::DropTable { table: "CONTACT_TEL".into() })
      .unwrap();
    schema
      .apply(&SchemaOp::DropTable { table: "CONTACT".into() })
      .unwrap();
    assert!(schema.is_empty());
  }

  #[test]
  fn key_columns_cannot_be_removed() {
    let mut schema = contact_and_tel();
    for (table, column) in
      [("CONTACT", "UID"), ("CONTACT_TEL", "TEL_ID"), ("CONTACT_TEL", "UID")]
    {
      let err = schema
        .apply(&SchemaOp::RemoveColumn {
          table:  table.into(),
          column: column.into(),
        })
        .unwrap_err();
      assert!(matches!(err, Error::ColumnInUse { .. }), "{table}.{column}");
    }
  }

  #[test]
  fn missing_targets_reported() {
    let mut schema = contact_and_tel();
    let err = schema
      .apply(&SchemaOp::RemoveColumn {
        table:  "CONTACT".into(),
        column: "NICKNAME".into(),
      })
      .unwrap_err();
    assert!(matches!(err, Error::NoSuchColumn { .. }));

    let err = schema
      .apply(&SchemaOp::DropTable { table: "CONTACT_EMAIL".into() })
      .unwrap_err();
    assert!(matches!(err, Error::NoSuchTable(t) if t == "CONTACT_EMAIL"));
  }

  #[test]
  fn foreign_key_to_missing_table_rejected() {
    let mut plan = Plan::new();
    plan
      .table("CONTACT_EMAIL", TableOptions::surrogate("EMAIL_ID"))
      .add_column("UID", ColumnType::String, ColumnOptions::new())
      .add_foreign_key("UID", "CONTACT", "UID", ForeignKeyOptions::cascade())
      .create();
    let ops = plan.finish().unwrap();

    let mut schema = Schema::new();
    let err = schema.apply(&ops[0]).unwrap_err();
    assert!(matches!(err, Error::NoSuchTable(t) if t == "CONTACT"));
    assert!(schema.is_empty());
  }

  #[test]
  fn foreign_key_add_and_drop() {
    let mut schema = contact_and_tel();
    let fk = schema
      .table("CONTACT_TEL")
      .unwrap()
      .foreign_key("UID")
      .unwrap()
      .clone();

    schema
      .apply(&SchemaOp::DropForeignKey {
        table:  "CONTACT_TEL".into(),
        column: "UID".into(),
      })
      .unwrap();
    assert!(schema.referencing("CONTACT").next().is_none());

    schema
      .apply(&SchemaOp::AddForeignKey {
        table:       "CONTACT_TEL".into(),
        foreign_key: fk.clone(),
      })
      .unwrap();
    let err = schema
      .apply(&SchemaOp::AddForeignKey {
        table:       "CONTACT_TEL".into(),
        foreign_key: fk,
      })
      .unwrap_err();
    assert!(matches!(err, Error::ForeignKeyExists { .. }));
  }
}
