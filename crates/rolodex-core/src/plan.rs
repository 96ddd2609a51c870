//! The builder surface changesets are written against.
//!
//! A changeset body receives a [`Plan`] and records operations through
//! [`Plan::table`] / [`Plan::drop_table`]. Nothing is executed here; the
//! runner validates the recorded [`SchemaOp`]s against the schema model and
//! renders them for its engine.

use crate::{
  Error, Result,
  column::{Column, ColumnOptions, ColumnType},
  operation::SchemaOp,
  table::{ForeignKey, ForeignKeyOptions, TableDef, TableOptions},
};

/// Operations recorded by one changeset body, in order.
#[derive(Debug, Default)]
pub struct Plan {
  ops:       Vec<SchemaOp>,
  malformed: Option<String>,
}

impl Plan {
  pub fn new() -> Self { Self::default() }

  /// Declare or alter the table `name`.
  ///
  /// `options` only matter when the builder is finished with
  /// [`TableBuilder::create`].
  pub fn table(&mut self, name: &str, options: TableOptions) -> TableBuilder<'_> {
    TableBuilder {
      plan: self,
      name: name.to_owned(),
      options,
      steps: Vec::new(),
    }
  }

  pub fn drop_table(&mut self, name: &str) {
    self.ops.push(SchemaOp::DropTable { table: name.to_owned() });
  }

  /// The recorded operations, or the first authoring error.
  pub fn finish(self) -> Result<Vec<SchemaOp>> {
    match self.malformed {
      Some(reason) => Err(Error::Malformed(reason)),
      None => Ok(self.ops),
    }
  }

  fn reject(&mut self, reason: String) {
    self.malformed.get_or_insert(reason);
  }
}

enum Step {
  AddColumn(Column),
  RemoveColumn(String),
  AddForeignKey(ForeignKey),
}

/// Pending changes to one table, committed by [`create`](Self::create) or
/// [`update`](Self::update).
#[must_use = "a table builder records nothing until `create()` or `update()`"]
pub struct TableBuilder<'p> {
  plan:    &'p mut Plan,
  name:    String,
  options: TableOptions,
  steps:   Vec<Step>,
}

impl TableBuilder<'_> {
  pub fn add_column(
    mut self,
    name: &str,
    ty: ColumnType,
    options: ColumnOptions,
  ) -> Self {
    self.steps.push(Step::AddColumn(Column::new(name, ty, options)));
    self
  }

  pub fn add_foreign_key(
    mut self,
    column: &str,
    ref_table: &str,
    ref_column: &str,
    options: ForeignKeyOptions,
  ) -> Self {
    self.steps.push(Step::AddForeignKey(ForeignKey {
      column:     column.to_owned(),
      ref_table:  ref_table.to_owned(),
      ref_column: ref_column.to_owned(),
      on_delete:  options.on_delete,
      on_update:  options.on_update,
    }));
    self
  }

  pub fn remove_column(mut self, name: &str) -> Self {
    self.steps.push(Step::RemoveColumn(name.to_owned()));
    self
  }

  /// Record a `CreateTable` holding every pending column and foreign key.
  pub fn create(self) {
    let Self { plan, name, options, steps } = self;

    let mut columns = Vec::new();
    let mut foreign_keys = Vec::new();
    for step in steps {
      match step {
        Step::AddColumn(col) => columns.push(col),
        Step::AddForeignKey(fk) => foreign_keys.push(fk),
        Step::RemoveColumn(col) => {
          plan.reject(format!("remove_column({col}) on new table {name}"));
          return;
        }
      }
    }

    let (primary_key, surrogate_key) = match (options.id, options.primary_key) {
      (Some(id), keys) if keys.is_empty() => {
        columns.insert(0, Column::surrogate(&id));
        (vec![id.clone()], Some(id))
      }
      (Some(_), _) => {
        plan.reject(format!("table {name} sets both `id` and `primary_key`"));
        return;
      }
      (None, keys) => (keys, None),
    };

    plan.ops.push(SchemaOp::CreateTable(TableDef {
      name,
      columns,
      primary_key,
      surrogate_key,
      foreign_keys,
    }));
  }

  /// Record each pending change as its own operation on an existing table.
  pub fn update(self) {
    let Self { plan, name, steps, .. } = self;
    for step in steps {
      let op = match step {
        Step::AddColumn(column) => SchemaOp::AddColumn { table: name.clone(), column },
        Step::RemoveColumn(column) => {
          SchemaOp::RemoveColumn { table: name.clone(), column }
        }
        Step::AddForeignKey(foreign_key) => {
          SchemaOp::AddForeignKey { table: name.clone(), foreign_key }
        }
      };
      plan.ops.push(op);
    }
  }
}
