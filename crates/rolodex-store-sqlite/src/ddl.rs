//! Rendering of schema operations as SQLite DDL.

use rolodex_core::{
  Error as CoreError,
  column::{Column, ColumnType},
  operation::SchemaOp,
  schema::Schema,
  table::{ForeignKey, TableDef},
};

use crate::{Result, encode::quote, schema::REBUILD_PREFIX};

// ─── Columns ─────────────────────────────────────────────────────────────────

fn sql_type(column: &Column) -> String {
  match (column.ty, column.limit) {
    (ColumnType::String, Some(limit)) => format!("VARCHAR({limit})"),
    (ColumnType::String | ColumnType::Text, _) => "TEXT".to_owned(),
    (ColumnType::Integer, _) => "INTEGER".to_owned(),
    (ColumnType::SmallInteger, _) => "SMALLINT".to_owned(),
    (ColumnType::Timestamp, _) => "TIMESTAMP".to_owned(),
    (ColumnType::Binary, _) => "BLOB".to_owned(),
  }
}

/// The column definition as it appears inside `CREATE TABLE` or
/// `ALTER TABLE ... ADD COLUMN`.
pub fn column_definition(column: &Column) -> String {
  let name = quote(&column.name);
  let mut sql = format!("{name} {}", sql_type(column));

  if !column.null {
    sql.push_str(" NOT NULL");
  }

  match column.ty {
    ColumnType::String => {
      if let Some(limit) = column.limit {
        sql.push_str(&format!(" CHECK (length({name}) <= {limit})"));
      }
    }
    ColumnType::SmallInteger => {
      let (min, max) = if column.signed { (-32768, 32767) } else { (0, 65535) };
      sql.push_str(&format!(" CHECK ({name} BETWEEN {min} AND {max})"));
    }
    _ => {}
  }

  if let Some(comment) = &column.comment {
    sql.push_str(&format!(" /* {} */", comment.replace("*/", "* /")));
  }
  sql
}

fn foreign_key_clause(fk: &ForeignKey) -> String {
  format!(
    "FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {} ON UPDATE {}",
    quote(&fk.column),
    quote(&fk.ref_table),
    quote(&fk.ref_column),
    fk.on_delete.as_sql(),
    fk.on_update.as_sql(),
  )
}

// ─── Tables ──────────────────────────────────────────────────────────────────

fn create_table_as(def: &TableDef, name: &str) -> String {
  let mut lines: Vec<String> = def.columns.iter().map(column_definition).collect();

  let key: Vec<String> = def.primary_key.iter().map(|c| quote(c)).collect();
  lines.push(format!("PRIMARY KEY ({})", key.join(", ")));
  lines.extend(def.foreign_keys.iter().map(foreign_key_clause));

  format!("CREATE TABLE {} (\n  {}\n)", quote(name), lines.join(",\n  "))
}

fn index_name(table: &str, column: &str) -> String { format!("{table}_{column}_idx") }

/// One index per foreign-key column, except where the primary key already
/// leads with that column.
fn foreign_key_indexes(def: &TableDef) -> Vec<String> {
  def
    .foreign_keys
    .iter()
    .filter(|fk| def.primary_key.first() != Some(&fk.column))
    .map(|fk| {
      format!(
        "CREATE INDEX {} ON {} ({})",
        quote(&index_name(&def.name, &fk.column)),
        quote(&def.name),
        quote(&fk.column),
      )
    })
    .collect()
}

/// `CREATE TABLE` followed by its indexes.
pub fn create_table(def: &TableDef) -> Vec<String> {
  let mut statements = vec![create_table_as(def, &def.name)];
  statements.extend(foreign_key_indexes(def));
  statements
}

/// SQLite cannot alter constraints in place. Build a shadow table with the
/// new definition, copy the rows across and swap it in. Foreign-key
/// enforcement must be off while this runs.
fn rebuild(def: &TableDef) -> Vec<String> {
  let shadow = format!("{REBUILD_PREFIX}{}", def.name);
  let columns: Vec<String> = def.column_names().map(quote).collect();
  let columns = columns.join(", ");

  let mut statements = vec![
    create_table_as(def, &shadow),
    format!(
      "INSERT INTO {} ({columns}) SELECT {columns} FROM {}",
      quote(&shadow),
      quote(&def.name),
    ),
    format!("DROP TABLE {}", quote(&def.name)),
    format!("ALTER TABLE {} RENAME TO {}", quote(&shadow), quote(&def.name)),
  ];
  statements.extend(foreign_key_indexes(def));
  statements
}

/// Render `op`. `after` is the model with `op` already applied; it supplies
/// the full table definition when a rebuild is needed.
pub fn render(op: &SchemaOp, after: &Schema) -> Result<Vec<String>> {
  let statements = match op {
    SchemaOp::CreateTable(def) => create_table(def),
    SchemaOp::DropTable { table } => vec![format!("DROP TABLE {}", quote(table))],
    SchemaOp::AddColumn { table, column } => vec![format!(
      "ALTER TABLE {} ADD COLUMN {}",
      quote(table),
      column_definition(column),
    )],
    SchemaOp::RemoveColumn { table, column } => vec![format!(
      "ALTER TABLE {} DROP COLUMN {}",
      quote(table),
      quote(column),
    )],
    SchemaOp::AddForeignKey { table, .. } | SchemaOp::DropForeignKey { table, .. } => {
      let def = after
        .table(table)
        .ok_or_else(|| CoreError::NoSuchTable(table.clone()))?;
      rebuild(def)
    }
  };
  Ok(statements)
}

/// `CREATE TABLE` statements for a whole model, parents before children.
pub fn render_schema(schema: &Schema) -> Vec<String> {
  let mut emitted: Vec<&str> = Vec::new();
  let mut remaining: Vec<&TableDef> = schema.tables().collect();
  let mut statements = Vec::new();

  while !remaining.is_empty() {
    let before = remaining.len();
    remaining.retain(|&def| {
      let ready = def
        .foreign_keys
        .iter()
        .all(|fk| fk.ref_table == def.name || emitted.contains(&fk.ref_table.as_str()));
      if ready {
        statements.extend(create_table(def));
        emitted.push(def.name.as_str());
      }
      !ready
    });
    // A reference cycle; emit the rest as they come.
    if remaining.len() == before {
      for def in remaining.drain(..) {
        statements.extend(create_table(def));
      }
    }
  }
  statements
}
