//! Reading the live table layout back out of SQLite.

use rusqlite::Connection;

/// A contact table as the engine reports it. Bookkeeping tables and SQLite
/// internals are excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
  pub name:         String,
  pub columns:      Vec<ColumnInfo>,
  pub foreign_keys: Vec<ForeignKeyInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
  pub name:      String,
  /// Declared type, e.g. `VARCHAR(45)`.
  pub decl_type: String,
  pub not_null:  bool,
  /// 1-based position in the primary key, 0 when not part of it.
  pub pk:        u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyInfo {
  pub column:     String,
  pub ref_table:  String,
  pub ref_column: String,
  pub on_delete:  String,
  pub on_update:  String,
}

impl TableInfo {
  pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
    self.columns.iter().find(|c| c.name == name)
  }

  pub fn has_column(&self, name: &str) -> bool { self.column(name).is_some() }

  pub fn foreign_key(&self, column: &str) -> Option<&ForeignKeyInfo> {
    self.foreign_keys.iter().find(|fk| fk.column == column)
  }
}

/// All contact tables, sorted by name.
pub fn tables(conn: &Connection) -> rusqlite::Result<Vec<TableInfo>> {
  let mut stmt = conn.prepare(
    "SELECT name FROM sqlite_schema
     WHERE type = 'table'
       AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'
       AND name NOT LIKE 'rolodex\\_%' ESCAPE '\\'
     ORDER BY name",
  )?;
  let names = stmt
    .query_map([], |row| row.get::<_, String>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  names.into_iter().map(|name| table(conn, name)).collect()
}

fn table(conn: &Connection, name: String) -> rusqlite::Result<TableInfo> {
  let mut stmt = conn.prepare(
    "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1) ORDER BY cid",
  )?;
  let columns = stmt
    .query_map(rusqlite::params![name], |row| {
      Ok(ColumnInfo {
        name:      row.get(0)?,
        decl_type: row.get(1)?,
        not_null:  row.get(2)?,
        pk:        row.get(3)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut stmt = conn.prepare(
    "SELECT \"from\", \"table\", \"to\", on_delete, on_update
     FROM pragma_foreign_key_list(?1) ORDER BY id, seq",
  )?;
  let foreign_keys = stmt
    .query_map(rusqlite::params![name], |row| {
      Ok(ForeignKeyInfo {
        column:     row.get(0)?,
        ref_table:  row.get(1)?,
        ref_column: row.get(2)?,
        on_delete:  row.get(3)?,
        on_update:  row.get(4)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(TableInfo { name, columns, foreign_keys })
}
