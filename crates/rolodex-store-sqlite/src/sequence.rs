//! Per-table surrogate key allocation.

use rusqlite::Connection;

use crate::encode::quote;

/// Hand out the next key for `table`. Keys are strictly increasing and are
/// never reused, even after the table has been dropped and recreated.
///
/// The first allocation for a table starts above any key already present.
/// Call inside the transaction that inserts the row, so a failed insert
/// does not consume a key.
pub fn next_id(conn: &Connection, table: &str, key: &str) -> rusqlite::Result<i64> {
  let sql = format!(
    "INSERT INTO rolodex_sequences (table_name, last_id)
     VALUES (?1, (SELECT COALESCE(MAX({key}), 0) FROM {table}) + 1)
     ON CONFLICT (table_name) DO UPDATE
       SET last_id = MAX(last_id + 1, excluded.last_id)
     RETURNING last_id",
    key = quote(key),
    table = quote(table),
  );
  conn.query_row(&sql, rusqlite::params![table], |row| row.get(0))
}
