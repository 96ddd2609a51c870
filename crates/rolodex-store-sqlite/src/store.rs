//! [`SqliteStore`]: the SQLite implementation of [`ContactStore`].

use std::path::Path;

use rolodex_core::{
  changeset::Sequence,
  contact::{Contact, ContactUid, NewProperty, Property},
  migrations,
  property::PropertyKind,
  store::ContactStore,
  tables::{CONTACT, MEDIATYPE, PREF, PROP_GROUP, TYPE_NAME, UID, VALUETYPE},
};
use rusqlite::{OptionalExtension as _, types::Value};

use crate::{
  Error, Result,
  encode::{RawContact, encode_dt, quote},
  introspect::{self, TableInfo},
  migrate::Migrator,
  schema::BOOKKEEPING,
  sequence,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A contact database backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a database at `path` and make sure the runner's
  /// bookkeeping tables exist. No changeset is applied.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_bookkeeping().await?;
    Ok(store)
  }

  /// Open an in-memory database, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_bookkeeping().await?;
    Ok(store)
  }

  async fn init_bookkeeping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(BOOKKEEPING)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// A runner over the shipped changesets.
  pub fn migrator(&self) -> Result<Migrator> {
    Ok(self.migrator_for(migrations::sequence()?))
  }

  /// A runner over an arbitrary sequence.
  pub fn migrator_for(&self, sequence: Sequence) -> Migrator {
    Migrator::new(self.conn.clone(), sequence)
  }

  /// The contact tables as SQLite currently reports them.
  pub async fn describe(&self) -> Result<Vec<TableInfo>> {
    Ok(self.conn.call(|conn| Ok(introspect::tables(conn)?)).await?)
  }
}

// ─── Property SQL ────────────────────────────────────────────────────────────

/// Column/value pairs for inserting `input` with surrogate key `id`.
fn property_values(input: &NewProperty, id: i64) -> Vec<(&'static str, Value)> {
  let kind = input.kind;
  let text = |s: &Option<String>| s.clone().map_or(Value::Null, Value::Text);

  let mut values = vec![
    (kind.key_column(), Value::Integer(id)),
    (UID, Value::Text(input.uid.to_string())),
    (kind.value_column(), Value::Text(input.value.clone())),
  ];
  values.extend(input.fields.iter().map(|(c, v)| (*c, Value::Text(v.clone()))));

  if kind.has_pref() {
    values.push((PREF, input.pref.map_or(Value::Null, |p| Value::Integer(p.into()))));
  }
  if kind.has_media_type() {
    values.push((MEDIATYPE, text(&input.media_type)));
  }
  if kind.has_value_type() {
    values.push((VALUETYPE, text(&input.value_type)));
  }
  if kind.has_prop_group() {
    values.push((PROP_GROUP, text(&input.group)));
  }
  values
}

/// Select one kind's instances for a contact with their labels, one row per
/// (instance, label), most preferred first.
fn list_sql(kind: PropertyKind) -> String {
  let key = quote(kind.key_column());
  let optional = |present: bool, column: &str| {
    if present { format!("p.{}", quote(column)) } else { "NULL".to_owned() }
  };
  let mut order = if kind.has_pref() {
    format!("p.{pref} IS NULL, p.{pref}, p.{key}", pref = quote(PREF))
  } else {
    format!("p.{key}")
  };
  let (labels, label_join) = match kind.rel_types_table() {
    Some(rel) => {
      let label = format!("r.{}", quote(TYPE_NAME));
      order.push_str(&format!(", {label}"));
      (label, format!("LEFT JOIN {} r ON r.{key} = p.{key}", quote(rel)))
    }
    None => ("NULL".to_owned(), String::new()),
  };

  format!(
    "SELECT p.{key}, p.{value}, {pref}, {media}, {value_type}, {group}, {labels}
     FROM {contact} c
     JOIN {table} p ON p.{uid} = c.{uid}
     {label_join}
     WHERE c.{uid} = ?1
     ORDER BY {order}",
    value = quote(kind.value_column()),
    pref = optional(kind.has_pref(), PREF),
    media = optional(kind.has_media_type(), MEDIATYPE),
    value_type = optional(kind.has_value_type(), VALUETYPE),
    group = optional(kind.has_prop_group(), PROP_GROUP),
    contact = quote(CONTACT),
    table = quote(kind.table()),
    uid = quote(UID),
  )
}

struct RawPropertyRow {
  id:         i64,
  value:      Option<String>,
  pref:       Option<u16>,
  media_type: Option<String>,
  value_type: Option<String>,
  group:      Option<String>,
  label:      Option<String>,
}

// ─── ContactStore impl ───────────────────────────────────────────────────────

impl ContactStore for SqliteStore {
  type Error = Error;

  // ── Contacts ──────────────────────────────────────────────────────────────

  async fn insert_contact(&self, contact: Contact) -> Result<()> {
    let bday = contact.bday.map(encode_dt);
    let anniversary = contact.anniversary.map(encode_dt);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO \"CONTACT\" (
             \"UID\", \"KIND\", \"FN\", \"BDAY\", \"ANNIVERSARY\",
             \"REV\", \"SORT_STRING\", \"VERSION\"
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            contact.uid.as_str(),
            contact.kind,
            contact.formatted_name,
            bday,
            anniversary,
            contact.rev,
            contact.sort_string,
            contact.version,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_contact(&self, uid: ContactUid) -> Result<Option<Contact>> {
    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT \"UID\", \"KIND\", \"FN\", \"BDAY\", \"ANNIVERSARY\",
                    \"REV\", \"SORT_STRING\", \"VERSION\"
             FROM \"CONTACT\" WHERE \"UID\" = ?1",
            rusqlite::params![uid.as_str()],
            |row| {
              Ok(RawContact {
                uid:         row.get(0)?,
                kind:        row.get(1)?,
                fn_:         row.get(2)?,
                bday:        row.get(3)?,
                anniversary: row.get(4)?,
                rev:         row.get(5)?,
                sort_string: row.get(6)?,
                version:     row.get(7)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }

  async fn delete_contact(&self, uid: ContactUid) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM \"CONTACT\" WHERE \"UID\" = ?1",
          rusqlite::params![uid.as_str()],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }

  async fn rename_contact(&self, from: ContactUid, to: ContactUid) -> Result<bool> {
    let renamed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE \"CONTACT\" SET \"UID\" = ?2 WHERE \"UID\" = ?1",
          rusqlite::params![from.as_str(), to.as_str()],
        )?)
      })
      .await?;
    Ok(renamed > 0)
  }

  // ── Properties ────────────────────────────────────────────────────────────

  async fn insert_property(&self, input: NewProperty) -> Result<Property> {
    input.validate()?;
    let kind = input.kind;
    let template = input.clone();

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let id = sequence::next_id(&tx, kind.table(), kind.key_column())?;

        let (columns, values): (Vec<_>, Vec<_>) =
          property_values(&template, id).into_iter().unzip();
        let columns: Vec<String> = columns.into_iter().map(quote).collect();
        let placeholders: Vec<String> =
          (1..=values.len()).map(|i| format!("?{i}")).collect();

        tx.execute(
          &format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote(kind.table()),
            columns.join(", "),
            placeholders.join(", "),
          ),
          rusqlite::params_from_iter(values),
        )?;
        tx.commit()?;
        Ok(id)
      })
      .await?;

    Ok(Property {
      id,
      uid: input.uid,
      kind,
      value: Some(input.value),
      pref: input.pref,
      media_type: input.media_type,
      value_type: input.value_type,
      group: input.group,
      types: Vec::new(),
    })
  }

  async fn add_type_label(&self, kind: PropertyKind, id: i64, label: String) -> Result<()> {
    let rel = kind.rel_types_table().ok_or(Error::NoTypeRelation(kind))?;
    let sql = format!(
      "INSERT INTO {} ({}, {}) VALUES (?1, ?2)",
      quote(rel),
      quote(kind.key_column()),
      quote(TYPE_NAME),
    );

    self
      .conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params![id, label])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn type_labels(&self, kind: PropertyKind, id: i64) -> Result<Vec<String>> {
    let rel = kind.rel_types_table().ok_or(Error::NoTypeRelation(kind))?;
    let sql = format!(
      "SELECT {name} FROM {} WHERE {} = ?1 ORDER BY {name}",
      quote(rel),
      quote(kind.key_column()),
      name = quote(TYPE_NAME),
    );

    let labels = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(labels)
  }

  async fn list_properties(
    &self,
    uid: ContactUid,
    kind: PropertyKind,
  ) -> Result<Vec<Property>> {
    let sql = list_sql(kind);
    let uid_str = uid.to_string();

    let rows: Vec<RawPropertyRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![uid_str], |row| {
            Ok(RawPropertyRow {
              id:         row.get(0)?,
              value:      row.get(1)?,
              pref:       row.get(2)?,
              media_type: row.get(3)?,
              value_type: row.get(4)?,
              group:      row.get(5)?,
              label:      row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    // The key breaks every tie, so rows of one instance are adjacent.
    let mut properties: Vec<Property> = Vec::new();
    for row in rows {
      match properties.last_mut() {
        Some(last) if last.id == row.id => last.types.extend(row.label),
        _ => properties.push(Property {
          id:         row.id,
          uid:        uid.clone(),
          kind,
          value:      row.value,
          pref:       row.pref,
          media_type: row.media_type,
          value_type: row.value_type,
          group:      row.group,
          types:      row.label.into_iter().collect(),
        }),
      }
    }
    Ok(properties)
  }
}
