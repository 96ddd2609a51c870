//! Row types for `CONTACT` and the property tables.
//!
//! These exist so the referential rules of the schema can be exercised; they
//! are not a vCard object model.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, property::PropertyKind, tables::UID_LIMIT};

// ─── Uid ─────────────────────────────────────────────────────────────────────

/// The `CONTACT.UID` key: non-empty, at most 45 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContactUid(String);

impl ContactUid {
  pub fn new(uid: impl Into<String>) -> Result<Self> {
    let uid = uid.into();
    if uid.is_empty() {
      return Err(Error::InvalidUid { uid, reason: "empty" });
    }
    if uid.chars().count() > UID_LIMIT as usize {
      return Err(Error::InvalidUid { uid, reason: "longer than 45 characters" });
    }
    Ok(Self(uid))
  }

  /// A fresh random UID (hyphenated UUID v4).
  pub fn generate() -> Self { Self(Uuid::new_v4().hyphenated().to_string()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ContactUid {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for ContactUid {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::new(value) }
}

impl From<ContactUid> for String {
  fn from(uid: ContactUid) -> Self { uid.0 }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A `CONTACT` row, restricted to the columns every schema version has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  pub uid:            ContactUid,
  pub kind:           Option<String>,
  /// vCard `FN`.
  pub formatted_name: String,
  pub bday:           Option<DateTime<Utc>>,
  pub anniversary:    Option<DateTime<Utc>>,
  pub rev:            Option<String>,
  pub sort_string:    Option<String>,
  pub version:        Option<String>,
}

impl Contact {
  pub fn new(uid: ContactUid, formatted_name: impl Into<String>) -> Self {
    Self {
      uid,
      kind: None,
      formatted_name: formatted_name.into(),
      bday: None,
      anniversary: None,
      rev: None,
      sort_string: None,
      version: None,
    }
  }
}

// ─── Properties ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::ContactStore::insert_property`]. The surrogate
/// key is always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewProperty {
  pub uid:        ContactUid,
  pub kind:       PropertyKind,
  /// Goes into [`PropertyKind::value_column`].
  pub value:      String,
  /// Secondary value columns, e.g. `LOCALITY` for an address.
  pub fields:     BTreeMap<&'static str, String>,
  pub pref:       Option<u16>,
  pub media_type: Option<String>,
  pub value_type: Option<String>,
  pub group:      Option<String>,
}

impl NewProperty {
  pub fn new(uid: ContactUid, kind: PropertyKind, value: impl Into<String>) -> Self {
    Self {
      uid,
      kind,
      value: value.into(),
      fields: BTreeMap::new(),
      pref: None,
      media_type: None,
      value_type: None,
      group: None,
    }
  }

  pub fn with_pref(mut self, pref: u16) -> Self {
    self.pref = Some(pref);
    self
  }

  pub fn with_group(mut self, group: impl Into<String>) -> Self {
    self.group = Some(group.into());
    self
  }

  pub fn with_field(mut self, column: &'static str, value: impl Into<String>) -> Self {
    self.fields.insert(column, value.into());
    self
  }

  /// Reject columns the target table does not have.
  pub fn validate(&self) -> Result<()> {
    let kind = self.kind;
    let unsupported = |column| Err(Error::Unsupported { kind, column });

    if self.pref.is_some() && !kind.has_pref() {
      return unsupported("PREF");
    }
    if self.media_type.is_some() && !kind.has_media_type() {
      return unsupported("MEDIATYPE");
    }
    if self.value_type.is_some() && !kind.has_value_type() {
      return unsupported("VALUETYPE");
    }
    if self.group.is_some() && !kind.has_prop_group() {
      return unsupported("PROP_GROUP");
    }
    let secondary = &kind.value_columns()[1..];
    if let Some(column) = self.fields.keys().find(|c| !secondary.contains(c)) {
      return unsupported(column);
    }
    Ok(())
  }
}

/// A stored property instance with its type labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
  pub id:         i64,
  pub uid:        ContactUid,
  pub kind:       PropertyKind,
  pub value:      Option<String>,
  pub pref:       Option<u16>,
  pub media_type: Option<String>,
  pub value_type: Option<String>,
  pub group:      Option<String>,
  /// Sorted, unique.
  pub types:      Vec<String>,
}
