//! Encoding and decoding helpers between Rust types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings.

use chrono::{DateTime, Utc};
use rolodex_core::{
  changeset::Version,
  contact::{Contact, ContactUid},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Quote an identifier for use in SQL text.
pub fn quote(ident: &str) -> String { format!("\"{}\"", ident.replace('"', "\"\"")) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `CONTACT` row.
pub struct RawContact {
  pub uid:         String,
  pub kind:        Option<String>,
  pub fn_:         String,
  pub bday:        Option<String>,
  pub anniversary: Option<String>,
  pub rev:         Option<String>,
  pub sort_string: Option<String>,
  pub version:     Option<String>,
}

impl RawContact {
  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      uid:            ContactUid::new(self.uid)?,
      kind:           self.kind,
      formatted_name: self.fn_,
      bday:           self.bday.as_deref().map(decode_dt).transpose()?,
      anniversary:    self.anniversary.as_deref().map(decode_dt).transpose()?,
      rev:            self.rev,
      sort_string:    self.sort_string,
      version:        self.version,
    })
  }
}

/// Raw values read from a `rolodex_migrations` row.
pub struct RawApplied {
  pub version:    i64,
  pub checksum:   String,
  pub applied_at: String,
}

/// A decoded `rolodex_migrations` row.
pub struct Applied {
  pub version:    Version,
  pub checksum:   String,
  pub applied_at: DateTime<Utc>,
}

impl RawApplied {
  pub fn into_applied(self) -> Result<Applied> {
    Ok(Applied {
      version:    Version(self.version),
      checksum:   self.checksum,
      applied_at: decode_dt(&self.applied_at)?,
    })
  }
}
