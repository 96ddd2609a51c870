//! Table and shared column names of the contact schema.

pub const CONTACT: &str = "CONTACT";

pub const CONTACT_GEO: &str = "CONTACT_GEO";
pub const CONTACT_RELATED: &str = "CONTACT_RELATED";
pub const CONTACT_N: &str = "CONTACT_N";
pub const CONTACT_ADR: &str = "CONTACT_ADR";
pub const CONTACT_TEL: &str = "CONTACT_TEL";
pub const CONTACT_EMAIL: &str = "CONTACT_EMAIL";
pub const CONTACT_CATEGORIES: &str = "CONTACT_CATEGORIES";
pub const CONTACT_NOTE: &str = "CONTACT_NOTE";
pub const CONTACT_XTENDED: &str = "CONTACT_XTENDED";
pub const CONTACT_DATA: &str = "CONTACT_DATA";
pub const CONTACT_ORG: &str = "CONTACT_ORG";
pub const CONTACT_URL: &str = "CONTACT_URL";
pub const CONTACT_NICKNAME: &str = "CONTACT_NICKNAME";
pub const CONTACT_TZ: &str = "CONTACT_TZ";
pub const CONTACT_ROLE: &str = "CONTACT_ROLE";
pub const CONTACT_TITLE: &str = "CONTACT_TITLE";

/// Contact key, shared by `CONTACT` and every property table.
pub const UID: &str = "UID";
pub const UID_LIMIT: u32 = 45;

pub const PREF: &str = "PREF";
pub const MEDIATYPE: &str = "MEDIATYPE";
pub const VALUETYPE: &str = "VALUETYPE";
pub const PROP_GROUP: &str = "PROP_GROUP";
pub const TYPE_NAME: &str = "TYPE_NAME";

/// Tables that received a `PROP_GROUP` column: every multi-valued property
/// table. `CONTACT_N` is single-valued and stays out.
///
/// Fixed when the changeset was written; never derived from the live schema.
pub const PROP_GROUP_TABLES: [&str; 15] = [
  CONTACT_GEO,
  CONTACT_RELATED,
  CONTACT_ADR,
  CONTACT_TEL,
  CONTACT_EMAIL,
  CONTACT_CATEGORIES,
  CONTACT_NOTE,
  CONTACT_XTENDED,
  CONTACT_DATA,
  CONTACT_ORG,
  CONTACT_URL,
  CONTACT_NICKNAME,
  CONTACT_TZ,
  CONTACT_ROLE,
  CONTACT_TITLE,
];

/// Name of the type-label table belonging to `table`.
pub fn rel_types_table(table: &str) -> String { format!("{table}_REL_TYPES") }
