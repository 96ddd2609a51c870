//! vCard property kinds and where each one lives in the latest schema.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

use crate::tables::*;

/// One multi-valued vCard property, stored in its own child table.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Display,
  EnumIter,
  IntoStaticStr,
  Serialize,
  Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
  Geo,
  Related,
  /// Structured name; single-valued, no labels, no preference.
  N,
  Adr,
  Tel,
  Email,
  Categories,
  Note,
  /// `X-` extension properties.
  Xtended,
  /// Binary-ish properties: PHOTO, LOGO, SOUND, KEY.
  Data,
  Org,
  Url,
  Nickname,
  Tz,
  Role,
  Title,
}

impl PropertyKind {
  pub fn table(self) -> &'static str {
    match self {
      Self::Geo => CONTACT_GEO,
      Self::Related => CONTACT_RELATED,
      Self::N => CONTACT_N,
      Self::Adr => CONTACT_ADR,
      Self::Tel => CONTACT_TEL,
      Self::Email => CONTACT_EMAIL,
      Self::Categories => CONTACT_CATEGORIES,
      Self::Note => CONTACT_NOTE,
      Self::Xtended => CONTACT_XTENDED,
      Self::Data => CONTACT_DATA,
      Self::Org => CONTACT_ORG,
      Self::Url => CONTACT_URL,
      Self::Nickname => CONTACT_NICKNAME,
      Self::Tz => CONTACT_TZ,
      Self::Role => CONTACT_ROLE,
      Self::Title => CONTACT_TITLE,
    }
  }

  /// The surrogate key column, e.g. `TEL_ID`.
  pub fn key_column(self) -> &'static str {
    match self {
      Self::Geo => "GEO_ID",
      Self::Related => "RELATED_ID",
      Self::N => "N_ID",
      Self::Adr => "ADR_ID",
      Self::Tel => "TEL_ID",
      Self::Email => "EMAIL_ID",
      Self::Categories => "CATEGORIES_ID",
      Self::Note => "NOTE_ID",
      Self::Xtended => "XTENDED_ID",
      Self::Data => "DATA_ID",
      Self::Org => "ORG_ID",
      Self::Url => "URL_ID",
      Self::Nickname => "NICKNAME_ID",
      Self::Tz => "TZ_ID",
      Self::Role => "ROLE_ID",
      Self::Title => "TITLE_ID",
    }
  }

  /// Value columns, primary value first.
  pub fn value_columns(self) -> &'static [&'static str] {
    match self {
      Self::Geo => &["GEO"],
      Self::Related => &["RELATED"],
      Self::N => &[
        "FAMILY_NAME",
        "GIVEN_NAME",
        "ADDITIONAL_NAMES",
        "HONORIFIC_PREFIXES",
        "HONORIFIC_SUFFIXES",
      ],
      Self::Adr => &[
        "STREET",
        "PO_BOX",
        "EXTENDED_ADDRESS",
        "LOCALITY",
        "REGION",
        "POSTAL_CODE",
        "COUNTRY",
        "LABEL",
      ],
      Self::Tel => &["TEL"],
      Self::Email => &["EMAIL"],
      Self::Categories => &["CATEGORY"],
      Self::Note => &["NOTE"],
      Self::Xtended => &["XVALUE", "XNAME"],
      Self::Data => &["RAW_VALUE", "DATA_NAME", "URL"],
      Self::Org => &["NAME", "UNIT1", "UNIT2"],
      Self::Url => &["URL"],
      Self::Nickname => &["NICKNAME"],
      Self::Tz => &["TZ"],
      Self::Role => &["ROLE"],
      Self::Title => &["TITLE"],
    }
  }

  /// The column holding the property's primary value.
  pub fn value_column(self) -> &'static str { self.value_columns()[0] }

  /// The companion type-label table, if this property carries labels.
  pub fn rel_types_table(self) -> Option<&'static str> {
    match self {
      Self::N => None,
      Self::Geo => Some("CONTACT_GEO_REL_TYPES"),
      Self::Related => Some("CONTACT_RELATED_REL_TYPES"),
      Self::Adr => Some("CONTACT_ADR_REL_TYPES"),
      Self::Tel => Some("CONTACT_TEL_REL_TYPES"),
      Self::Email => Some("CONTACT_EMAIL_REL_TYPES"),
      Self::Categories => Some("CONTACT_CATEGORIES_REL_TYPES"),
      Self::Note => Some("CONTACT_NOTE_REL_TYPES"),
      Self::Xtended => Some("CONTACT_XTENDED_REL_TYPES"),
      Self::Data => Some("CONTACT_DATA_REL_TYPES"),
      Self::Org => Some("CONTACT_ORG_REL_TYPES"),
      Self::Url => Some("CONTACT_URL_REL_TYPES"),
      Self::Nickname => Some("CONTACT_NICKNAME_REL_TYPES"),
      Self::Tz => Some("CONTACT_TZ_REL_TYPES"),
      Self::Role => Some("CONTACT_ROLE_REL_TYPES"),
      Self::Title => Some("CONTACT_TITLE_REL_TYPES"),
    }
  }

  pub fn has_pref(self) -> bool {
    !matches!(self, Self::N | Self::Org | Self::Xtended | Self::Data)
  }

  pub fn has_media_type(self) -> bool {
    matches!(self, Self::Geo | Self::Related | Self::Data | Self::Url | Self::Tz)
  }

  pub fn has_value_type(self) -> bool {
    matches!(self, Self::Related | Self::Tel | Self::Tz)
  }

  pub fn has_prop_group(self) -> bool { PROP_GROUP_TABLES.contains(&self.table()) }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;
  use crate::{migrations, schema::Schema};

  #[test]
  fn names_follow_the_table_convention() {
    for kind in PropertyKind::iter() {
      let name: &'static str = kind.into();
      assert_eq!(kind.table(), format!("CONTACT_{name}"));
      assert_eq!(kind.key_column(), format!("{name}_ID"));
      if let Some(rel) = kind.rel_types_table() {
        assert_eq!(rel, rel_types_table(kind.table()));
      }
    }
  }

  /// Every accessor must agree with the schema the changesets build.
  #[test]
  fn matches_latest_schema() {
    let schema = Schema::replay(migrations::sequence().unwrap().iter()).unwrap();

    for kind in PropertyKind::iter() {
      let table = schema
        .table(kind.table())
        .unwrap_or_else(|| panic!("missing {}", kind.table()));
      assert_eq!(table.primary_key, [kind.key_column()], "{kind}");
      assert!(table.has_column(UID), "{kind}");
      for column in kind.value_columns() {
        assert!(table.has_column(column), "{kind}.{column}");
      }
      assert_eq!(table.has_column(PREF), kind.has_pref(), "{kind} PREF");
      assert_eq!(table.has_column(MEDIATYPE), kind.has_media_type(), "{kind} MEDIATYPE");
      assert_eq!(table.has_column(VALUETYPE), kind.has_value_type(), "{kind} VALUETYPE");
      assert_eq!(table.has_column(PROP_GROUP), kind.has_prop_group(), "{kind} PROP_GROUP");

      let fk = table.foreign_key(UID).unwrap();
      assert_eq!(fk.ref_table, CONTACT);

      match kind.rel_types_table() {
        Some(rel) => {
          let rel = schema.table(rel).unwrap();
          assert_eq!(rel.primary_key, [kind.key_column(), TYPE_NAME]);
          assert_eq!(rel.foreign_key(kind.key_column()).unwrap().ref_table, kind.table());
        }
        None => assert!(!schema.contains(&rel_types_table(kind.table()))),
      }
    }
  }

  #[test]
  fn exactly_one_property_table_has_no_group() {
    let ungrouped: Vec<_> =
      PropertyKind::iter().filter(|k| !k.has_prop_group()).collect();
    assert_eq!(ungrouped, [PropertyKind::N]);
  }
}
