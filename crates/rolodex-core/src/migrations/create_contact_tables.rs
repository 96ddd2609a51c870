//! Initial schema: `CONTACT`, one table per multi-valued property, and the
//! type-label tables for the properties that carry `TYPE` parameters.

use super::{create_rel_types, optional, property_table, uid, with_pref};
use crate::{
  column::{ColumnOptions, ColumnType},
  plan::Plan,
  table::TableOptions,
  tables::*,
};

pub(super) fn change(p: &mut Plan) {
  p.table(CONTACT, TableOptions::keyed(&[UID]))
    .add_column(UID, ColumnType::String, uid())
    .add_column("KIND", ColumnType::String, optional().limit(20))
    .add_column("FN", ColumnType::String, ColumnOptions::new())
    .add_column("NICKNAME", ColumnType::String, optional())
    .add_column("BDAY", ColumnType::Timestamp, optional())
    .add_column("ANNIVERSARY", ColumnType::Timestamp, optional())
    .add_column("TZ", ColumnType::String, optional())
    .add_column("TITLE", ColumnType::String, optional())
    .add_column("ROLE", ColumnType::String, optional())
    .add_column("URL", ColumnType::String, optional())
    .add_column("REV", ColumnType::String, optional())
    .add_column("SORT_STRING", ColumnType::String, optional())
    .add_column(
      "VERSION",
      ColumnType::String,
      optional().limit(10).comment("vCard version the card was stored as"),
    )
    .create();

  with_pref(
    property_table(p, CONTACT_GEO, "GEO_ID")
      .add_column("GEO", ColumnType::String, ColumnOptions::new())
      .add_column(MEDIATYPE, ColumnType::String, optional()),
  )
  .create();

  with_pref(
    property_table(p, CONTACT_RELATED, "RELATED_ID")
      .add_column("RELATED", ColumnType::String, ColumnOptions::new())
      .add_column(MEDIATYPE, ColumnType::String, optional())
      .add_column(VALUETYPE, ColumnType::String, optional()),
  )
  .create();

  property_table(p, CONTACT_N, "N_ID")
    .add_column("FAMILY_NAME", ColumnType::String, optional())
    .add_column("GIVEN_NAME", ColumnType::String, optional())
    .add_column("ADDITIONAL_NAMES", ColumnType::String, optional())
    .add_column("HONORIFIC_PREFIXES", ColumnType::String, optional())
    .add_column("HONORIFIC_SUFFIXES", ColumnType::String, optional())
    .create();

  with_pref(
    property_table(p, CONTACT_ADR, "ADR_ID")
      .add_column("STREET", ColumnType::String, optional())
      .add_column("PO_BOX", ColumnType::String, optional())
      .add_column("EXTENDED_ADDRESS", ColumnType::String, optional())
      .add_column("LOCALITY", ColumnType::String, optional())
      .add_column("REGION", ColumnType::String, optional())
      .add_column("POSTAL_CODE", ColumnType::String, optional())
      .add_column("COUNTRY", ColumnType::String, optional())
      .add_column("LABEL", ColumnType::Text, optional()),
  )
  .create();

  with_pref(
    property_table(p, CONTACT_TEL, "TEL_ID")
      .add_column("TEL", ColumnType::String, ColumnOptions::new())
      .add_column(VALUETYPE, ColumnType::String, optional()),
  )
  .create();

  with_pref(
    property_table(p, CONTACT_EMAIL, "EMAIL_ID")
      .add_column("EMAIL", ColumnType::String, ColumnOptions::new()),
  )
  .create();

  with_pref(
    property_table(p, CONTACT_CATEGORIES, "CATEGORIES_ID")
      .add_column("CATEGORY", ColumnType::String, ColumnOptions::new()),
  )
  .create();

  with_pref(
    property_table(p, CONTACT_NOTE, "NOTE_ID")
      .add_column("NOTE", ColumnType::Text, ColumnOptions::new()),
  )
  .create();

  property_table(p, CONTACT_XTENDED, "XTENDED_ID")
    .add_column("XVALUE", ColumnType::Text, ColumnOptions::new())
    .add_column("XNAME", ColumnType::String, ColumnOptions::new())
    .create();

  property_table(p, CONTACT_DATA, "DATA_ID")
    .add_column("RAW_VALUE", ColumnType::Text, optional())
    .add_column("DATA_NAME", ColumnType::String, ColumnOptions::new().limit(20))
    .add_column("URL", ColumnType::String, optional())
    .add_column(MEDIATYPE, ColumnType::String, optional())
    .create();

  property_table(p, CONTACT_ORG, "ORG_ID")
    .add_column("NAME", ColumnType::String, ColumnOptions::new())
    .add_column("UNIT1", ColumnType::String, optional())
    .add_column("UNIT2", ColumnType::String, optional())
    .create();

  create_rel_types(p, CONTACT_GEO, "GEO_ID");
  create_rel_types(p, CONTACT_RELATED, "RELATED_ID");
  create_rel_types(p, CONTACT_ADR, "ADR_ID");
  create_rel_types(p, CONTACT_TEL, "TEL_ID");
  create_rel_types(p, CONTACT_EMAIL, "EMAIL_ID");
  create_rel_types(p, CONTACT_CATEGORIES, "CATEGORIES_ID");
  create_rel_types(p, CONTACT_NOTE, "NOTE_ID");
  create_rel_types(p, CONTACT_DATA, "DATA_ID");
}
