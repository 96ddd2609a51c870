//! Move the scalar URL, NICKNAME, TZ, ROLE and TITLE columns out of
//! `CONTACT` into multi-valued child tables.
//!
//! `up` creates the child table and its label table before dropping the
//! `CONTACT` column. Neither direction copies data: `up` does not migrate the
//! scalar values into the new table, and `down` does not copy child rows back
//! into the restored column. Rollback is lossy.

use super::{create_rel_types, optional, property_table, with_pref};
use crate::{
  column::{ColumnOptions, ColumnType},
  plan::Plan,
  table::TableOptions,
  tables::*,
};

/// Drop the label table and the child table, then restore the scalar column
/// as a nullable string.
fn restore(p: &mut Plan, table: &str, column: &str) {
  p.drop_table(&rel_types_table(table));
  p.drop_table(table);
  p.table(CONTACT, TableOptions::default())
    .add_column(column, ColumnType::String, optional())
    .update();
}

fn drop_scalar(p: &mut Plan, column: &str) {
  p.table(CONTACT, TableOptions::default())
    .remove_column(column)
    .update();
}

// ─── URL ─────────────────────────────────────────────────────────────────────

pub(super) fn url_up(p: &mut Plan) {
  with_pref(
    property_table(p, CONTACT_URL, "URL_ID")
      .add_column("URL", ColumnType::String, ColumnOptions::new())
      .add_column(MEDIATYPE, ColumnType::String, optional()),
  )
  .create();
  create_rel_types(p, CONTACT_URL, "URL_ID");
  drop_scalar(p, "URL");
}

pub(super) fn url_down(p: &mut Plan) { restore(p, CONTACT_URL, "URL"); }

// ─── NICKNAME ────────────────────────────────────────────────────────────────

pub(super) fn nickname_up(p: &mut Plan) {
  with_pref(
    property_table(p, CONTACT_NICKNAME, "NICKNAME_ID")
      .add_column("NICKNAME", ColumnType::String, ColumnOptions::new()),
  )
  .create();
  create_rel_types(p, CONTACT_NICKNAME, "NICKNAME_ID");
  drop_scalar(p, "NICKNAME");
}

pub(super) fn nickname_down(p: &mut Plan) {
  restore(p, CONTACT_NICKNAME, "NICKNAME");
}

// ─── TZ ──────────────────────────────────────────────────────────────────────

pub(super) fn tz_up(p: &mut Plan) {
  with_pref(
    property_table(p, CONTACT_TZ, "TZ_ID")
      .add_column("TZ", ColumnType::String, ColumnOptions::new())
      .add_column(VALUETYPE, ColumnType::String, optional())
      .add_column(MEDIATYPE, ColumnType::String, optional()),
  )
  .create();
  create_rel_types(p, CONTACT_TZ, "TZ_ID");
  drop_scalar(p, "TZ");
}

pub(super) fn tz_down(p: &mut Plan) { restore(p, CONTACT_TZ, "TZ"); }

// ─── ROLE ────────────────────────────────────────────────────────────────────

pub(super) fn role_up(p: &mut Plan) {
  with_pref(
    property_table(p, CONTACT_ROLE, "ROLE_ID")
      .add_column("ROLE", ColumnType::String, ColumnOptions::new()),
  )
  .create();
  create_rel_types(p, CONTACT_ROLE, "ROLE_ID");
  drop_scalar(p, "ROLE");
}

pub(super) fn role_down(p: &mut Plan) { restore(p, CONTACT_ROLE, "ROLE"); }

// ─── TITLE ───────────────────────────────────────────────────────────────────

pub(super) fn title_up(p: &mut Plan) {
  with_pref(
    property_table(p, CONTACT_TITLE, "TITLE_ID")
      .add_column("TITLE", ColumnType::String, ColumnOptions::new()),
  )
  .create();
  create_rel_types(p, CONTACT_TITLE, "TITLE_ID");
  drop_scalar(p, "TITLE");
}

/// Restores TITLE. An earlier revision of this rollback dropped the ROLE
/// tables and restored `CONTACT.ROLE` instead, which left TITLE extracted
/// and broke the ROLE rollback that follows it.
pub(super) fn title_down(p: &mut Plan) { restore(p, CONTACT_TITLE, "TITLE"); }
