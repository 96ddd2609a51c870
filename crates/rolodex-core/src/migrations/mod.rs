//! The changesets that build the contact schema, oldest first.

mod create_contact_tables;
mod extract_contact_columns;
mod org_xtended_rel_types;
mod prop_group;

use crate::{
  Result,
  changeset::{Changeset, Sequence},
  column::{ColumnOptions, ColumnType},
  plan::{Plan, TableBuilder},
  table::{ForeignKeyOptions, TableOptions},
  tables::{CONTACT, PREF, TYPE_NAME, UID, UID_LIMIT, rel_types_table},
};

pub static CHANGESETS: &[Changeset] = &[
  Changeset::change(
    20140301120000,
    "create_contact_tables",
    create_contact_tables::change,
  ),
  Changeset::change(
    20140415093000,
    "add_org_and_xtended_rel_types",
    org_xtended_rel_types::change,
  ),
  Changeset::up_down(
    20140602101500,
    "extract_contact_url",
    extract_contact_columns::url_up,
    extract_contact_columns::url_down,
  ),
  Changeset::up_down(
    20140602103000,
    "extract_contact_nickname",
    extract_contact_columns::nickname_up,
    extract_contact_columns::nickname_down,
  ),
  Changeset::up_down(
    20140602104500,
    "extract_contact_tz",
    extract_contact_columns::tz_up,
    extract_contact_columns::tz_down,
  ),
  Changeset::up_down(
    20140602110000,
    "extract_contact_role",
    extract_contact_columns::role_up,
    extract_contact_columns::role_down,
  ),
  Changeset::up_down(
    20140602111500,
    "extract_contact_title",
    extract_contact_columns::title_up,
    extract_contact_columns::title_down,
  ),
  Changeset::up_down(
    20140910160000,
    "add_prop_group",
    prop_group::up,
    prop_group::down,
  ),
];

/// The shipped changesets as a validated [`Sequence`].
pub fn sequence() -> Result<Sequence> { Sequence::new(CHANGESETS) }

// ─── Shared column shapes ────────────────────────────────────────────────────

fn uid() -> ColumnOptions { ColumnOptions::new().limit(UID_LIMIT) }

fn optional() -> ColumnOptions { ColumnOptions::new().nullable() }

/// Start a property table: surrogate key, `UID` and the cascading reference
/// to `CONTACT`.
fn property_table<'p>(p: &'p mut Plan, table: &str, key: &str) -> TableBuilder<'p> {
  p.table(table, TableOptions::surrogate(key))
    .add_column(UID, ColumnType::String, uid())
    .add_foreign_key(UID, CONTACT, UID, ForeignKeyOptions::cascade())
}

fn with_pref(builder: TableBuilder<'_>) -> TableBuilder<'_> {
  builder.add_column(PREF, ColumnType::SmallInteger, optional().unsigned())
}

/// `<table>_REL_TYPES`: one row per (instance, label).
fn create_rel_types(p: &mut Plan, table: &str, key: &str) {
  p.table(&rel_types_table(table), TableOptions::keyed(&[key, TYPE_NAME]))
    .add_column(key, ColumnType::Integer, ColumnOptions::new().unsigned())
    .add_column(TYPE_NAME, ColumnType::String, ColumnOptions::new().limit(45))
    .add_foreign_key(key, table, key, ForeignKeyOptions::cascade())
    .create();
}
