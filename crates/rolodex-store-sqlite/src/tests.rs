//! Integration tests for `SqliteStore` and `Migrator` against an in-memory
//! database.

use chrono::{TimeZone, Utc};
use rolodex_core::{
  changeset::{Changeset, Direction, Sequence, Version},
  column::{ColumnOptions, ColumnType},
  contact::{Contact, ContactUid, NewProperty},
  migrations::CHANGESETS,
  plan::Plan,
  property::PropertyKind,
  store::ContactStore,
  table::{ForeignKeyOptions, TableOptions},
  tables::*,
};

use strum::IntoEnumIterator as _;

use crate::{ConstraintKind, Drift, Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn migrated() -> SqliteStore {
  let s = store().await;
  s.migrator().unwrap().up(None).await.unwrap();
  s
}

fn uid(s: &str) -> ContactUid { ContactUid::new(s).unwrap() }

fn version_of(name: &str) -> Version {
  CHANGESETS.iter().find(|c| c.name == name).unwrap().version
}

/// The version just before `name`.
fn before(name: &str) -> Version {
  let i = CHANGESETS.iter().position(|c| c.name == name).unwrap();
  if i == 0 { Version::ZERO } else { CHANGESETS[i - 1].version }
}

async fn jane(s: &SqliteStore) {
  s.insert_contact(Contact::new(uid("c1"), "Jane Doe"))
    .await
    .unwrap();
}

// ─── Runner ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fresh_database_migrates_to_latest() {
  let s = store().await;
  let migrator = s.migrator().unwrap();

  let applied = migrator.up(None).await.unwrap();
  assert_eq!(applied.len(), CHANGESETS.len());
  assert_eq!(applied[0], Version(20140301120000));

  let status = migrator.status().await.unwrap();
  assert!(status.iter().all(|c| c.applied_at.is_some()));
  assert!(status.iter().all(|c| c.checksum_matches == Some(true)));

  assert!(migrator.verify().await.unwrap().is_empty());

  // 16 property tables, 15 label tables and CONTACT.
  assert_eq!(s.describe().await.unwrap().len(), 32);
}

#[tokio::test]
async fn up_is_idempotent() {
  let s = migrated().await;
  assert!(s.migrator().unwrap().up(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn up_stops_at_target() {
  let s = store().await;
  let migrator = s.migrator().unwrap();

  let applied = migrator
    .up(Some(version_of("add_org_and_xtended_rel_types")))
    .await
    .unwrap();
  assert_eq!(applied.len(), 2);

  let tables = s.describe().await.unwrap();
  let contact = tables.iter().find(|t| t.name == CONTACT).unwrap();
  assert!(contact.has_column("NICKNAME"));
  assert!(tables.iter().any(|t| t.name == "CONTACT_ORG_REL_TYPES"));
  assert!(!tables.iter().any(|t| t.name == CONTACT_URL));

  assert_eq!(migrator.up(None).await.unwrap().len(), CHANGESETS.len() - 2);
  assert!(migrator.verify().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_target_is_rejected() {
  let s = store().await;
  let err = s
    .migrator()
    .unwrap()
    .up(Some(Version(20140101000000)))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::UnknownVersion(Version(20140101000000))));
  assert!(s.describe().await.unwrap().is_empty());
}

#[tokio::test]
async fn down_without_target_rolls_back_one() {
  let s = migrated().await;
  let migrator = s.migrator().unwrap();

  let rolled_back = migrator.down(None).await.unwrap();
  assert_eq!(rolled_back, [version_of("add_prop_group")]);

  let tables = s.describe().await.unwrap();
  assert!(tables.iter().all(|t| !t.has_column(PROP_GROUP)));
  assert!(migrator.verify().await.unwrap().is_empty());

  let status = migrator.status().await.unwrap();
  assert_eq!(status.last().unwrap().applied_at, None);
  assert_eq!(status.last().unwrap().checksum_matches, None);
}

#[tokio::test]
async fn full_rollback_leaves_only_bookkeeping() {
  let s = migrated().await;
  jane(&s).await;
  s.insert_property(NewProperty::new(uid("c1"), PropertyKind::Tel, "+15550001111"))
    .await
    .unwrap();

  let migrator = s.migrator().unwrap();
  let rolled_back = migrator.down(Some(Version::ZERO)).await.unwrap();
  assert_eq!(rolled_back.len(), CHANGESETS.len());
  assert_eq!(rolled_back[0], version_of("add_prop_group"));

  assert!(s.describe().await.unwrap().is_empty());
  assert!(migrator.current_schema().await.unwrap().is_empty());
  assert!(
    migrator
      .status()
      .await
      .unwrap()
      .iter()
      .all(|c| c.applied_at.is_none())
  );
}

#[tokio::test]
async fn preview_does_not_touch_the_database() {
  let s = store().await;
  let migrator = s.migrator().unwrap();

  let steps = migrator.preview(Direction::Up, None).await.unwrap();
  assert_eq!(steps.len(), CHANGESETS.len());
  assert!(steps[0].statements[0].starts_with("CREATE TABLE \"CONTACT\" ("));
  assert!(
    steps
      .iter()
      .find(|s| s.name == "extract_contact_nickname")
      .unwrap()
      .statements
      .iter()
      .any(|sql| sql == "ALTER TABLE \"CONTACT\" DROP COLUMN \"NICKNAME\"")
  );

  assert!(s.describe().await.unwrap().is_empty());
  assert!(migrator.status().await.unwrap().iter().all(|c| c.applied_at.is_none()));
}

#[tokio::test]
async fn preview_down_lists_newest_first() {
  let s = migrated().await;
  let steps = s
    .migrator()
    .unwrap()
    .preview(Direction::Down, Some(before("extract_contact_role")))
    .await
    .unwrap();

  let names: Vec<_> = steps.iter().map(|s| s.name).collect();
  assert_eq!(names, ["add_prop_group", "extract_contact_title", "extract_contact_role"]);
  assert_eq!(s.describe().await.unwrap().len(), 32);
}

#[tokio::test]
async fn checksum_drift_is_reported_not_fatal() {
  let s = migrated().await;
  s.conn
    .call(|conn| {
      conn.execute(
        "UPDATE rolodex_migrations SET checksum = 'stale' WHERE version = ?1",
        rusqlite::params![20140301120000_i64],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let migrator = s.migrator().unwrap();
  let status = migrator.status().await.unwrap();
  assert_eq!(status[0].checksum_matches, Some(false));
  assert_eq!(status[1].checksum_matches, Some(true));

  assert_eq!(
    migrator.verify().await.unwrap(),
    [Drift::Checksum(Version(20140301120000))]
  );
  assert!(migrator.down(None).await.is_ok());
}

#[tokio::test]
async fn verify_reports_live_drift() {
  let s = migrated().await;
  s.conn
    .call(|conn| {
      conn.execute_batch(
        "DROP TABLE \"CONTACT_NOTE_REL_TYPES\";
         ALTER TABLE \"CONTACT\" ADD COLUMN \"MAILER\" TEXT;",
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let drift = s.migrator().unwrap().verify().await.unwrap();
  assert_eq!(
    drift,
    [
      Drift::UnexpectedColumn { table: CONTACT.into(), column: "MAILER".into() },
      Drift::MissingTable("CONTACT_NOTE_REL_TYPES".into()),
    ]
  );
}

#[tokio::test]
async fn unknown_applied_version_aborts() {
  let s = store().await;
  s.conn
    .call(|conn| {
      conn.execute(
        "INSERT INTO rolodex_migrations (version, name, checksum, applied_at)
         VALUES (20990101000000, 'from_the_future', '', '2099-01-01T00:00:00+00:00')",
        [],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let err = s.migrator().unwrap().up(None).await.unwrap_err();
  assert!(matches!(err, Error::UnknownApplied(Version(20990101000000))));
  assert!(s.describe().await.unwrap().is_empty());
}

// ─── Custom sequences ────────────────────────────────────────────────────────

fn create_people(p: &mut Plan) {
  p.table("PEOPLE", TableOptions::surrogate("PERSON_ID"))
    .add_column("NAME", ColumnType::String, ColumnOptions::new())
    .create();
}

fn create_pets(p: &mut Plan) {
  p.table("PETS", TableOptions::surrogate("PET_ID"))
    .add_column("OWNER_ID", ColumnType::Integer, ColumnOptions::new())
    .create();
}

/// Adds a nullable column, then a NOT NULL one without a default. SQLite
/// refuses the second once the table has rows.
fn add_required_column(p: &mut Plan) {
  p.table("PEOPLE", TableOptions::default())
    .add_column("NICK", ColumnType::String, ColumnOptions::new().nullable())
    .add_column("EMAIL", ColumnType::String, ColumnOptions::new())
    .update();
}

fn link_pets(p: &mut Plan) {
  p.table("PETS", TableOptions::default())
    .add_foreign_key("OWNER_ID", "PEOPLE", "PERSON_ID", ForeignKeyOptions::cascade())
    .update();
}

fn drop_pets(p: &mut Plan) { p.drop_table("PETS"); }

static FAILING: &[Changeset] = &[
  Changeset::change(1, "create_people", create_people),
  Changeset::change(2, "add_required_column", add_required_column),
  Changeset::change(3, "create_pets", create_pets),
];

static LINKED: &[Changeset] = &[
  Changeset::change(1, "create_people", create_people),
  Changeset::change(2, "create_pets", create_pets),
  Changeset::change(3, "link_pets", link_pets),
];

static IRREVERSIBLE: &[Changeset] = &[
  Changeset::change(1, "create_pets", create_pets),
  Changeset::change(2, "drop_pets", drop_pets),
];

#[tokio::test]
async fn failing_changeset_leaves_earlier_ones_applied() {
  let s = store().await;
  let migrator = s.migrator_for(Sequence::new(FAILING).unwrap());
  migrator.up(Some(Version(1))).await.unwrap();

  s.conn
    .call(|conn| {
      conn.execute("INSERT INTO PEOPLE (PERSON_ID, NAME) VALUES (1, 'Jane')", [])?;
      Ok(())
    })
    .await
    .unwrap();

  let err = migrator.up(None).await.unwrap_err();
  assert!(
    matches!(err, Error::Changeset { version: Version(2), name: "add_required_column", .. }),
    "{err}"
  );

  let status = migrator.status().await.unwrap();
  let applied: Vec<_> = status.iter().map(|c| c.applied_at.is_some()).collect();
  assert_eq!(applied, [true, false, false]);

  let tables = s.describe().await.unwrap();
  assert_eq!(tables.len(), 1);
  assert_eq!(tables[0].name, "PEOPLE");
  let columns: Vec<_> = tables[0].columns.iter().map(|c| c.name.as_str()).collect();
  assert_eq!(columns, ["PERSON_ID", "NAME"]);
}

#[tokio::test]
async fn foreign_key_on_existing_table_rebuilds_it() {
  let s = store().await;
  let migrator = s.migrator_for(Sequence::new(LINKED).unwrap());
  migrator.up(Some(Version(2))).await.unwrap();

  s.conn
    .call(|conn| {
      conn.execute_batch(
        "INSERT INTO PEOPLE (PERSON_ID, NAME) VALUES (1, 'Jane');
         INSERT INTO PETS (PET_ID, OWNER_ID) VALUES (10, 1);",
      )?;
      Ok(())
    })
    .await
    .unwrap();

  migrator.up(None).await.unwrap();
  assert!(migrator.verify().await.unwrap().is_empty());

  let tables = s.describe().await.unwrap();
  let pets = tables.iter().find(|t| t.name == "PETS").unwrap();
  let fk = pets.foreign_key("OWNER_ID").unwrap();
  assert_eq!(fk.ref_table, "PEOPLE");
  assert_eq!(fk.on_delete, "CASCADE");

  // Rows survived the rebuild and now cascade.
  let pets_left = s
    .conn
    .call(|conn| {
      conn.execute("DELETE FROM PEOPLE WHERE PERSON_ID = 1", [])?;
      Ok(conn.query_row("SELECT COUNT(*) FROM PETS", [], |r| r.get::<_, i64>(0))?)
    })
    .await
    .unwrap();
  assert_eq!(pets_left, 0);

  migrator.down(None).await.unwrap();
  let tables = s.describe().await.unwrap();
  let pets = tables.iter().find(|t| t.name == "PETS").unwrap();
  assert!(pets.foreign_keys.is_empty());
}

#[tokio::test]
async fn dangling_rows_abort_the_changeset() {
  let s = store().await;
  let migrator = s.migrator_for(Sequence::new(LINKED).unwrap());
  migrator.up(Some(Version(2))).await.unwrap();

  s.conn
    .call(|conn| {
      conn.execute("INSERT INTO PETS (PET_ID, OWNER_ID) VALUES (10, 99)", [])?;
      Ok(())
    })
    .await
    .unwrap();

  let err = migrator.up(None).await.unwrap_err();
  let Error::Changeset { source, .. } = err else { panic!("expected a changeset failure") };
  assert!(
    matches!(*source, Error::DanglingRows { ref table, ref parent } if table == "PETS" && parent == "PEOPLE")
  );

  let tables = s.describe().await.unwrap();
  assert!(tables.iter().find(|t| t.name == "PETS").unwrap().foreign_keys.is_empty());
  assert_eq!(migrator.status().await.unwrap()[2].applied_at, None);
}

#[tokio::test]
async fn irreversible_change_fails_rollback() {
  let s = store().await;
  let migrator = s.migrator_for(Sequence::new(IRREVERSIBLE).unwrap());
  migrator.up(None).await.unwrap();

  let err = migrator.down(None).await.unwrap_err();
  let Error::Changeset { version, source, .. } = err else {
    panic!("expected a changeset failure")
  };
  assert_eq!(version, Version(2));
  assert!(matches!(*source, Error::Core(rolodex_core::Error::Irreversible(_))));
  assert!(migrator.status().await.unwrap()[1].applied_at.is_some());
}

// ─── Extraction changesets ───────────────────────────────────────────────────

#[tokio::test]
async fn nickname_rollback_is_lossy() {
  let s = migrated().await;
  jane(&s).await;
  s.insert_property(NewProperty::new(uid("c1"), PropertyKind::Nickname, "JD"))
    .await
    .unwrap();

  s.migrator()
    .unwrap()
    .down(Some(before("extract_contact_nickname")))
    .await
    .unwrap();

  let tables = s.describe().await.unwrap();
  assert!(!tables.iter().any(|t| t.name == CONTACT_NICKNAME));
  assert!(!tables.iter().any(|t| t.name == "CONTACT_NICKNAME_REL_TYPES"));
  let contact = tables.iter().find(|t| t.name == CONTACT).unwrap();
  let nickname = contact.column("NICKNAME").unwrap();
  assert_eq!(nickname.decl_type, "TEXT");
  assert!(!nickname.not_null);

  let restored: Option<String> = s
    .conn
    .call(|conn| {
      Ok(conn.query_row("SELECT NICKNAME FROM CONTACT WHERE UID = 'c1'", [], |r| r.get(0))?)
    })
    .await
    .unwrap();
  assert_eq!(restored, None);

  // Extracting again starts from an empty table.
  s.migrator().unwrap().up(None).await.unwrap();
  let nicknames = s
    .list_properties(uid("c1"), PropertyKind::Nickname)
    .await
    .unwrap();
  assert!(nicknames.is_empty());
}

#[tokio::test]
async fn title_rollback_restores_title() {
  let s = migrated().await;
  s.migrator()
    .unwrap()
    .down(Some(version_of("extract_contact_role")))
    .await
    .unwrap();

  let tables = s.describe().await.unwrap();
  assert!(!tables.iter().any(|t| t.name == CONTACT_TITLE));
  assert!(tables.iter().any(|t| t.name == CONTACT_ROLE));
  let contact = tables.iter().find(|t| t.name == CONTACT).unwrap();
  assert!(contact.has_column("TITLE"));
  assert!(!contact.has_column("ROLE"));

  // ROLE's own rollback still finds its tables.
  s.migrator().unwrap().down(None).await.unwrap();
  let tables = s.describe().await.unwrap();
  assert!(!tables.iter().any(|t| t.name == CONTACT_ROLE));
}

#[tokio::test]
async fn prop_group_touches_exactly_the_listed_tables() {
  let s = store().await;
  let migrator = s.migrator().unwrap();
  migrator.up(Some(before("add_prop_group"))).await.unwrap();
  let before_tables = s.describe().await.unwrap();

  migrator.up(None).await.unwrap();
  let after_tables = s.describe().await.unwrap();
  assert_eq!(before_tables.len(), after_tables.len());

  for (old, new) in before_tables.iter().zip(&after_tables) {
    assert_eq!(old.name, new.name);
    if PROP_GROUP_TABLES.contains(&new.name.as_str()) {
      let group = new.column(PROP_GROUP).unwrap();
      assert_eq!(group.decl_type, "VARCHAR(45)");
      assert!(!group.not_null);
      assert_eq!(new.columns.len(), old.columns.len() + 1);
    } else {
      assert_eq!(old, new, "{}", new.name);
    }
  }
}

// ─── Contacts and properties ─────────────────────────────────────────────────

#[tokio::test]
async fn contact_round_trip() {
  let s = migrated().await;
  let mut contact = Contact::new(uid("c1"), "Jane Doe");
  contact.bday = Some(Utc.with_ymd_and_hms(1985, 4, 12, 0, 0, 0).unwrap());
  contact.version = Some("4.0".into());

  s.insert_contact(contact.clone()).await.unwrap();
  assert_eq!(s.get_contact(uid("c1")).await.unwrap(), Some(contact));
  assert_eq!(s.get_contact(uid("c2")).await.unwrap(), None);

  let err = s
    .insert_contact(Contact::new(uid("c1"), "Someone Else"))
    .await
    .unwrap_err();
  assert_eq!(err.constraint(), Some(ConstraintKind::PrimaryKey));
}

#[tokio::test]
async fn labelled_phone_number() {
  let s = migrated().await;
  jane(&s).await;

  let tel = s
    .insert_property(
      NewProperty::new(uid("c1"), PropertyKind::Tel, "+15550001111").with_pref(1),
    )
    .await
    .unwrap();
  s.add_type_label(PropertyKind::Tel, tel.id, "work".into())
    .await
    .unwrap();
  s.add_type_label(PropertyKind::Tel, tel.id, "voice".into())
    .await
    .unwrap();

  let listed = s.list_properties(uid("c1"), PropertyKind::Tel).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].id, tel.id);
  assert_eq!(listed[0].value.as_deref(), Some("+15550001111"));
  assert_eq!(listed[0].pref, Some(1));
  assert_eq!(listed[0].types, ["voice", "work"]);
}

#[tokio::test]
async fn property_for_missing_contact_violates_foreign_key() {
  let s = migrated().await;
  let err = s
    .insert_property(NewProperty::new(uid("nonexistent"), PropertyKind::Tel, "+15550001111"))
    .await
    .unwrap_err();
  assert_eq!(err.constraint(), Some(ConstraintKind::ForeignKey));

  // The failed insert did not consume a key.
  jane(&s).await;
  let tel = s
    .insert_property(NewProperty::new(uid("c1"), PropertyKind::Tel, "+15550001111"))
    .await
    .unwrap();
  assert_eq!(tel.id, 1);
}

#[tokio::test]
async fn duplicate_label_violates_primary_key() {
  let s = migrated().await;
  jane(&s).await;
  let email = s
    .insert_property(NewProperty::new(uid("c1"), PropertyKind::Email, "jane@example.com"))
    .await
    .unwrap();

  s.add_type_label(PropertyKind::Email, email.id, "home".into())
    .await
    .unwrap();
  let err = s
    .add_type_label(PropertyKind::Email, email.id, "home".into())
    .await
    .unwrap_err();
  assert_eq!(err.constraint(), Some(ConstraintKind::PrimaryKey));
}

#[tokio::test]
async fn names_carry_no_labels() {
  let s = migrated().await;
  let err = s
    .add_type_label(PropertyKind::N, 1, "work".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NoTypeRelation(PropertyKind::N)));

  let err = s
    .insert_property(NewProperty::new(uid("c1"), PropertyKind::N, "Doe").with_pref(1))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(rolodex_core::Error::Unsupported { .. })));
}

/// One instance of `kind` for `owner`, with every extra value column set.
fn instance_of(owner: &str, kind: PropertyKind) -> NewProperty {
  kind.value_columns()[1..]
    .iter()
    .fold(NewProperty::new(uid(owner), kind, "value"), |input, &column| {
      input.with_field(column, "x")
    })
}

#[tokio::test]
async fn deleting_a_contact_cascades_two_levels() {
  let s = migrated().await;
  jane(&s).await;
  s.insert_contact(Contact::new(uid("c2"), "John Roe"))
    .await
    .unwrap();

  let mut labelled = Vec::new();
  for kind in PropertyKind::iter() {
    let doomed = s.insert_property(instance_of("c1", kind)).await.unwrap();
    s.insert_property(instance_of("c2", kind)).await.unwrap();
    if kind.rel_types_table().is_some() {
      s.add_type_label(kind, doomed.id, "work".into()).await.unwrap();
      labelled.push((kind, doomed.id));
    }
  }
  assert_eq!(labelled.len(), 15);

  assert!(s.delete_contact(uid("c1")).await.unwrap());
  assert!(!s.delete_contact(uid("c1")).await.unwrap());

  for kind in PropertyKind::iter() {
    assert!(s.list_properties(uid("c1"), kind).await.unwrap().is_empty(), "{kind}");
    assert_eq!(s.list_properties(uid("c2"), kind).await.unwrap().len(), 1, "{kind}");
  }
  for (kind, id) in labelled {
    assert!(s.type_labels(kind, id).await.unwrap().is_empty(), "{kind}");
  }
}

#[tokio::test]
async fn renaming_a_contact_moves_its_properties() {
  let s = migrated().await;
  jane(&s).await;
  let email = s
    .insert_property(NewProperty::new(uid("c1"), PropertyKind::Email, "jane@example.com"))
    .await
    .unwrap();
  s.add_type_label(PropertyKind::Email, email.id, "work".into())
    .await
    .unwrap();

  assert!(s.rename_contact(uid("c1"), uid("jane")).await.unwrap());
  assert!(!s.rename_contact(uid("c1"), uid("other")).await.unwrap());

  assert!(s.get_contact(uid("c1")).await.unwrap().is_none());
  let moved = s.list_properties(uid("jane"), PropertyKind::Email).await.unwrap();
  assert_eq!(moved.len(), 1);
  assert_eq!(moved[0].uid, uid("jane"));
  assert_eq!(moved[0].types, ["work"]);
}

#[tokio::test]
async fn properties_are_listed_by_preference() {
  let s = migrated().await;
  jane(&s).await;

  let mut ids = Vec::new();
  for (value, pref) in [("a", None), ("b", Some(2)), ("c", Some(1)), ("d", None), ("e", Some(1))] {
    let mut input = NewProperty::new(uid("c1"), PropertyKind::Email, value);
    input.pref = pref;
    ids.push(s.insert_property(input).await.unwrap().id);
  }

  let values: Vec<_> = s
    .list_properties(uid("c1"), PropertyKind::Email)
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.value.unwrap())
    .collect();
  assert_eq!(values, ["c", "e", "b", "a", "d"]);
}

#[tokio::test]
async fn grouped_and_typed_values_are_stored() {
  let s = migrated().await;
  jane(&s).await;

  let mut tz = NewProperty::new(uid("c1"), PropertyKind::Tz, "Europe/Berlin").with_group("item1");
  tz.value_type = Some("text".into());
  s.insert_property(tz).await.unwrap();

  let listed = s.list_properties(uid("c1"), PropertyKind::Tz).await.unwrap();
  assert_eq!(listed[0].group.as_deref(), Some("item1"));
  assert_eq!(listed[0].value_type.as_deref(), Some("text"));
  assert_eq!(listed[0].media_type, None);
  assert!(listed[0].types.is_empty());
}

#[tokio::test]
async fn ids_are_never_reused() {
  let s = migrated().await;
  jane(&s).await;

  let first = s
    .insert_property(NewProperty::new(uid("c1"), PropertyKind::Url, "https://a.example"))
    .await
    .unwrap();
  let second = s
    .insert_property(NewProperty::new(uid("c1"), PropertyKind::Url, "https://b.example"))
    .await
    .unwrap();
  assert!(second.id > first.id);

  let migrator = s.migrator().unwrap();
  migrator.down(Some(before("extract_contact_url"))).await.unwrap();
  migrator.up(None).await.unwrap();

  let third = s
    .insert_property(NewProperty::new(uid("c1"), PropertyKind::Url, "https://c.example"))
    .await
    .unwrap();
  assert!(third.id > second.id);
}

#[tokio::test]
async fn engine_enforces_lengths_and_ranges() {
  let s = migrated().await;
  jane(&s).await;

  let err = s
    .conn
    .call(|conn| {
      conn.execute(
        "INSERT INTO CONTACT (UID, FN) VALUES (?1, 'Too Long')",
        rusqlite::params!["x".repeat(46)],
      )?;
      Ok(())
    })
    .await
    .map_err(Error::from)
    .unwrap_err();
  assert_eq!(err.constraint(), Some(ConstraintKind::Check));

  let err = s
    .conn
    .call(|conn| {
      conn.execute(
        "INSERT INTO CONTACT_EMAIL (EMAIL_ID, UID, EMAIL, PREF) VALUES (1, 'c1', 'x', -1)",
        [],
      )?;
      Ok(())
    })
    .await
    .map_err(Error::from)
    .unwrap_err();
  assert_eq!(err.constraint(), Some(ConstraintKind::Check));

  let err = s
    .conn
    .call(|conn| {
      conn.execute("INSERT INTO CONTACT (UID) VALUES ('c9')", [])?;
      Ok(())
    })
    .await
    .map_err(Error::from)
    .unwrap_err();
  assert_eq!(err.constraint(), Some(ConstraintKind::NotNull));
}
