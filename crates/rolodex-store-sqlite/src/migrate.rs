//! The changeset runner.
//!
//! [`Migrator`] moves a database along a [`Sequence`], one changeset at a
//! time. Each changeset is validated against the in-memory [`Schema`] model,
//! rendered to DDL and run in its own transaction together with its
//! bookkeeping row, so a failure leaves the database at the last completed
//! changeset.

use std::{collections::BTreeSet, fmt};

use chrono::{DateTime, Utc};
use rolodex_core::{
  changeset::{Changeset, Direction, Sequence, Version},
  schema::Schema,
};
use rusqlite::{Connection, OptionalExtension as _};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  ddl,
  encode::{Applied, RawApplied, encode_dt},
  introspect::{self, TableInfo},
};

// ─── Reports ─────────────────────────────────────────────────────────────────

/// One known changeset and whether it is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangesetStatus {
  pub version:          Version,
  pub name:             &'static str,
  pub reversible:       bool,
  pub applied_at:       Option<DateTime<Utc>>,
  /// `None` while pending.
  pub checksum_matches: Option<bool>,
}

/// The SQL one changeset would run, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
  pub version:    Version,
  pub name:       &'static str,
  pub direction:  Direction,
  pub statements: Vec<String>,
  pub checksum:   String,
}

/// A difference between the live database and the replayed model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drift {
  MissingTable(String),
  UnexpectedTable(String),
  MissingColumn { table: String, column: String },
  UnexpectedColumn { table: String, column: String },
  Nullability { table: String, column: String, expected_null: bool },
  MissingForeignKey { table: String, column: String },
  UnexpectedForeignKey { table: String, column: String },
  /// The reference is right but its ON DELETE / ON UPDATE actions are not.
  ForeignKeyActions { table: String, column: String, expected: String, found: String },
  /// The changeset's operations changed after it was applied.
  Checksum(Version),
}

impl fmt::Display for Drift {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::MissingTable(t) => write!(f, "missing table {t}"),
      Self::UnexpectedTable(t) => write!(f, "unexpected table {t}"),
      Self::MissingColumn { table, column } => write!(f, "missing column {table}.{column}"),
      Self::UnexpectedColumn { table, column } => {
        write!(f, "unexpected column {table}.{column}")
      }
      Self::Nullability { table, column, expected_null } => write!(
        f,
        "{table}.{column} should be {}",
        if *expected_null { "nullable" } else { "NOT NULL" }
      ),
      Self::MissingForeignKey { table, column } => {
        write!(f, "missing foreign key on {table}.{column}")
      }
      Self::UnexpectedForeignKey { table, column } => {
        write!(f, "unexpected foreign key on {table}.{column}")
      }
      Self::ForeignKeyActions { table, column, expected, found } => {
        write!(f, "foreign key on {table}.{column} is {found}, expected {expected}")
      }
      Self::Checksum(version) => write!(f, "changeset {version} changed since it was applied"),
    }
  }
}

/// Hex SHA-256 over the JSON of a changeset's forward operations.
pub fn checksum(changeset: &Changeset) -> Result<String> {
  let ops = changeset.plan(Direction::Up)?;
  let json = serde_json::to_vec(&ops)?;
  Ok(hex::encode(Sha256::digest(&json)))
}

fn failed(changeset: &Changeset, source: Error) -> Error {
  Error::Changeset {
    version: changeset.version,
    name:    changeset.name,
    source:  Box::new(source),
  }
}

// ─── Migrator ────────────────────────────────────────────────────────────────

/// Applies and rolls back changesets against one database.
#[derive(Clone)]
pub struct Migrator {
  conn:     tokio_rusqlite::Connection,
  sequence: Sequence,
}

impl Migrator {
  pub(crate) fn new(conn: tokio_rusqlite::Connection, sequence: Sequence) -> Self {
    Self { conn, sequence }
  }

  pub fn sequence(&self) -> Sequence { self.sequence }

  /// Every known changeset with its applied state.
  pub async fn status(&self) -> Result<Vec<ChangesetStatus>> {
    let applied = self.applied().await?;

    self
      .sequence
      .iter()
      .map(|changeset| -> Result<ChangesetStatus> {
        let record = applied.iter().find(|a| a.version == changeset.version);
        let checksum_matches = match record {
          Some(a) => Some(a.checksum == checksum(changeset)?),
          None => None,
        };
        Ok(ChangesetStatus {
          version: changeset.version,
          name: changeset.name,
          reversible: changeset.is_reversible(),
          applied_at: record.map(|a| a.applied_at),
          checksum_matches,
        })
      })
      .collect()
  }

  /// Apply pending changesets in ascending order, up to and including
  /// `target` (all of them when `None`). Returns the versions applied.
  pub async fn up(&self, target: Option<Version>) -> Result<Vec<Version>> {
    self.run(Direction::Up, target).await
  }

  /// Roll back applied changesets in descending order. `None` rolls back
  /// the most recent one; `Some(v)` everything newer than `v`, so
  /// [`Version::ZERO`] empties the schema. Returns the versions rolled back.
  pub async fn down(&self, target: Option<Version>) -> Result<Vec<Version>> {
    self.run(Direction::Down, target).await
  }

  /// The statements `up` or `down` would run, without running them.
  pub async fn preview(
    &self,
    direction: Direction,
    target: Option<Version>,
  ) -> Result<Vec<PlannedStep>> {
    let applied = self.applied().await?;
    let mut schema = self.model(&applied)?;

    self
      .select(&applied, direction, target)?
      .into_iter()
      .map(|changeset| {
        plan_step(&mut schema, changeset, direction).map_err(|e| failed(changeset, e))
      })
      .collect()
  }

  /// The model produced by replaying the applied changesets.
  pub async fn current_schema(&self) -> Result<Schema> {
    let applied = self.applied().await?;
    self.model(&applied)
  }

  /// Compare the live database with [`Self::current_schema`].
  pub async fn verify(&self) -> Result<Vec<Drift>> {
    let applied = self.applied().await?;
    let expected = self.model(&applied)?;
    let live = self.conn.call(|conn| Ok(introspect::tables(conn)?)).await?;

    let mut drift = Vec::new();
    for record in &applied {
      if let Some(changeset) = self.sequence.get(record.version)
        && record.checksum != checksum(changeset)?
      {
        drift.push(Drift::Checksum(record.version));
      }
    }
    drift.extend(compare(&expected, &live));
    Ok(drift)
  }

  // ── Internals ─────────────────────────────────────────────────────────

  async fn run(&self, direction: Direction, target: Option<Version>) -> Result<Vec<Version>> {
    let applied = self.applied().await?;
    self.warn_on_checksum_drift(&applied)?;
    let mut schema = self.model(&applied)?;

    let changesets = self.select(&applied, direction, target)?;
    if changesets.is_empty() {
      info!(%direction, "nothing to do");
    }

    let mut done = Vec::with_capacity(changesets.len());
    for changeset in changesets {
      let step =
        plan_step(&mut schema, changeset, direction).map_err(|e| failed(changeset, e))?;
      self.execute(&step).await.map_err(|e| failed(changeset, e))?;

      info!(
        version = %step.version,
        name = step.name,
        %direction,
        statements = step.statements.len(),
        "changeset complete"
      );
      done.push(step.version);
    }
    Ok(done)
  }

  /// Rows of `rolodex_migrations`, oldest first.
  async fn applied(&self) -> Result<Vec<Applied>> {
    let raws: Vec<RawApplied> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT version, checksum, applied_at FROM rolodex_migrations ORDER BY version",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawApplied {
              version:    row.get(0)?,
              checksum:   row.get(1)?,
              applied_at: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let applied = raws
      .into_iter()
      .map(RawApplied::into_applied)
      .collect::<Result<Vec<_>>>()?;

    if let Some(unknown) = applied.iter().find(|a| !self.sequence.contains(a.version)) {
      return Err(Error::UnknownApplied(unknown.version));
    }
    Ok(applied)
  }

  fn warn_on_checksum_drift(&self, applied: &[Applied]) -> Result<()> {
    for record in applied {
      if let Some(changeset) = self.sequence.get(record.version)
        && record.checksum != checksum(changeset)?
      {
        warn!(
          version = %record.version,
          name = changeset.name,
          "changeset was modified after it was applied"
        );
      }
    }
    Ok(())
  }

  fn model(&self, applied: &[Applied]) -> Result<Schema> {
    let changesets = applied.iter().filter_map(|a| self.sequence.get(a.version));
    Ok(Schema::replay(changesets)?)
  }

  fn select(
    &self,
    applied: &[Applied],
    direction: Direction,
    target: Option<Version>,
  ) -> Result<Vec<&'static Changeset>> {
    if let Some(target) = target
      && !(target == Version::ZERO && direction == Direction::Down)
      && !self.sequence.contains(target)
    {
      return Err(Error::UnknownVersion(target));
    }

    match direction {
      Direction::Up => self.pending(applied, target),
      Direction::Down => {
        let newest_first = applied
          .iter()
          .rev()
          .filter_map(|a| self.sequence.get(a.version));
        Ok(match target {
          None => newest_first.take(1).collect(),
          Some(target) => newest_first.take_while(|c| c.version > target).collect(),
        })
      }
    }
  }

  fn pending(
    &self,
    applied: &[Applied],
    target: Option<Version>,
  ) -> Result<Vec<&'static Changeset>> {
    let done: BTreeSet<Version> = applied.iter().map(|a| a.version).collect();
    let latest = applied.last().map(|a| a.version);

    let mut pending = Vec::new();
    for changeset in self.sequence.iter() {
      if done.contains(&changeset.version) {
        continue;
      }
      if let Some(latest) = latest
        && changeset.version < latest
      {
        return Err(Error::PendingBehindApplied {
          pending: changeset.version,
          applied: latest,
        });
      }
      if target.is_some_and(|t| changeset.version > t) {
        break;
      }
      pending.push(changeset);
    }
    Ok(pending)
  }

  async fn execute(&self, step: &PlannedStep) -> Result<()> {
    for sql in &step.statements {
      debug!(version = %step.version, "{sql}");
    }

    let statements = step.statements.clone();
    let record = Record {
      version:    step.version.0,
      name:       step.name,
      direction:  step.direction,
      checksum:   step.checksum.clone(),
      applied_at: encode_dt(Utc::now()),
    };

    let dangling = self
      .conn
      .call(move |conn| {
        // Enforcement cannot change inside a transaction.
        conn.execute_batch("PRAGMA foreign_keys = OFF")?;
        let outcome = apply_step(conn, &statements, &record);
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        Ok(outcome?)
      })
      .await?;

    match dangling {
      Some((table, parent)) => Err(Error::DanglingRows { table, parent }),
      None => Ok(()),
    }
  }
}

// ─── Execution ───────────────────────────────────────────────────────────────

struct Record {
  version:    i64,
  name:       &'static str,
  direction:  Direction,
  checksum:   String,
  applied_at: String,
}

/// Validate `changeset` against the model and render it.
fn plan_step(
  schema: &mut Schema,
  changeset: &'static Changeset,
  direction: Direction,
) -> Result<PlannedStep> {
  let mut statements = Vec::new();
  for op in changeset.plan(direction)? {
    schema.apply(&op)?;
    statements.extend(ddl::render(&op, schema)?);
  }
  Ok(PlannedStep {
    version: changeset.version,
    name: changeset.name,
    direction,
    statements,
    checksum: checksum(changeset)?,
  })
}

/// Run one step in a transaction. Returns the first orphaned
/// `(table, parent)` pair instead of committing if any row lost its parent.
fn apply_step(
  conn: &mut Connection,
  statements: &[String],
  record: &Record,
) -> rusqlite::Result<Option<(String, String)>> {
  let tx = conn.transaction()?;
  for sql in statements {
    tx.execute_batch(sql)?;
  }

  let dangling: Option<(String, String)> = tx
    .query_row("PRAGMA foreign_key_check", [], |row| Ok((row.get(0)?, row.get(2)?)))
    .optional()?;
  if dangling.is_some() {
    return Ok(dangling);
  }

  match record.direction {
    Direction::Up => tx.execute(
      "INSERT INTO rolodex_migrations (version, name, checksum, applied_at)
       VALUES (?1, ?2, ?3, ?4)",
      rusqlite::params![record.version, record.name, record.checksum, record.applied_at],
    )?,
    Direction::Down => tx.execute(
      "DELETE FROM rolodex_migrations WHERE version = ?1",
      rusqlite::params![record.version],
    )?,
  };
  tx.commit()?;
  Ok(None)
}

/// Structural differences between the model and the introspected tables.
fn compare(expected: &Schema, live: &[TableInfo]) -> Vec<Drift> {
  let mut drift = Vec::new();

  for def in expected.tables() {
    let Some(info) = live.iter().find(|t| t.name == def.name) else {
      drift.push(Drift::MissingTable(def.name.clone()));
      continue;
    };
    let at = |column: &str| (def.name.clone(), column.to_owned());

    for column in &def.columns {
      match info.column(&column.name) {
        None => {
          let (table, column) = at(&column.name);
          drift.push(Drift::MissingColumn { table, column });
        }
        Some(found) if found.not_null == column.null => {
          let (table, name) = at(&column.name);
          drift.push(Drift::Nullability {
            table,
            column: name,
            expected_null: column.null,
          });
        }
        Some(_) => {}
      }
    }
    for column in info.columns.iter().filter(|c| !def.has_column(&c.name)) {
      let (table, column) = at(&column.name);
      drift.push(Drift::UnexpectedColumn { table, column });
    }

    for fk in &def.foreign_keys {
      let found = info
        .foreign_key(&fk.column)
        .filter(|f| f.ref_table == fk.ref_table && f.ref_column == fk.ref_column);
      let Some(found) = found else {
        let (table, column) = at(&fk.column);
        drift.push(Drift::MissingForeignKey { table, column });
        continue;
      };

      let wanted = actions(fk.on_delete.as_sql(), fk.on_update.as_sql());
      let actual = actions(&found.on_delete, &found.on_update);
      if actual != wanted {
        let (table, column) = at(&fk.column);
        drift.push(Drift::ForeignKeyActions { table, column, expected: wanted, found: actual });
      }
    }
    for fk in info.foreign_keys.iter().filter(|fk| def.foreign_key(&fk.column).is_none()) {
      let (table, column) = at(&fk.column);
      drift.push(Drift::UnexpectedForeignKey { table, column });
    }
  }

  for info in live.iter().filter(|t| !expected.contains(&t.name)) {
    drift.push(Drift::UnexpectedTable(info.name.clone()));
  }
  drift
}

fn actions(on_delete: &str, on_update: &str) -> String {
  format!("ON DELETE {on_delete} ON UPDATE {on_update}")
}
