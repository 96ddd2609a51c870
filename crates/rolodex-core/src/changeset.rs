//! Versioned changesets and the ordered sequence they form.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, operation::SchemaOp, plan::Plan};

// ─── Version ─────────────────────────────────────────────────────────────────

/// Ordering key of a changeset: a `YYYYMMDDHHMMSS` timestamp.
///
/// Only the ordering is meaningful; the value is otherwise opaque.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(pub i64);

impl Version {
  /// Sorts before every real changeset; rolling back to it empties the schema.
  pub const ZERO: Version = Version(0);
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl FromStr for Version {
  type Err = std::num::ParseIntError;

  fn from_str(s: &str) -> Result<Self, Self::Err> { s.trim().parse().map(Version) }
}

/// Which way a changeset is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Up,
  Down,
}

impl fmt::Display for Direction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Up => "up",
      Self::Down => "down",
    })
  }
}

// ─── Changeset ───────────────────────────────────────────────────────────────

pub type PlanFn = fn(&mut Plan);

/// The two changeset shapes.
#[derive(Clone, Copy)]
pub enum Body {
  /// Additive operations only; rollback is derived mechanically.
  Change(PlanFn),
  /// Hand-written forward and reverse bodies.
  UpDown { up: PlanFn, down: PlanFn },
}

/// One versioned unit of schema modification.
#[derive(Clone, Copy)]
pub struct Changeset {
  pub version: Version,
  pub name:    &'static str,
  pub body:    Body,
}

impl Changeset {
  pub const fn change(version: i64, name: &'static str, change: PlanFn) -> Self {
    Self { version: Version(version), name, body: Body::Change(change) }
  }

  pub const fn up_down(
    version: i64,
    name: &'static str,
    up: PlanFn,
    down: PlanFn,
  ) -> Self {
    Self { version: Version(version), name, body: Body::UpDown { up, down } }
  }

  pub fn is_reversible(&self) -> bool { matches!(self.body, Body::Change(_)) }

  /// Record the operations for `direction`.
  ///
  /// For a [`Body::Change`] the rollback is the recorded forward operations
  /// inverted and reversed.
  pub fn plan(&self, direction: Direction) -> Result<Vec<SchemaOp>> {
    let mut plan = Plan::new();
    match (self.body, direction) {
      (Body::Change(change), Direction::Up) => change(&mut plan),
      (Body::UpDown { up, .. }, Direction::Up) => up(&mut plan),
      (Body::UpDown { down, .. }, Direction::Down) => down(&mut plan),
      (Body::Change(change), Direction::Down) => {
        change(&mut plan);
        return plan.finish()?.iter().rev().map(SchemaOp::invert).collect();
      }
    }
    plan.finish()
  }
}

impl fmt::Debug for Changeset {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Changeset")
      .field("version", &self.version)
      .field("name", &self.name)
      .field("reversible", &self.is_reversible())
      .finish()
  }
}

// ─── Sequence ────────────────────────────────────────────────────────────────

/// Changesets in strictly ascending version order.
#[derive(Debug, Clone, Copy)]
pub struct Sequence {
  changesets: &'static [Changeset],
}

impl Sequence {
  pub fn new(changesets: &'static [Changeset]) -> Result<Self> {
    for pair in changesets.windows(2) {
      if pair[0].version >= pair[1].version {
        return Err(Error::OutOfOrder {
          previous: pair[0].version,
          next:     pair[1].version,
        });
      }
    }
    Ok(Self { changesets })
  }

  pub fn iter(&self) -> impl DoubleEndedIterator<Item = &'static Changeset> {
    self.changesets.iter()
  }

  pub fn get(&self, version: Version) -> Option<&'static Changeset> {
    self
      .changesets
      .binary_search_by_key(&version, |c| c.version)
      .ok()
      .map(|i| &self.changesets[i])
  }

  pub fn contains(&self, version: Version) -> bool { self.get(version).is_some() }

  pub fn latest(&self) -> Option<&'static Changeset> { self.changesets.last() }

  pub fn len(&self) -> usize { self.changesets.len() }

  pub fn is_empty(&self) -> bool { self.changesets.is_empty() }
}
