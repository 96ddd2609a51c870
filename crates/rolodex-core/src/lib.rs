//! Core types for the Rolodex contact schema.
//!
//! This crate holds the relational model of the vCard contact database and
//! the ordered changesets that evolve it. It is deliberately free of database
//! dependencies: backends (e.g. `rolodex-store-sqlite`) render the recorded
//! [`SchemaOp`](operation::SchemaOp)s for their engine and run them.

pub mod changeset;
pub mod column;
pub mod contact;
pub mod error;
pub mod migrations;
pub mod operation;
pub mod plan;
pub mod property;
pub mod schema;
pub mod store;
pub mod table;
pub mod tables;

pub use error::{Error, Result};
