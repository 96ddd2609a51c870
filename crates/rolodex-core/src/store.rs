//! The `ContactStore` trait.
//!
//! Row-level access to a migrated contact database. Implemented by storage
//! backends (e.g. `rolodex-store-sqlite`); the operations assume the schema
//! is at the latest version.

use std::future::Future;

use crate::{
  contact::{Contact, ContactUid, NewProperty, Property},
  property::PropertyKind,
};

/// Abstraction over a contact store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait ContactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Contacts ──────────────────────────────────────────────────────────

  /// Insert a new `CONTACT` row. Fails if the UID is taken.
  fn insert_contact(
    &self,
    contact: Contact,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_contact(
    &self,
    uid: ContactUid,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// Delete a contact. Property rows and their labels go with it.
  ///
  /// Returns `false` if no such contact existed.
  fn delete_contact(
    &self,
    uid: ContactUid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Change a contact's UID. Every property row follows the new key.
  ///
  /// Returns `false` if no such contact existed.
  fn rename_contact(
    &self,
    from: ContactUid,
    to: ContactUid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Properties ────────────────────────────────────────────────────────

  /// Insert a property instance. The store assigns the surrogate key; keys
  /// are never reused within a table, even after deletion.
  fn insert_property(
    &self,
    input: NewProperty,
  ) -> impl Future<Output = Result<Property, Self::Error>> + Send + '_;

  /// Attach a type label (e.g. `work`, `home`) to a property instance.
  /// The pair is unique.
  fn add_type_label(
    &self,
    kind: PropertyKind,
    id: i64,
    label: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn type_labels(
    &self,
    kind: PropertyKind,
    id: i64,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// All instances of `kind` for a contact, most preferred first: ascending
  /// `PREF`, unranked last, ties broken by insertion order.
  fn list_properties(
    &self,
    uid: ContactUid,
    kind: PropertyKind,
  ) -> impl Future<Output = Result<Vec<Property>, Self::Error>> + Send + '_;
}
