//! Core traits tying a domain type to the generic entity store.

use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;

/// A record managed by an [`EntityStore`](super::EntityStore).
///
/// Implementors describe how a collection is partitioned (`Scope`), which
/// fields a caller may set (`Upsert`), and how a raw upstream record
/// (`Remote`) becomes a local entity.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
  /// Partition key for collections: `()` for a flat collection, a parent id
  /// for child collections.
  type Scope: Copy + Eq + Hash + Debug + Send + Sync + 'static;

  /// Caller-supplied mutable fields for create and update.
  type Upsert;

  /// Raw record shape returned by the remote source.
  type Remote: Send + 'static;

  /// Identifier, unique within a scope
  fn id(&self) -> u64;

  /// Entity type name used in logs (e.g., "post", "comment")
  fn entity_type() -> &'static str;

  /// Durable cache key holding the collection for `scope`.
  fn cache_key(scope: Self::Scope) -> String;

  /// Fixed user-facing message published when a remote load fails.
  fn load_error() -> &'static str;

  /// How many remote records to keep from a fetch. `None` keeps everything.
  fn remote_limit() -> Option<usize> {
    None
  }

  /// Build a fresh entity with both timestamps set to `now`.
  fn create(id: u64, scope: Self::Scope, input: Self::Upsert, now: DateTime<Utc>) -> Self;

  /// Overwrite the mutable fields and refresh the modification time.
  ///
  /// Must leave the id, creation time and any parent reference untouched.
  fn apply(&mut self, input: Self::Upsert, now: DateTime<Utc>);

  /// Normalize a raw upstream record fetched for `scope`.
  fn from_remote(record: Self::Remote, scope: Self::Scope, now: DateTime<Utc>) -> Self;
}

/// Read-only upstream source of raw records for one entity type.
pub trait RemoteSource<E: Entity>: Send + Sync {
  /// Fetch every record for `scope` in a single attempt.
  fn fetch(&self, scope: E::Scope) -> impl Future<Output = Result<Vec<E::Remote>>> + Send;
}
