//! Key/value surface the entity store persists through.

use color_eyre::Result;

/// Durable string key/value storage.
///
/// Values are opaque to the backend; the entity store writes a serialized
/// collection per key and reads it back whole.
pub trait KeyValueStore: Send + Sync {
  /// Get the value stored under `key`, if any.
  fn get(&self, key: &str) -> Result<Option<String>>;

  /// Store `value` under `key`, replacing any previous value.
  fn set(&self, key: &str, value: &str) -> Result<()>;

  /// Remove `key`. Removing a missing key is not an error.
  fn clear(&self, key: &str) -> Result<()>;
}
