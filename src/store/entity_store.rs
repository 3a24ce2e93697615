//! Cache-first entity store mediating between durable cache and remote source.

use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::cache::KeyValueStore;

use super::slot::{StateReceiver, StateSlot};
use super::state::EntityState;
use super::traits::{Entity, RemoteSource};

/// Single source of truth for the collections of one entity type.
///
/// Each scope gets its own state slot, created `Idle` the first time the
/// scope is addressed. Every mutation is a read-modify-write of the scope's
/// cache entry followed by a `Success` publish of the written collection.
///
/// Overlapping loads of one scope are not sequenced: whichever fetch
/// completes last publishes last.
pub struct EntityStore<E: Entity, R> {
  storage: Arc<dyn KeyValueStore>,
  remote: R,
  slots: Mutex<HashMap<E::Scope, Arc<StateSlot<E>>>>,
  remote_limit: Option<usize>,
}

impl<E: Entity, R: RemoteSource<E>> EntityStore<E, R> {
  /// Create a store over the given cache and remote source.
  pub fn new(storage: Arc<dyn KeyValueStore>, remote: R) -> Self {
    Self {
      storage,
      remote,
      slots: Mutex::new(HashMap::new()),
      remote_limit: E::remote_limit(),
    }
  }

  /// Override how many remote records a load keeps.
  pub fn with_remote_limit(mut self, limit: Option<usize>) -> Self {
    self.remote_limit = limit;
    self
  }

  fn slot(&self, scope: E::Scope) -> Arc<StateSlot<E>> {
    let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
    Arc::clone(slots.entry(scope).or_default())
  }

  /// Subscribe to the state of `scope`.
  ///
  /// The receiver gets the current state immediately, then every later one.
  pub fn state(&self, scope: E::Scope) -> StateReceiver<E> {
    self.slot(scope).subscribe()
  }

  /// Current state of `scope`.
  pub fn snapshot(&self, scope: E::Scope) -> EntityState<E> {
    self.slot(scope).current()
  }

  /// Load the collection for `scope`.
  ///
  /// A non-empty cache is adopted as-is unless `force_reload` is set; the
  /// remote source is only consulted when the cache is empty or the caller
  /// forces it. A failed fetch publishes the fixed error message and leaves
  /// the cache untouched.
  pub async fn load(&self, scope: E::Scope, force_reload: bool) {
    let slot = self.slot(scope);
    let cached = self.read_cache(scope);

    if !force_reload && !cached.is_empty() {
      debug!(
        entity = E::entity_type(),
        ?scope,
        count = cached.len(),
        "serving collection from cache"
      );
      slot.publish(EntityState::Success(cached));
      return;
    }

    slot.publish(EntityState::Loading);
    info!(entity = E::entity_type(), ?scope, force_reload, "fetching from remote");

    match self.remote.fetch(scope).await {
      Ok(records) => {
        let now = Utc::now();
        let limit = self.remote_limit.unwrap_or(usize::MAX);
        let entities: Vec<E> = records
          .into_iter()
          .take(limit)
          .map(|record| E::from_remote(record, scope, now))
          .collect();

        if let Err(e) = self.write_cache(scope, &entities) {
          warn!(entity = E::entity_type(), ?scope, error = %e, "failed to cache fetched collection");
        }

        info!(
          entity = E::entity_type(),
          ?scope,
          count = entities.len(),
          "remote load complete"
        );
        slot.publish(EntityState::Success(entities));
      }
      Err(e) => {
        warn!(entity = E::entity_type(), ?scope, error = %e, "remote load failed");
        slot.publish(EntityState::Error(E::load_error().to_string()));
      }
    }
  }

  /// Look up an entity by id without loading.
  ///
  /// Checks the in-memory state first and falls back to the cache when the
  /// id is not there, e.g. before the scope has been loaded.
  pub fn get_by_id(&self, scope: E::Scope, id: u64) -> Option<E> {
    let from_state = self
      .slot(scope)
      .with_current(|state| state.data().iter().find(|e| e.id() == id).cloned());

    from_state.or_else(|| self.read_cache(scope).into_iter().find(|e| e.id() == id))
  }

  /// Create an entity at the front of the collection.
  ///
  /// The id is one past the largest id in the cache, or 1 for an empty scope.
  /// Always publishes `Success`, whatever the previous state was. Fails
  /// without writing when the cache cannot be read.
  pub fn create(&self, scope: E::Scope, input: E::Upsert) -> Result<E> {
    let current = self.read_for_write(scope)?;
    let next_id = next_id(&current)
      .ok_or_else(|| eyre!("No {} id left after {}", E::entity_type(), u64::MAX))?;

    let entity = E::create(next_id, scope, input, Utc::now());

    let mut next = Vec::with_capacity(current.len() + 1);
    next.push(entity.clone());
    next.extend(current);

    self.commit(scope, next)?;
    debug!(entity = E::entity_type(), ?scope, id = next_id, "created");

    Ok(entity)
  }

  /// Update the mutable fields of an entity.
  ///
  /// Returns `Ok(None)` without writing anything when the id is absent.
  pub fn update(&self, scope: E::Scope, id: u64, input: E::Upsert) -> Result<Option<E>> {
    let mut current = self.read_for_write(scope)?;

    let Some(entity) = current.iter_mut().find(|e| e.id() == id) else {
      debug!(entity = E::entity_type(), ?scope, id, "update target not found");
      return Ok(None);
    };

    entity.apply(input, Utc::now());
    let updated = entity.clone();

    self.commit(scope, current)?;
    debug!(entity = E::entity_type(), ?scope, id, "updated");

    Ok(Some(updated))
  }

  /// Delete an entity.
  ///
  /// Returns `Ok(false)` without writing anything when the id is absent.
  pub fn delete(&self, scope: E::Scope, id: u64) -> Result<bool> {
    let current = self.read_for_write(scope)?;
    let before = current.len();

    let next: Vec<E> = current.into_iter().filter(|e| e.id() != id).collect();
    if next.len() == before {
      debug!(entity = E::entity_type(), ?scope, id, "delete target not found");
      return Ok(false);
    }

    self.commit(scope, next)?;
    debug!(entity = E::entity_type(), ?scope, id, "deleted");

    Ok(true)
  }

  /// Drop the durable entry for `scope`.
  ///
  /// The in-memory state is left as it is; the next load goes to the remote.
  pub fn clear_cache(&self, scope: E::Scope) -> Result<()> {
    self.storage.clear(&E::cache_key(scope))?;
    info!(entity = E::entity_type(), ?scope, "cache cleared");
    Ok(())
  }

  fn commit(&self, scope: E::Scope, next: Vec<E>) -> Result<()> {
    self.write_cache(scope, &next)?;
    self.slot(scope).publish(EntityState::Success(next));
    Ok(())
  }

  /// Read the cached collection for `scope` when serving reads.
  ///
  /// Missing, unreadable and corrupt entries all read as an empty
  /// collection, which sends the next load to the remote source.
  fn read_cache(&self, scope: E::Scope) -> Vec<E> {
    let key = E::cache_key(scope);

    match self.storage.get(&key) {
      Ok(Some(raw)) => decode(&key, &raw),
      Ok(None) => Vec::new(),
      Err(e) => {
        warn!(key = %key, error = %e, "cache read failed, treating as empty");
        Vec::new()
      }
    }
  }

  /// Read the cached collection for `scope` ahead of a write.
  ///
  /// Backend failures are returned: writing back over an entry that could
  /// not be read would drop the stored collection. Corrupt payloads still
  /// read as empty.
  fn read_for_write(&self, scope: E::Scope) -> Result<Vec<E>> {
    let key = E::cache_key(scope);

    Ok(match self.storage.get(&key)? {
      Some(raw) => decode(&key, &raw),
      None => Vec::new(),
    })
  }

  fn write_cache(&self, scope: E::Scope, entities: &[E]) -> Result<()> {
    let raw = serde_json::to_string(entities)
      .map_err(|e| eyre!("Failed to serialize {} collection: {}", E::entity_type(), e))?;
    self.storage.set(&E::cache_key(scope), &raw)
  }
}

fn decode<E: Entity>(key: &str, raw: &str) -> Vec<E> {
  match serde_json::from_str(raw) {
    Ok(entities) => entities,
    Err(e) => {
      warn!(key = %key, error = %e, "corrupt cache payload, treating as empty");
      Vec::new()
    }
  }
}

/// Next id for a collection: one past the maximum, or 1 when empty.
///
/// `None` when the maximum id is already `u64::MAX`.
fn next_id<E: Entity>(entities: &[E]) -> Option<u64> {
  match entities.iter().map(|e| e.id()).max() {
    Some(max) => max.checked_add(1),
    None => Some(1),
  }
}
