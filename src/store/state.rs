//! Load state published for every entity scope.
//!
//! A scope moves through `Idle -> Loading -> Success | Error`. Data only
//! exists in `Success` and a message only exists in `Error`, so the variants
//! carry them directly instead of a status/data/error triple that could
//! disagree with itself.

/// Coarse status of a scope, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
  Idle,
  Loading,
  Success,
  Error,
}

impl std::fmt::Display for LoadStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      LoadStatus::Idle => "idle",
      LoadStatus::Loading => "loading",
      LoadStatus::Success => "success",
      LoadStatus::Error => "error",
    };
    f.write_str(s)
  }
}

/// The state of one scope's collection
#[derive(Debug, Clone, PartialEq)]
pub enum EntityState<T> {
  /// Nothing has been requested for this scope yet
  Idle,
  /// A remote fetch is in flight
  Loading,
  /// The current ordered collection
  Success(Vec<T>),
  /// The last load failed; holds a user-facing message
  Error(String),
}

impl<T> Default for EntityState<T> {
  fn default() -> Self {
    EntityState::Idle
  }
}

impl<T> EntityState<T> {
  pub fn status(&self) -> LoadStatus {
    match self {
      EntityState::Idle => LoadStatus::Idle,
      EntityState::Loading => LoadStatus::Loading,
      EntityState::Success(_) => LoadStatus::Success,
      EntityState::Error(_) => LoadStatus::Error,
    }
  }

  pub fn is_loading(&self) -> bool {
    matches!(self, EntityState::Loading)
  }

  pub fn is_success(&self) -> bool {
    matches!(self, EntityState::Success(_))
  }

  pub fn is_error(&self) -> bool {
    matches!(self, EntityState::Error(_))
  }

  /// The collection, empty unless the state is `Success`.
  pub fn data(&self) -> &[T] {
    match self {
      EntityState::Success(data) => data,
      _ => &[],
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      EntityState::Error(e) => Some(e),
      _ => None,
    }
  }

  /// Consume the state, keeping only its collection.
  pub fn into_data(self) -> Vec<T> {
    match self {
      EntityState::Success(data) => data,
      _ => Vec::new(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_is_idle() {
    let state: EntityState<u32> = EntityState::default();
    assert_eq!(state.status(), LoadStatus::Idle);
    assert!(state.data().is_empty());
    assert_eq!(state.error(), None);
  }

  #[test]
  fn test_data_only_on_success() {
    let state = EntityState::Success(vec![1, 2, 3]);
    assert!(state.is_success());
    assert_eq!(state.data(), &[1, 2, 3]);
    assert_eq!(state.error(), None);

    let state: EntityState<u32> = EntityState::Error("boom".to_string());
    assert!(state.is_error());
    assert!(state.data().is_empty());
    assert_eq!(state.error(), Some("boom"));
  }

  #[test]
  fn test_status_displays_lowercase() {
    assert_eq!(LoadStatus::Loading.to_string(), "loading");
    assert_eq!(LoadStatus::Success.to_string(), "success");
  }
}
