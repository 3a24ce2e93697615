//! Multicast holder for the latest state of a scope.

use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc;

use super::state::EntityState;

/// Receiving end of a state subscription.
///
/// The first message is always the state current at subscription time,
/// followed by every later publish in order.
pub type StateReceiver<T> = mpsc::UnboundedReceiver<EntityState<T>>;

struct SlotInner<T> {
  current: EntityState<T>,
  subscribers: Vec<mpsc::UnboundedSender<EntityState<T>>>,
}

/// Current state plus the set of subscribers to notify on publish.
///
/// Publishing never blocks: every subscriber has an unbounded channel, and
/// subscribers whose receiver was dropped are pruned on the next publish.
pub struct StateSlot<T> {
  inner: Mutex<SlotInner<T>>,
}

impl<T: Clone> StateSlot<T> {
  pub fn new() -> Self {
    Self {
      inner: Mutex::new(SlotInner {
        current: EntityState::Idle,
        subscribers: Vec::new(),
      }),
    }
  }

  fn lock(&self) -> MutexGuard<'_, SlotInner<T>> {
    // `current` is replaced in one assignment, so a poisoned lock still holds a whole state
    self.inner.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Clone of the current state.
  pub fn current(&self) -> EntityState<T> {
    self.lock().current.clone()
  }

  /// Run `f` against the current state without cloning it.
  pub fn with_current<R>(&self, f: impl FnOnce(&EntityState<T>) -> R) -> R {
    f(&self.lock().current)
  }

  /// Register a new subscriber, primed with the current state.
  pub fn subscribe(&self) -> StateReceiver<T> {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut inner = self.lock();
    // Cannot fail: we still hold the receiver
    let _ = tx.send(inner.current.clone());
    inner.subscribers.push(tx);
    rx
  }

  /// Replace the current state and notify every live subscriber.
  pub fn publish(&self, state: EntityState<T>) {
    let mut inner = self.lock();
    inner
      .subscribers
      .retain(|tx| tx.send(state.clone()).is_ok());
    inner.current = state;
  }

  /// Number of subscribers still registered.
  pub fn subscriber_count(&self) -> usize {
    self.lock().subscribers.len()
  }
}

impl<T: Clone> Default for StateSlot<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Clone + std::fmt::Debug> std::fmt::Debug for StateSlot<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let inner = self.lock();
    f.debug_struct("StateSlot")
      .field("current", &inner.current)
      .field("subscribers", &inner.subscribers.len())
      .finish()
  }
}
