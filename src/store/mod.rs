//! Cache-first entity store.
//!
//! One generic [`EntityStore`] serves every entity type:
//! - collections are partitioned by `Entity::Scope`
//! - loads prefer a non-empty durable cache over the remote source
//! - create/update/delete are synchronous read-modify-writes of the cache
//! - state is published through a multicast [`StateSlot`] per scope

mod entity_store;
mod slot;
mod state;
mod traits;

pub use entity_store::EntityStore;
pub use slot::{StateReceiver, StateSlot};
pub use state::{EntityState, LoadStatus};
pub use traits::{Entity, RemoteSource};
