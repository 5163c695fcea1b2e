mod entity_store;
mod local_store;
pub mod seed;

pub use entity_store::EntityStore;
pub use local_store::{KeyValueStore, LocalStore};
