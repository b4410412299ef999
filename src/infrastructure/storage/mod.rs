//! Local persistence

mod baseline_store;
mod key_value;

pub use baseline_store::BaselineStore;
pub use key_value::{JsonFileStore, KeyValueStore, MemoryStore};
