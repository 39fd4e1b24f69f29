//! Persistence layer: key-value backends and the typed progress store.

pub mod libsql_backend;
pub mod memory;
pub mod migrations;
pub mod progress;
pub mod traits;

pub use libsql_backend::LibSqlStore;
pub use memory::MemoryStore;
pub use progress::{IdentityKey, ProgressRecord, ProgressStore, ScopeKey, SessionSlot};
pub use traits::KeyValueStore;
