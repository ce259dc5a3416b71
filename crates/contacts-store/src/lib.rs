//! Document-style storage for the contacts service.
//!
//! Three collections (users, contacts, sent messages) are held in memory
//! behind a single lock and written out as one JSON snapshot after every
//! change. Contact search and sent-message history are paginated.

mod collections;
mod error;
mod persist;
pub mod phone;
mod store;
mod types;

pub use collections::{Collections, SNAPSHOT_VERSION};
pub use error::StoreError;
pub use persist::{FileStore, MemoryStore, Store};
pub use store::Database;
pub use types::*;
