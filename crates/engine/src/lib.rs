//! Session-level wiring of the restaurant catalog.
//!
//! A [`Kitchen`] owns one catalog and the undo/redo history of the commands
//! run against it. Configuration, snapshot persistence and a thread-safe
//! wrapper live alongside it.

pub mod config;
pub mod kitchen;
pub mod persistence;
pub mod shared;

pub use config::EngineConfig;
pub use kitchen::Kitchen;
pub use persistence::{InMemorySnapshotStore, SnapshotStore};
pub use shared::SharedKitchen;
