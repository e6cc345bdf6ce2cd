//! Reversible commands and bounded undo/redo history.
//!
//! This crate knows nothing about catalogs or orders: it is generic over the
//! state type `S` that commands mutate.

pub mod audit;
pub mod batch;
pub mod bounded;
pub mod command;
pub mod manager;

pub use audit::{
    AuditAction, AuditRecord, AuditSink, ChannelAuditSink, RecordingAuditSink, Subscription,
};
pub use batch::CommandBatch;
pub use bounded::BoundedStack;
pub use command::Command;
pub use manager::{DEFAULT_CAPACITY, HistoryConfig, HistoryManager};
