//! Audit notifications published by the history manager.
//!
//! After every successful execute, undo, or redo the manager hands an
//! [`AuditRecord`] to each registered [`AuditSink`]. Delivery is synchronous and
//! fire-and-forget: sinks cannot fail or veto a command, and a sink that cannot
//! keep up simply drops records.

use std::sync::mpsc::{self, Receiver};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which history operation produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Executed,
    Undone,
    Redone,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Executed => "executed",
            AuditAction::Undone => "undone",
            AuditAction::Redone => "redone",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub action: AuditAction,
    pub description: String,
    pub at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(action: AuditAction, description: impl Into<String>) -> Self {
        Self {
            action,
            description: description.into(),
            at: Utc::now(),
        }
    }
}

/// Receiver of audit records.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: &AuditRecord);
}

/// A subscription to a [`ChannelAuditSink`].
#[derive(Debug)]
pub struct Subscription {
    receiver: Receiver<AuditRecord>,
}

impl Subscription {
    /// Block until the next record is available.
    pub fn recv(&self) -> Result<AuditRecord, mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a record without blocking.
    pub fn try_recv(&self) -> Result<AuditRecord, mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a record.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<AuditRecord, mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything received so far.
    pub fn drain(&self) -> Vec<AuditRecord> {
        self.receiver.try_iter().collect()
    }
}

/// Fan-out sink: every subscriber gets a copy of every record.
///
/// - No IO / no async
/// - Dead subscribers are dropped on the next publish
#[derive(Debug, Default)]
pub struct ChannelAuditSink {
    subscribers: Mutex<Vec<mpsc::Sender<AuditRecord>>>,
}

impl ChannelAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();

        // A poisoned lock still yields a subscription; it just never receives.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription { receiver: rx }
    }
}

impl AuditSink for ChannelAuditSink {
    fn record(&self, record: &AuditRecord) {
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.retain(|tx| tx.send(record.clone()).is_ok());
        }
    }
}

/// Sink that keeps every record in memory, oldest first.
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn descriptions(&self) -> Vec<(AuditAction, String)> {
        self.records()
            .into_iter()
            .map(|r| (r.action, r.description))
            .collect()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, record: &AuditRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}
