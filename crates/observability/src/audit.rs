use larder_history::{AuditAction, AuditRecord, AuditSink};

/// Emits every history record as a structured `info` event on the `audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    pub fn new() -> Self {
        Self
    }
}

impl AuditSink for TracingAuditSink {
    fn record(&self, record: &AuditRecord) {
        match record.action {
            AuditAction::Executed => tracing::info!(
                target: "audit",
                action = record.action.as_str(),
                command = %record.description,
                at = %record.at,
                "command executed"
            ),
            AuditAction::Undone | AuditAction::Redone => tracing::info!(
                target: "audit",
                action = record.action.as_str(),
                command = %record.description,
                at = %record.at,
                "history replayed"
            ),
        }
    }
}
