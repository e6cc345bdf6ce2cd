//! Logging setup and the audit sink that turns history records into log events.

pub mod audit;
pub mod logging;

pub use audit::TracingAuditSink;
pub use logging::{LogFormat, LogSettings};

/// Install JSON logs filtered by `RUST_LOG`. See [`LogSettings::install`].
pub fn init() -> bool {
    LogSettings::default().install()
}
