//! Engine configuration from the environment.

use anyhow::{Context, anyhow, bail};

use larder_history::{DEFAULT_CAPACITY, HistoryConfig};
use larder_observability::{LogFormat, LogSettings};

pub const HISTORY_CAPACITY_VAR: &str = "LARDER_HISTORY_CAPACITY";
pub const TRACE_AUDIT_VAR: &str = "LARDER_TRACE_AUDIT";
pub const LOG_FORMAT_VAR: &str = "LARDER_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Undoable commands kept before the oldest half is discarded.
    pub history_capacity: usize,
    /// Register a [`larder_observability::TracingAuditSink`] on new kitchens.
    pub trace_audit: bool,
    pub log_format: LogFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            trace_audit: true,
            log_format: LogFormat::default(),
        }
    }
}

impl EngineConfig {
    /// Read `LARDER_HISTORY_CAPACITY`, `LARDER_TRACE_AUDIT` and
    /// `LARDER_LOG_FORMAT`, falling back to defaults for unset variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(HISTORY_CAPACITY_VAR) {
            config.history_capacity = raw
                .trim()
                .parse()
                .with_context(|| format!("{HISTORY_CAPACITY_VAR}={raw:?} is not a valid capacity"))?;
        }
        if let Some(raw) = lookup(TRACE_AUDIT_VAR) {
            config.trace_audit = raw
                .trim()
                .parse()
                .with_context(|| format!("{TRACE_AUDIT_VAR}={raw:?} must be true or false"))?;
        }
        if let Some(raw) = lookup(LOG_FORMAT_VAR) {
            config.log_format = raw
                .parse()
                .map_err(|err: String| anyhow!("{LOG_FORMAT_VAR}={raw:?}: {err}"))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.history_capacity == 0 {
            bail!("history capacity must be at least 1");
        }
        Ok(())
    }

    pub fn history(&self) -> HistoryConfig {
        HistoryConfig {
            capacity: self.history_capacity,
        }
    }

    /// Log settings for this process, filtered by `RUST_LOG`.
    pub fn logging(&self) -> LogSettings {
        LogSettings::default().with_format(self.log_format)
    }
}
