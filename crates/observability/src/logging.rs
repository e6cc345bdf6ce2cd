//! Log output for processes embedding a kitchen.
//!
//! Command audit records arrive on the `audit` target (see
//! [`crate::TracingAuditSink`]), so one directive such as `warn,audit=info`
//! keeps the audit trail while silencing everything else.

use core::str::FromStr;

use tracing_subscriber::EnvFilter;

/// Directive applied when the configured one is missing or does not parse.
pub const FALLBACK_DIRECTIVE: &str = "info";

/// Shape of each log line on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Single-line human readable output.
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            other => Err(format!("unknown log format {other:?}, expected json or compact")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    /// `EnvFilter` directive. `None` reads `RUST_LOG`.
    pub directive: Option<String>,
    pub format: LogFormat,
}

impl LogSettings {
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn filter(&self) -> EnvFilter {
        let parsed = match &self.directive {
            Some(directive) => EnvFilter::try_new(directive).ok(),
            None => EnvFilter::try_from_default_env().ok(),
        };
        parsed.unwrap_or_else(|| EnvFilter::new(FALLBACK_DIRECTIVE))
    }

    /// Make these settings the global subscriber.
    ///
    /// Returns `false` when a subscriber was already installed; the existing
    /// one stays in place.
    pub fn install(&self) -> bool {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.filter())
            .with_writer(std::io::stderr);
        match self.format {
            LogFormat::Json => builder.json().try_init().is_ok(),
            LogFormat::Compact => builder.compact().try_init().is_ok(),
        }
    }
}
