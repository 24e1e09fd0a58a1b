use crate::feed::LogSeverity;
use log::{info, warn};

/// Routes core diagnostics and record-borne log lines into the log facade.
pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }

    /// Forwards a feed log event at its mapped severity.
    pub fn route(&self, severity: LogSeverity, line: &str) {
        match severity {
            LogSeverity::Warn => warn!("[feed] {}", line),
            LogSeverity::Cmd => info!("[feed] > {}", line),
            LogSeverity::Info | LogSeverity::Success => info!("[feed] {}", line),
        }
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
