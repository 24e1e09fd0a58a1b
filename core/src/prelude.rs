use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings shared by the stream client and its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    pub endpoint: String,
    pub reconnect_delay: Duration,
    pub history_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://localhost:8000/ws/telemetry".to_string(),
            reconnect_delay: Duration::from_secs(3),
            history_capacity: 100,
        }
    }
}

/// Common error type for feed ingestion.
#[derive(thiserror::Error, Debug)]
pub enum StreamError {
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),
    #[error("transport failure: {0}")]
    Transport(String),
}

pub type StreamResult<T> = Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_backend_contract() {
        let config = StreamConfig::default();
        assert_eq!(config.endpoint, "ws://localhost:8000/ws/telemetry");
        assert_eq!(config.reconnect_delay, Duration::from_secs(3));
        assert_eq!(config.history_capacity, 100);
    }
}
