//! Telemetry Link Parameters
//!
//! # Parameters
//!
//! - `endpoint` - serial device or `tcp:`/`udpin:`/`udpout:` address
//! - `baud_rate` - serial baud rate (ignored for network endpoints)
//! - `source_system_id` / `source_component_id` - ids stamped on our frames
//! - `heartbeat_timeout_ms` - how long `connect` waits for the first heartbeat
//! - `send_timeout_ms` - upper bound on a single transmit
//! - `heartbeat_stale_ms` - heartbeat silence that demotes the link to
//!   Degraded (0 disables)
//! - `reconnect_interval_ms` - minimum spacing between attempts to reopen a
//!   channel that went away (0 disables reconnection)

use std::time::Duration;

use serde::Deserialize;

/// Default telemetry device
pub const DEFAULT_ENDPOINT: &str = "/dev/ttyUSB0";

/// Default serial baud rate (SiK telemetry radios)
pub const DEFAULT_BAUD_RATE: u32 = 57600;

/// Default time to wait for the first heartbeat
pub const DEFAULT_HEARTBEAT_TIMEOUT_MS: u64 = 5000;

/// Default bound on a single transmit
pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 50;

/// Default heartbeat silence before the link is considered degraded
pub const DEFAULT_HEARTBEAT_STALE_MS: u64 = 5000;

/// Default spacing between reopen attempts on a lost channel
pub const DEFAULT_RECONNECT_INTERVAL_MS: u64 = 1000;

/// Parameters for opening a telemetry link
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LinkParams {
    pub endpoint: String,
    pub baud_rate: u32,
    pub source_system_id: u8,
    pub source_component_id: u8,
    pub heartbeat_timeout_ms: u64,
    pub send_timeout_ms: u64,
    pub heartbeat_stale_ms: u64,
    pub reconnect_interval_ms: u64,
}

impl Default for LinkParams {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            source_system_id: 1,
            source_component_id: 0,
            heartbeat_timeout_ms: DEFAULT_HEARTBEAT_TIMEOUT_MS,
            send_timeout_ms: DEFAULT_SEND_TIMEOUT_MS,
            heartbeat_stale_ms: DEFAULT_HEARTBEAT_STALE_MS,
            reconnect_interval_ms: DEFAULT_RECONNECT_INTERVAL_MS,
        }
    }
}

impl LinkParams {
    /// Parameters for `endpoint` with everything else defaulted.
    pub fn for_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.heartbeat_timeout_ms)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    /// `None` when staleness tracking is disabled.
    pub fn heartbeat_stale(&self) -> Option<Duration> {
        (self.heartbeat_stale_ms > 0).then(|| Duration::from_millis(self.heartbeat_stale_ms))
    }

    /// `None` when a lost channel is never reopened.
    pub fn reconnect_interval(&self) -> Option<Duration> {
        (self.reconnect_interval_ms > 0).then(|| Duration::from_millis(self.reconnect_interval_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = LinkParams::default();
        assert_eq!(params.baud_rate, 57600);
        assert_eq!(params.source_system_id, 1);
        assert_eq!(params.source_component_id, 0);
        assert_eq!(params.heartbeat_timeout(), Duration::from_secs(5));
        assert_eq!(params.send_timeout(), Duration::from_millis(50));
    }

    #[test]
    fn test_stale_disabled_at_zero() {
        let mut params = LinkParams::for_endpoint("tcp:127.0.0.1:5760");
        assert_eq!(params.heartbeat_stale(), Some(Duration::from_secs(5)));
        params.heartbeat_stale_ms = 0;
        assert_eq!(params.heartbeat_stale(), None);
    }

    #[test]
    fn test_reconnect_disabled_at_zero() {
        let mut params = LinkParams::default();
        assert_eq!(params.reconnect_interval(), Some(Duration::from_secs(1)));
        params.reconnect_interval_ms = 0;
        assert_eq!(params.reconnect_interval(), None);
    }

    #[test]
    fn test_partial_table_keeps_defaults() {
        let params: LinkParams = toml::from_str("endpoint = \"COM11\"\nbaud_rate = 115200").unwrap();
        assert_eq!(params.endpoint, "COM11");
        assert_eq!(params.baud_rate, 115200);
        assert_eq!(params.heartbeat_timeout_ms, DEFAULT_HEARTBEAT_TIMEOUT_MS);
    }
}
