//! Error types for the telemetry link.
//!
//! None of these are fatal to the caller. `ConnectionError` is recorded on a
//! `Disconnected` connection instead of being returned, `NotConnectedError`
//! and `SendError` come back as plain values for the caller to log or ignore.

use crate::communication::mavlink::transport::TransportError;

/// The channel could not be opened or the autopilot never said hello.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("could not open {endpoint}: {source}")]
    Open {
        endpoint: String,
        source: TransportError,
    },

    #[error("no heartbeat from {endpoint} within {timeout_ms} ms")]
    HeartbeatTimeout { endpoint: String, timeout_ms: u64 },

    #[error("channel to {endpoint} failed while waiting for heartbeat: {source}")]
    Channel {
        endpoint: String,
        source: TransportError,
    },
}

/// An operation needed a live link and there was none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("telemetry link is not connected")]
pub struct NotConnectedError;

/// A message could not be put on the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("telemetry link is not connected")]
    NotConnected,

    #[error("transmit failed: {0}")]
    Transport(#[from] TransportError),

    #[error("could not encode message: {0}")]
    Encode(String),
}

impl From<NotConnectedError> for SendError {
    fn from(_: NotConnectedError) -> Self {
        SendError::NotConnected
    }
}
