//! Telemetry link state machine.
//!
//! ```text
//! Disconnected --ConnectStarted--> Connecting
//! Connecting   --HeartbeatReceived--> Connected
//! Connecting   --OpenFailed | HeartbeatTimeout--> Disconnected
//! Connected    --TransmitFailed | HeartbeatLost--> Degraded
//! Degraded     --HeartbeatReceived | TransmitSucceeded--> Connected
//! any          --Closed--> Disconnected
//! ```
//!
//! Transitions are a pure function of `(state, event)`; the caller stores the
//! returned state. Events that do not apply to the current state leave it
//! unchanged.

use core::fmt;

/// Logical state of the link to the autopilot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Disconnected,
    /// Only held inside a connect attempt.
    Connecting,
    Connected,
    /// Channel open but the last transmit failed or heartbeats went quiet.
    Degraded,
}

/// Something that happened on the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    ConnectStarted,
    OpenFailed,
    HeartbeatTimeout,
    HeartbeatReceived,
    HeartbeatLost,
    TransmitSucceeded,
    TransmitFailed,
    Closed,
}

impl LinkState {
    /// Returns the state after `event`.
    pub fn on(self, event: LinkEvent) -> LinkState {
        use LinkEvent::*;
        use LinkState::*;

        match (self, event) {
            (_, Closed) => Disconnected,
            (Disconnected, ConnectStarted) => Connecting,
            (Connecting, HeartbeatReceived) => Connected,
            (Connecting, OpenFailed | HeartbeatTimeout) => Disconnected,
            (Connected, TransmitFailed | HeartbeatLost) => Degraded,
            (Degraded, HeartbeatReceived | TransmitSucceeded) => Connected,
            (state, _) => state,
        }
    }

    /// True when the remote system is known to be alive.
    pub fn is_connected(self) -> bool {
        self == LinkState::Connected
    }

    /// True when a channel exists that a transmit can be attempted on.
    pub fn can_transmit(self) -> bool {
        matches!(self, LinkState::Connected | LinkState::Degraded)
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkState::Disconnected => "disconnected",
            LinkState::Connecting => "connecting",
            LinkState::Connected => "connected",
            LinkState::Degraded => "degraded",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_success_path() {
        let state = LinkState::Disconnected
            .on(LinkEvent::ConnectStarted)
            .on(LinkEvent::HeartbeatReceived);
        assert_eq!(state, LinkState::Connected);
    }

    #[test]
    fn test_connect_timeout_returns_disconnected() {
        let state = LinkState::Disconnected
            .on(LinkEvent::ConnectStarted)
            .on(LinkEvent::HeartbeatTimeout);
        assert_eq!(state, LinkState::Disconnected);
    }

    #[test]
    fn test_transmit_failure_degrades_and_recovers() {
        let degraded = LinkState::Connected.on(LinkEvent::TransmitFailed);
        assert_eq!(degraded, LinkState::Degraded);
        assert!(degraded.can_transmit());
        assert!(!degraded.is_connected());

        assert_eq!(
            degraded.on(LinkEvent::TransmitSucceeded),
            LinkState::Connected
        );
        assert_eq!(
            degraded.on(LinkEvent::HeartbeatReceived),
            LinkState::Connected
        );
    }

    #[test]
    fn test_heartbeat_lost_degrades() {
        assert_eq!(
            LinkState::Connected.on(LinkEvent::HeartbeatLost),
            LinkState::Degraded
        );
    }

    #[test]
    fn test_close_from_any_state() {
        for state in [
            LinkState::Disconnected,
            LinkState::Connecting,
            LinkState::Connected,
            LinkState::Degraded,
        ] {
            assert_eq!(state.on(LinkEvent::Closed), LinkState::Disconnected);
        }
    }

    #[test]
    fn test_disconnected_ignores_heartbeat() {
        assert_eq!(
            LinkState::Disconnected.on(LinkEvent::HeartbeatReceived),
            LinkState::Disconnected
        );
        assert!(!LinkState::Disconnected.can_transmit());
    }
}
