//! MAVLink STATUSTEXT Construction
//!
//! Converts an [`AlertMessage`] into the STATUSTEXT frame the ground
//! station displays.
//!
//! Alerts are capped at the 50-byte STATUSTEXT field when they are built, so
//! every alert fits a single frame: `id = 0` and `chunk_seq = 0`, which
//! receivers treat as a complete, non-chunked message.

use detect_link_core::alert::{AlertMessage, Severity};
use mavlink::common::{MavMessage, MavSeverity, STATUSTEXT_DATA};

/// Map an alert severity to the MAVLink severity of the same name.
pub fn mav_severity(severity: Severity) -> MavSeverity {
    match severity {
        Severity::Emergency => MavSeverity::MAV_SEVERITY_EMERGENCY,
        Severity::Alert => MavSeverity::MAV_SEVERITY_ALERT,
        Severity::Critical => MavSeverity::MAV_SEVERITY_CRITICAL,
        Severity::Error => MavSeverity::MAV_SEVERITY_ERROR,
        Severity::Warning => MavSeverity::MAV_SEVERITY_WARNING,
        Severity::Notice => MavSeverity::MAV_SEVERITY_NOTICE,
        Severity::Info => MavSeverity::MAV_SEVERITY_INFO,
        Severity::Debug => MavSeverity::MAV_SEVERITY_DEBUG,
    }
}

/// Build the STATUSTEXT payload for `alert`.
pub fn statustext_data(alert: &AlertMessage) -> STATUSTEXT_DATA {
    STATUSTEXT_DATA {
        severity: mav_severity(alert.severity()),
        text: alert.payload().into(),
        id: 0,
        chunk_seq: 0,
    }
}

/// Build the complete STATUSTEXT message for `alert`.
pub fn statustext(alert: &AlertMessage) -> MavMessage {
    MavMessage::STATUSTEXT(statustext_data(alert))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(data: &STATUSTEXT_DATA) -> &[u8] {
        data.text.as_ref()
    }

    #[test]
    fn test_severity_mapping_matches_names() {
        assert_eq!(mav_severity(Severity::Alert), MavSeverity::MAV_SEVERITY_ALERT);
        assert_eq!(mav_severity(Severity::Info), MavSeverity::MAV_SEVERITY_INFO);
        assert_eq!(
            mav_severity(Severity::Emergency),
            MavSeverity::MAV_SEVERITY_EMERGENCY
        );
        assert_eq!(mav_severity(Severity::Debug), MavSeverity::MAV_SEVERITY_DEBUG);
    }

    #[test]
    fn test_short_text_is_nul_padded() {
        let (alert, notice) = AlertMessage::new(Severity::Alert, "DETECTED 1: person");
        assert!(notice.is_none());

        let data = statustext_data(&alert);
        let bytes = text_of(&data);
        assert_eq!(bytes.len(), 50);
        assert_eq!(&bytes[..18], b"DETECTED 1: person");
        assert!(bytes[18..].iter().all(|&b| b == 0));
        assert_eq!(data.id, 0);
        assert_eq!(data.chunk_seq, 0);
        assert_eq!(data.severity, MavSeverity::MAV_SEVERITY_ALERT);
    }

    #[test]
    fn test_long_text_fills_field() {
        let long = "x".repeat(80);
        let (alert, notice) = AlertMessage::new(Severity::Warning, &long);
        assert!(notice.is_some());

        let data = statustext_data(&alert);
        assert!(text_of(&data).iter().all(|&b| b == b'x'));
    }

    #[test]
    fn test_statustext_wraps_data() {
        let (alert, _) = AlertMessage::new(Severity::Info, "Area clear");
        assert!(matches!(statustext(&alert), MavMessage::STATUSTEXT(_)));
    }
}
