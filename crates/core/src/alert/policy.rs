//! Detection-to-alert text and send policy.

use alloc::format;
use alloc::string::String;

use serde::Deserialize;

use super::Severity;
use crate::detection::DetectionSummary;

/// Text reported for a frame with no detections.
pub const CLEAR_TEXT: &str = "Area clear";

/// Builds the status text for one frame.
///
/// `"DETECTED {count}: {a, b, c}"` when anything was seen, `"Area clear"`
/// otherwise.
pub fn alert_text(summary: &DetectionSummary) -> String {
    if summary.is_clear() {
        String::from(CLEAR_TEXT)
    } else {
        format!(
            "DETECTED {}: {}",
            summary.count(),
            summary.class_names().join(", ")
        )
    }
}

/// When to report a frame with zero detections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearPolicy {
    /// Never send "Area clear".
    #[default]
    Never,
    /// Send "Area clear" for every empty frame.
    Always,
    /// Send "Area clear" only for the first empty frame after a detection.
    OnTransition,
}

impl ClearPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "never" => Some(Self::Never),
            "always" => Some(Self::Always),
            "on_transition" | "on-transition" => Some(Self::OnTransition),
            _ => None,
        }
    }
}

/// Decides, frame by frame, whether an alert goes out and with what severity.
///
/// The planner only remembers whether the previous frame had detections; it
/// never queues text across frames.
#[derive(Debug, Clone)]
pub struct ReportPlanner {
    detection_severity: Severity,
    clear_policy: ClearPolicy,
    clear_severity: Severity,
    previous_count: Option<usize>,
}

impl ReportPlanner {
    pub fn new(
        detection_severity: Severity,
        clear_policy: ClearPolicy,
        clear_severity: Severity,
    ) -> Self {
        Self {
            detection_severity,
            clear_policy,
            clear_severity,
            previous_count: None,
        }
    }

    /// Returns the severity and text to send for this frame, if any.
    pub fn plan(&mut self, summary: &DetectionSummary) -> Option<(Severity, String)> {
        let previous = self.previous_count.replace(summary.count());

        if !summary.is_clear() {
            return Some((self.detection_severity, alert_text(summary)));
        }

        let send_clear = match self.clear_policy {
            ClearPolicy::Never => false,
            ClearPolicy::Always => true,
            ClearPolicy::OnTransition => matches!(previous, Some(n) if n > 0),
        };
        send_clear.then(|| (self.clear_severity, alert_text(summary)))
    }
}

impl Default for ReportPlanner {
    fn default() -> Self {
        Self::new(Severity::Alert, ClearPolicy::Never, Severity::Info)
    }
}
