//! Detection-to-Alert Bridge
//!
//! Called once per processed frame by the vision loop. Each call turns the
//! frame's detections into at most one STATUSTEXT alert and, if configured,
//! asks the autopilot to switch mode the first time something is detected.
//!
//! # Delivery
//!
//! At most once per frame, in frame order. Nothing is queued or retried:
//! an alert that cannot be sent because the link is down is dropped, and
//! the next frame starts fresh.

use detect_link_core::alert::ReportPlanner;
use detect_link_core::detection::{Detection, DetectionSummary};
use detect_link_core::traits::TimeSource;

use crate::communication::mavlink::{Connection, TelemetryLink};
use crate::error::SendError;
use crate::parameters::BridgeParams;

/// Per-session bridge state
pub struct DetectionAlertBridge {
    planner: ReportPlanner,
    mode_on_detection: Option<String>,
    /// The one-shot mode change has been attempted on a live link
    mode_attempted: bool,
    min_confidence: f32,
    frames: u64,
}

impl DetectionAlertBridge {
    pub fn new(params: &BridgeParams) -> Self {
        Self {
            planner: ReportPlanner::new(
                params.detection_severity,
                params.clear_policy,
                params.clear_severity,
            ),
            mode_on_detection: params.mode_on_detection.clone(),
            mode_attempted: false,
            min_confidence: params.min_confidence,
            frames: 0,
        }
    }

    /// Frames reported so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Collapse raw detections into the labels worth reporting.
    pub fn summarize(&self, detections: &[Detection]) -> DetectionSummary {
        DetectionSummary::from_detections(detections, self.min_confidence)
    }

    /// Report one frame's raw detections.
    pub fn report_detections<T: TimeSource>(
        &mut self,
        link: &TelemetryLink<T>,
        conn: &mut Connection,
        detections: &[Detection],
    ) -> Result<(), SendError> {
        let summary = self.summarize(detections);
        self.report(link, conn, &summary)
    }

    /// Report one frame.
    ///
    /// A transmit failure is returned for the caller to log; the link has
    /// already demoted itself. A disconnected link is not an error.
    pub fn report<T: TimeSource>(
        &mut self,
        link: &TelemetryLink<T>,
        conn: &mut Connection,
        summary: &DetectionSummary,
    ) -> Result<(), SendError> {
        self.frames += 1;
        link.poll(conn);

        let sent = match self.planner.plan(summary) {
            Some((severity, text)) => link.send_status(conn, severity, &text),
            None => Ok(()),
        };

        if !summary.is_clear() {
            self.maybe_request_mode(link, conn);
        }
        sent
    }

    fn maybe_request_mode<T: TimeSource>(&mut self, link: &TelemetryLink<T>, conn: &mut Connection) {
        if self.mode_attempted || !conn.is_connected() {
            return;
        }
        let Some(mode) = self.mode_on_detection.as_deref() else {
            return;
        };
        self.mode_attempted = true;
        if !link.request_mode(conn, mode) {
            crate::log_warn!("mode {} was not requested; not retrying this session", mode);
        }
    }
}

impl Default for DetectionAlertBridge {
    fn default() -> Self {
        Self::new(&BridgeParams::default())
    }
}
