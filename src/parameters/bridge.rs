//! Detection Bridge Parameters
//!
//! # Parameters
//!
//! - `detection_severity` - severity of "DETECTED ..." reports
//! - `clear_policy` - when "Area clear" is reported (`never`, `always`,
//!   `on_transition`)
//! - `clear_severity` - severity of "Area clear" reports
//! - `mode_on_detection` - flight mode requested on the first detection of a
//!   session, e.g. `"LOITER"`
//! - `min_confidence` - detections below this score are ignored

use detect_link_core::alert::{ClearPolicy, Severity};
use serde::Deserialize;

/// Parameters for turning detections into alerts
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BridgeParams {
    pub detection_severity: Severity,
    pub clear_policy: ClearPolicy,
    pub clear_severity: Severity,
    pub mode_on_detection: Option<String>,
    pub min_confidence: f32,
}

impl Default for BridgeParams {
    fn default() -> Self {
        Self {
            detection_severity: Severity::Alert,
            clear_policy: ClearPolicy::Never,
            clear_severity: Severity::Info,
            mode_on_detection: None,
            min_confidence: 0.0,
        }
    }
}
