//! detect_link - Detection alerts over a MAVLink telemetry link
//!
//! This library connects an object-detection loop to an autopilot: it keeps
//! a MAVLink session alive over serial, TCP or UDP, reports each frame's
//! detections as STATUSTEXT alerts, and can ask the autopilot to change
//! flight mode when something is seen.

// Host services: logging, clock
pub mod core;

// Error types shared by the link and the bridge
pub mod error;

// Configuration (TOML)
pub mod parameters;

// MAVLink telemetry link
pub mod communication;

// Detection-to-alert bridge
pub mod bridge;

pub use crate::bridge::DetectionAlertBridge;
pub use crate::communication::mavlink::{Connection, LinkStats, TelemetryLink};
pub use crate::error::{ConnectionError, NotConnectedError, SendError};
pub use crate::parameters::{BridgeParams, LinkParams, Params};
