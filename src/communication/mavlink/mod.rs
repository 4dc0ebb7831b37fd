//! MAVLink 2.0 Telemetry Link
//!
//! This module implements the small slice of MAVLink needed to report
//! detections to an autopilot and ground station.
//!
//! # Architecture
//!
//! - **Transport**: byte channel to the autopilot (serial, TCP, UDP)
//! - **Parser**: frame extraction from the inbound byte stream
//! - **Writer**: MAVLink 2.0 serialization with our system/component id
//! - **Vehicle**: identification of the autopilot from its heartbeat
//! - **Status notifier / command**: STATUSTEXT and DO_SET_MODE construction
//! - **Link**: session lifecycle and state machine on top of the above
//!
//! # Usage
//!
//! ```no_run
//! use detect_link::communication::mavlink::TelemetryLink;
//! use detect_link::parameters::LinkParams;
//! use detect_link_core::alert::Severity;
//!
//! let link = TelemetryLink::new(LinkParams::for_endpoint("tcp:127.0.0.1:5760"));
//! let mut conn = link.connect();
//! let _ = link.send_status(&mut conn, Severity::Alert, "DETECTED 1: person");
//! link.close(&mut conn);
//! ```

pub mod command; // COMMAND_LONG construction
pub mod link; // Session manager
pub mod parser; // Frame parsing
pub mod status_notifier; // STATUSTEXT construction
pub mod transport; // Transport abstraction layer
pub mod vehicle; // Remote vehicle identification
pub mod writer; // Message writing

pub use link::{connect, Connection, LinkStats, TelemetryLink};
pub use vehicle::TargetVehicle;
