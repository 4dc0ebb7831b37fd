//! Communication Protocols
//!
//! The only protocol spoken here is MAVLink, towards the autopilot.
//!
//! # Transport Layers
//!
//! - Serial (USB or telemetry radio, 57600 baud by default)
//! - TCP and UDP (SITL, network bridges)

pub mod mavlink;
