//! detect_link_core - Pure no_std logic for the detection alert link
//!
//! Everything here is free of I/O so it can be tested on the host without
//! a serial port or an autopilot attached.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives
//! - **no_std + alloc**: Only `alloc` is required (label strings)
//! - **Trait abstractions**: The clock is injected via [`traits::TimeSource`]
//!
//! # Modules
//!
//! - [`alert`]: Severity, 50-byte bounded `AlertMessage`, text and send policy
//! - [`detection`]: Per-frame detections and `DetectionSummary`
//! - [`link`]: Link state machine
//! - [`mode`]: ArduPilot mode tables per vehicle family
//! - [`palette`]: Deterministic class colors for the renderer
//! - [`traits`]: Time source abstraction

#![no_std]

extern crate alloc;

pub mod alert;
pub mod detection;
pub mod link;
pub mod mode;
pub mod palette;
pub mod traits;
