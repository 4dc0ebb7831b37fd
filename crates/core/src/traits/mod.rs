//! Trait abstractions that keep the link logic independent of the host clock.
//!
//! - Trait definitions are pure and have no feature gates
//! - Mock implementations are always available for host testing
//! - The wall-clock implementation lives in the `detect_link` crate

pub mod time;

pub use time::{MockTime, TimeSource};
