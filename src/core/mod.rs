//! Host-side support shared by the link and the bridge.
//!
//! - [`logging`]: `log_*!` macro facade over the `log` crate
//! - [`time`]: wall-clock `TimeSource`

pub mod logging;
pub mod time;

pub use time::StdTime;
