//! Wall-clock [`TimeSource`] for the host.

use std::time::Instant;

use detect_link_core::traits::TimeSource;

/// Monotonic clock measured from the moment it was created.
#[derive(Debug, Clone, Copy)]
pub struct StdTime {
    origin: Instant,
}

impl StdTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for StdTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for StdTime {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn now_us(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}
