//! Time abstraction used for heartbeat liveness tracking.
//!
//! The link records when the last heartbeat arrived and later asks how long
//! ago that was. Hiding the clock behind `TimeSource` lets the staleness
//! logic run against `MockTime` in tests instead of the wall clock.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};

/// Monotonic time source for liveness bookkeeping.
///
/// # Example
///
/// ```
/// use detect_link_core::traits::{MockTime, TimeSource};
///
/// fn heartbeat_is_stale<T: TimeSource>(time: &T, last_heartbeat_us: u64) -> bool {
///     time.elapsed_since(last_heartbeat_us) > 5_000_000
/// }
///
/// let time = MockTime::new();
/// assert!(!heartbeat_is_stale(&time, 0));
/// time.advance(6_000_000);
/// assert!(heartbeat_is_stale(&time, 0));
/// ```
pub trait TimeSource: Clone + Send + Sync {
    /// Returns current time in milliseconds since the source was created.
    fn now_ms(&self) -> u64;

    /// Returns current time in microseconds since the source was created.
    fn now_us(&self) -> u64;

    /// Returns elapsed time in microseconds since a reference point.
    ///
    /// Saturates to zero when the reference lies in the future.
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

/// Manually driven clock for tests.
///
/// Clones share the same counter, so a test can keep one handle and advance
/// time underneath a link that owns another.
#[derive(Clone, Default)]
pub struct MockTime {
    current_us: Arc<AtomicU64>,
}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `MockTime` starting at the specified time.
    pub fn with_initial(us: u64) -> Self {
        Self {
            current_us: Arc::new(AtomicU64::new(us)),
        }
    }

    /// Sets the current time to an absolute value.
    pub fn set(&self, us: u64) {
        self.current_us.store(us, Ordering::SeqCst);
    }

    /// Advances the current time by the specified amount.
    pub fn advance(&self, us: u64) {
        self.current_us.fetch_add(us, Ordering::SeqCst);
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }

    fn now_us(&self) -> u64 {
        self.current_us.load(Ordering::SeqCst)
    }
}
