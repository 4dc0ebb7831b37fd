//! Logging abstraction
//!
//! Library code logs through the `log_*!` macros below instead of calling a
//! logging backend directly. On the host they forward to the [`log`] facade;
//! the binary decides where records end up (see `init`).
//!
//! All records are emitted under the `detect_link` target so they can be
//! filtered as a group, e.g. `RUST_LOG=detect_link=debug`.

/// Log target shared by every record this crate emits.
pub const LOG_TARGET: &str = "detect_link";

/// Install the process-wide logger.
///
/// Honours `RUST_LOG` and falls back to `default_filter` when it is unset.
/// Safe to call more than once; later calls are ignored.
pub fn init(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        ::log::info!(target: $crate::core::logging::LOG_TARGET, $($arg)*);
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        ::log::warn!(target: $crate::core::logging::LOG_TARGET, $($arg)*);
    }};
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        ::log::error!(target: $crate::core::logging::LOG_TARGET, $($arg)*);
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        ::log::debug!(target: $crate::core::logging::LOG_TARGET, $($arg)*);
    }};
}

/// Log trace message
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        ::log::trace!(target: $crate::core::logging::LOG_TARGET, $($arg)*);
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_expand_without_logger() {
        // No logger installed: records are discarded, nothing panics
        log_info!("link {} up", "tcp:127.0.0.1:5760");
        log_warn!("truncated {} -> {}", 64, 50);
        log_error!("send failed");
        log_debug!("frame {}", 1);
        log_trace!("raw");
    }

    #[test]
    fn test_init_is_idempotent() {
        super::init("debug");
        super::init("info");
        log_info!("logger installed");
    }
}
