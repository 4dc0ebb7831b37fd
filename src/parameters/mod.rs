//! Bridge Configuration
//!
//! Configuration is read once at startup from a TOML file with two tables:
//!
//! ```toml
//! [link]
//! endpoint = "/dev/ttyUSB0"
//! baud_rate = 57600
//! heartbeat_timeout_ms = 5000
//!
//! [bridge]
//! detection_severity = "alert"
//! clear_policy = "on_transition"
//! mode_on_detection = "LOITER"
//! ```
//!
//! Every key is optional; missing keys take the defaults documented in
//! [`link`] and [`bridge`].

pub mod bridge;
pub mod link;

pub use bridge::BridgeParams;
pub use link::LinkParams;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::communication::mavlink::transport::Endpoint;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Complete bridge configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Params {
    pub link: LinkParams,
    pub bridge: BridgeParams,
}

impl Params {
    /// Load and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let params: Params = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        params.validate()?;
        crate::log_debug!("loaded configuration from {}", path.display());
        Ok(params)
    }

    /// Reject values the link cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let link = &self.link;
        if link.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("link.endpoint must not be empty".into()));
        }
        Endpoint::parse(&link.endpoint)
            .map_err(|e| ConfigError::Invalid(format!("link.endpoint: {e}")))?;
        if link.baud_rate == 0 {
            return Err(ConfigError::Invalid("link.baud_rate must be non-zero".into()));
        }
        if link.heartbeat_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "link.heartbeat_timeout_ms must be non-zero".into(),
            ));
        }
        let confidence = self.bridge.min_confidence;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ConfigError::Invalid(format!(
                "bridge.min_confidence must be within 0.0..=1.0, got {confidence}"
            )));
        }
        Ok(())
    }
}
