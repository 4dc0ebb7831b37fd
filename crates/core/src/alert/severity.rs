//! Status message severity.

use core::fmt;
use core::str::FromStr;

use serde::Deserialize;

/// Urgency attached to an outbound status message.
///
/// Variants are declared from least to most urgent so that the derived `Ord`
/// reads naturally: `Severity::Info < Severity::Alert`. Each variant maps to
/// the MAVLink `MAV_SEVERITY_*` value of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Alert,
    Critical,
    Emergency,
}

impl Severity {
    /// Lowercase name, as accepted by configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Notice => "notice",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Alert => "alert",
            Severity::Critical => "critical",
            Severity::Emergency => "emergency",
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::Info
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a severity name is not recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownSeverity;

impl fmt::Display for UnknownSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown severity")
    }
}

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let all = [
            Severity::Debug,
            Severity::Info,
            Severity::Notice,
            Severity::Warning,
            Severity::Error,
            Severity::Alert,
            Severity::Critical,
            Severity::Emergency,
        ];
        all.into_iter()
            .find(|sev| sev.as_str().eq_ignore_ascii_case(s))
            .ok_or(UnknownSeverity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Notice);
        assert!(Severity::Notice < Severity::Warning);
        assert!(Severity::Warning < Severity::Alert);
        assert!(Severity::Alert < Severity::Critical);
        assert!(Severity::Critical < Severity::Emergency);
    }

    #[test]
    fn test_severity_parse_case_insensitive() {
        assert_eq!("ALERT".parse::<Severity>(), Ok(Severity::Alert));
        assert_eq!("notice".parse::<Severity>(), Ok(Severity::Notice));
        assert_eq!("loud".parse::<Severity>(), Err(UnknownSeverity));
    }
}
