//! Outbound status alerts.
//!
//! A MAVLink STATUSTEXT carries at most 50 bytes of text. `AlertMessage`
//! enforces that bound at construction time: longer text is cut back to the
//! last UTF-8 character boundary that fits, and the caller is handed a
//! `TruncationNotice` describing what happened.

mod policy;
mod severity;

pub use policy::{alert_text, ClearPolicy, ReportPlanner, CLEAR_TEXT};
pub use severity::{Severity, UnknownSeverity};

use heapless::String;

/// STATUSTEXT payload limit in bytes.
pub const STATUSTEXT_MAX_LEN: usize = 50;

/// Returns the longest prefix of `text` that is at most `max_len` bytes and
/// ends on a character boundary.
pub fn truncate_utf8(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len {
        return text;
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Informational record that alert text was shortened to fit the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationNotice {
    /// Byte length of the text as supplied.
    pub original_len: usize,
    /// Byte length actually kept.
    pub kept_len: usize,
}

/// One status notification, already bounded to the payload limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    severity: Severity,
    text: String<STATUSTEXT_MAX_LEN>,
}

impl AlertMessage {
    /// Builds a message, truncating `text` if it exceeds the payload limit.
    pub fn new(severity: Severity, text: &str) -> (Self, Option<TruncationNotice>) {
        let kept = truncate_utf8(text, STATUSTEXT_MAX_LEN);
        let notice = (kept.len() < text.len()).then(|| TruncationNotice {
            original_len: text.len(),
            kept_len: kept.len(),
        });

        let message = Self {
            severity,
            text: String::try_from(kept).unwrap_or_default(),
        };
        (message, notice)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Text as a fixed-size, NUL-padded payload field.
    pub fn payload(&self) -> [u8; STATUSTEXT_MAX_LEN] {
        let mut bytes = [0u8; STATUSTEXT_MAX_LEN];
        let text = self.text.as_bytes();
        bytes[..text.len()].copy_from_slice(text);
        bytes
    }
}
