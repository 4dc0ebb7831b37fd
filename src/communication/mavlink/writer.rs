//! MAVLink Message Writer
//!
//! Serializes outgoing messages as MAVLink 2.0 frames with our system and
//! component id, and writes them to a transport.
//!
//! The sequence number advances once per encoded frame and wraps at 255.

use std::io::Cursor;

use mavlink::common::MavMessage;
use mavlink::MavHeader;

use super::transport::{self, MavlinkTransport};
use crate::error::SendError;

/// Writer statistics for monitoring and diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Total messages successfully sent
    pub messages_sent: u32,
    /// Transport write errors
    pub write_errors: u32,
}

/// MAVLink message writer
pub struct MavlinkWriter {
    /// System ID we send as
    system_id: u8,
    /// Component ID we send as
    component_id: u8,
    /// Message sequence counter
    sequence: u8,
    stats: WriterStats,
}

impl MavlinkWriter {
    /// Create a new MAVLink writer
    ///
    /// # Arguments
    ///
    /// * `system_id` - MAVLink system ID stamped on every frame
    /// * `component_id` - MAVLink component ID stamped on every frame
    pub fn new(system_id: u8, component_id: u8) -> Self {
        Self {
            system_id,
            component_id,
            sequence: 0,
            stats: WriterStats::default(),
        }
    }

    pub fn system_id(&self) -> u8 {
        self.system_id
    }

    pub fn component_id(&self) -> u8 {
        self.component_id
    }

    /// Get writer statistics
    pub fn stats(&self) -> WriterStats {
        self.stats
    }

    /// Get the sequence number the next frame will carry
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    /// Serialize a message into a complete v2 frame.
    pub fn encode(&mut self, message: &MavMessage) -> Result<Vec<u8>, SendError> {
        let header = MavHeader {
            system_id: self.system_id,
            component_id: self.component_id,
            sequence: self.sequence,
        };

        let mut buf = Cursor::new(Vec::with_capacity(64));
        mavlink::write_v2_msg(&mut buf, header, message)
            .map_err(|e| SendError::Encode(e.to_string()))?;

        self.sequence = self.sequence.wrapping_add(1);
        Ok(buf.into_inner())
    }

    /// Encode `message` and write the whole frame to `transport`.
    pub fn send(
        &mut self,
        transport: &mut dyn MavlinkTransport,
        message: &MavMessage,
    ) -> Result<(), SendError> {
        let frame = self.encode(message)?;
        match transport::write_all(transport, &frame) {
            Ok(()) => {
                self.stats.messages_sent += 1;
                Ok(())
            }
            Err(e) => {
                self.stats.write_errors += 1;
                Err(SendError::Transport(e))
            }
        }
    }
}
