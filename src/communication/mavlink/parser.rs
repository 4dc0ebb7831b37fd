//! MAVLink Frame Parser
//!
//! Turns an arbitrary byte stream into MAVLink messages.
//!
//! # Framing
//!
//! - Scan for a start-of-frame magic (`0xFE` v1, `0xFD` v2), discarding noise
//! - Read the payload length from byte 1 to size the frame
//!   (v1: 8 + len, v2: 12 + len, +13 if the signed flag is set)
//! - Wait for the whole frame before handing it to rust-mavlink
//! - Frames that fail to decode (CRC mismatch, unknown message id) are
//!   dropped and counted
//!
//! Serial links deliver frames in arbitrary pieces, so bytes are buffered
//! across `push` calls.

use std::io::Cursor;

use mavlink::common::MavMessage;
use mavlink::peek_reader::PeekReader;
use mavlink::MavHeader;

/// Upper bound on buffered, not-yet-framed bytes
pub const RX_BUFFER_SIZE: usize = 4096;

const MAGIC_V1: u8 = 0xFE;
const MAGIC_V2: u8 = 0xFD;
const V1_OVERHEAD: usize = 8;
const V2_OVERHEAD: usize = 12;
const V2_SIGNATURE_LEN: usize = 13;
const V2_FLAG_SIGNED: u8 = 0x01;

/// Parser statistics for monitoring and diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserStats {
    /// Total messages successfully parsed
    pub messages_received: u32,
    /// Complete frames that failed to decode
    pub parse_errors: u32,
    /// Bytes skipped while searching for a frame start
    pub bytes_discarded: u32,
    /// Times the buffer hit `RX_BUFFER_SIZE` and old bytes were dropped
    pub buffer_overflows: u32,
}

/// Incremental MAVLink v1/v2 frame parser
#[derive(Debug, Default)]
pub struct FrameParser {
    rx_buffer: Vec<u8>,
    stats: ParserStats,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get parser statistics
    pub fn stats(&self) -> ParserStats {
        self.stats
    }

    /// Bytes waiting for the rest of their frame
    pub fn buffered(&self) -> usize {
        self.rx_buffer.len()
    }

    /// Drop buffered bytes (used when the channel is closed)
    pub fn clear(&mut self) {
        self.rx_buffer.clear();
    }

    /// Append freshly received bytes.
    pub fn push(&mut self, bytes: &[u8]) {
        self.rx_buffer.extend_from_slice(bytes);
        if self.rx_buffer.len() > RX_BUFFER_SIZE {
            let excess = self.rx_buffer.len() - RX_BUFFER_SIZE;
            self.rx_buffer.drain(..excess);
            self.stats.buffer_overflows += 1;
        }
    }

    /// Extract the next complete message, if one is buffered.
    pub fn next_message(&mut self) -> Option<(MavHeader, MavMessage)> {
        loop {
            let Some(pos) = self
                .rx_buffer
                .iter()
                .position(|&b| b == MAGIC_V1 || b == MAGIC_V2)
            else {
                self.stats.bytes_discarded += self.rx_buffer.len() as u32;
                self.rx_buffer.clear();
                return None;
            };
            if pos > 0 {
                self.rx_buffer.drain(..pos);
                self.stats.bytes_discarded += pos as u32;
            }

            let frame_size = frame_size(&self.rx_buffer)?;
            if self.rx_buffer.len() < frame_size {
                return None;
            }

            let magic = self.rx_buffer[0];
            let result = {
                let mut reader = PeekReader::new(Cursor::new(&self.rx_buffer[..frame_size]));
                if magic == MAGIC_V2 {
                    mavlink::read_v2_msg::<MavMessage, _>(&mut reader)
                } else {
                    mavlink::read_v1_msg::<MavMessage, _>(&mut reader)
                }
            };
            self.rx_buffer.drain(..frame_size);

            match result {
                Ok(message) => {
                    self.stats.messages_received += 1;
                    return Some(message);
                }
                Err(e) => {
                    self.stats.parse_errors += 1;
                    crate::log_trace!("dropped undecodable frame ({} bytes): {:?}", frame_size, e);
                }
            }
        }
    }
}

/// Size of the frame starting at `buf[0]`, or `None` if the header is
/// not complete yet.
fn frame_size(buf: &[u8]) -> Option<usize> {
    let magic = *buf.first()?;
    let payload_len = *buf.get(1)? as usize;
    if magic == MAGIC_V2 {
        let incompat_flags = *buf.get(2)?;
        let base = V2_OVERHEAD + payload_len;
        Some(if incompat_flags & V2_FLAG_SIGNED != 0 {
            base + V2_SIGNATURE_LEN
        } else {
            base
        })
    } else {
        Some(V1_OVERHEAD + payload_len)
    }
}
