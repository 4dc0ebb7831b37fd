//! Mock transport implementation for testing
//!
//! The mock is a handle onto shared state: hand the owning end to the code
//! under test and keep a `handle()` to script reads and inspect writes.

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use mavlink::common::MavMessage;
use mavlink::MavHeader;

use super::{MavlinkTransport, TransportError};
use crate::communication::mavlink::parser::FrameParser;

#[derive(Default)]
struct MockState {
    /// Chunks returned by successive read() calls
    reads: VecDeque<Vec<u8>>,
    written: Vec<u8>,
    write_calls: usize,
    read_calls: usize,
    read_error: Option<TransportError>,
    write_error: Option<TransportError>,
    flush_error: Option<TransportError>,
    max_write_chunk: Option<usize>,
    releases: usize,
}

/// Scripted in-memory transport.
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
    owner: bool,
}

impl MockTransport {
    /// Create the owning end. Dropping it counts as releasing the channel.
    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            owner: true,
        }
    }

    /// A non-owning handle onto the same state, for inspection.
    pub fn handle(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            owner: false,
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue raw bytes for one read() call.
    pub fn push_read(&self, data: &[u8]) {
        self.state().reads.push_back(data.to_vec());
    }

    /// Queue one MAVLink v2 frame for one read() call.
    pub fn push_message(&self, header: MavHeader, msg: &MavMessage) {
        let mut buf = Cursor::new(Vec::new());
        mavlink::write_v2_msg(&mut buf, header, msg).expect("encode test frame");
        self.push_read(&buf.into_inner());
    }

    pub fn set_read_error(&self, error: Option<TransportError>) {
        self.state().read_error = error;
    }

    pub fn set_write_error(&self, error: Option<TransportError>) {
        self.state().write_error = error;
    }

    pub fn set_flush_error(&self, error: Option<TransportError>) {
        self.state().flush_error = error;
    }

    /// Accept at most `n` bytes per write() call.
    pub fn set_max_write_chunk(&self, n: usize) {
        self.state().max_write_chunk = Some(n);
    }

    pub fn written_data(&self) -> Vec<u8> {
        self.state().written.clone()
    }

    pub fn clear_written(&self) {
        self.state().written.clear();
    }

    pub fn write_calls(&self) -> usize {
        self.state().write_calls
    }

    pub fn read_calls(&self) -> usize {
        self.state().read_calls
    }

    /// How many times the owning end has been dropped (0 or 1).
    pub fn releases(&self) -> usize {
        self.state().releases
    }

    /// Decode everything written so far.
    pub fn sent_messages(&self) -> Vec<(MavHeader, MavMessage)> {
        let mut parser = FrameParser::new();
        parser.push(&self.written_data());
        std::iter::from_fn(|| parser.next_message()).collect()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MavlinkTransport for MockTransport {
    fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize, TransportError> {
        let mut state = self.state();
        state.read_calls += 1;
        if let Some(error) = state.read_error {
            return Err(error);
        }

        let Some(mut chunk) = state.reads.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            state.reads.push_front(chunk.split_off(n));
        }
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, TransportError> {
        let mut state = self.state();
        state.write_calls += 1;
        if let Some(error) = state.write_error {
            return Err(error);
        }

        let n = state.max_write_chunk.map_or(buf.len(), |max| max.min(buf.len()));
        state.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        match self.state().flush_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        if self.owner {
            self.state().releases += 1;
        }
    }
}
