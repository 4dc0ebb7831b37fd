//! MAVLink Transport Abstraction
//!
//! The link talks to the autopilot through the `MavlinkTransport` trait and
//! never touches a serial port or socket directly. Implementations:
//!
//! - `serial` - USB/UART telemetry radios and flight controllers
//! - `tcp` - SITL and network bridges (`tcp:HOST:PORT`)
//! - `udp` - `udpin:` (listen) and `udpout:` (send to) endpoints
//! - `mock` - scripted in-memory transport for tests
//!
//! # Design Pattern
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │            TelemetryLink             │
//! │   (parser, writer, state machine)    │
//! └──────────┬───────────────────────────┘
//!            │ Box<dyn MavlinkTransport>
//!            ▼
//! ┌─────────────────┬────────────────┬───────────────┐
//! │ SerialTransport │  TcpTransport  │ UdpTransport  │
//! └─────────────────┴────────────────┴───────────────┘
//! ```
//!
//! Every operation is bounded in time: reads take an explicit timeout and
//! writes use the send timeout configured when the transport was opened.

pub mod endpoint;
pub mod serial;
pub mod tcp;
pub mod udp;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use endpoint::Endpoint;

use std::io;
use std::time::{Duration, Instant};

/// Byte-stream channel to the autopilot.
pub trait MavlinkTransport: Send {
    /// Read whatever is available, waiting at most `timeout`.
    ///
    /// Returns `Ok(0)` when nothing arrived in time. A closed channel is an
    /// error (`Disconnected`), not `Ok(0)`.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError>;

    /// Write bytes, blocking no longer than the transport's send timeout.
    fn write(&mut self, buf: &[u8]) -> Result<usize, TransportError>;

    /// Push out anything buffered by `write`.
    fn flush(&mut self) -> Result<(), TransportError>;

    /// Short description for log lines.
    fn describe(&self) -> String;
}

/// Transport error types
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Unclassified I/O failure (driver error, permission denied, ...)
    #[error("I/O error")]
    IoError,

    /// The operation did not complete within its time bound
    #[error("Operation timed out")]
    Timeout,

    /// The channel is gone (cable unplugged, peer closed the socket)
    #[error("Transport disconnected")]
    Disconnected,
}

impl TransportError {
    /// True when the channel itself is gone and has to be reopened.
    ///
    /// A timeout leaves the channel usable.
    pub fn is_channel_lost(self) -> bool {
        matches!(self, TransportError::IoError | TransportError::Disconnected)
    }
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => TransportError::Timeout,
            io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::NotConnected
            | io::ErrorKind::NotFound
            | io::ErrorKind::UnexpectedEof => TransportError::Disconnected,
            _ => TransportError::IoError,
        }
    }
}

/// Write the whole buffer, looping over short writes.
pub fn write_all(transport: &mut dyn MavlinkTransport, mut buf: &[u8]) -> Result<(), TransportError> {
    while !buf.is_empty() {
        match transport.write(buf)? {
            0 => return Err(TransportError::Disconnected),
            n => buf = &buf[n..],
        }
    }
    transport.flush()
}

/// Open the channel described by `endpoint`.
///
/// Connection setup (name lookup, TCP connect) gives up at `deadline`;
/// `send_timeout` bounds every later write.
pub fn open(
    endpoint: &Endpoint,
    baud_rate: u32,
    deadline: Instant,
    send_timeout: Duration,
) -> Result<Box<dyn MavlinkTransport>, TransportError> {
    let transport: Box<dyn MavlinkTransport> = match endpoint {
        Endpoint::Serial { path, baud } => Box::new(serial::SerialTransport::open(
            path,
            baud.unwrap_or(baud_rate),
            send_timeout,
        )?),
        Endpoint::Tcp { address } => Box::new(tcp::TcpTransport::connect(
            address,
            deadline,
            send_timeout,
        )?),
        Endpoint::UdpIn { address } => Box::new(udp::UdpTransport::listen(address, send_timeout)?),
        Endpoint::UdpOut { address } => Box::new(udp::UdpTransport::send_to(address, send_timeout)?),
    };
    Ok(transport)
}

/// Socket timeouts reject zero; clamp to the smallest useful wait.
pub(crate) fn socket_timeout(timeout: Duration) -> Duration {
    timeout.max(Duration::from_millis(1))
}
