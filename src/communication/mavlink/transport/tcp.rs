//! TCP Transport
//!
//! Client connection to a MAVLink TCP server: ArduPilot SITL (port 5760),
//! MAVProxy outputs, or a serial-to-network bridge on the companion
//! computer.

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use super::{socket_timeout, MavlinkTransport, TransportError};

/// MAVLink over a TCP stream.
pub struct TcpTransport {
    stream: TcpStream,
    peer: SocketAddr,
}

impl TcpTransport {
    /// Connect to `address` (`HOST:PORT`), trying each resolved address
    /// until one accepts. Name resolution and every attempt share one
    /// `deadline`.
    pub fn connect(
        address: &str,
        deadline: Instant,
        send_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let candidates = resolve(address, deadline)?;

        let mut last_error = TransportError::Disconnected;
        for peer in candidates {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                crate::log_debug!("tcp connect {}: deadline passed", address);
                return Err(TransportError::Timeout);
            }
            match TcpStream::connect_timeout(&peer, remaining) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    stream.set_write_timeout(Some(socket_timeout(send_timeout)))?;
                    return Ok(Self { stream, peer });
                }
                Err(e) => {
                    crate::log_debug!("tcp connect {} failed: {}", peer, e);
                    last_error = e.into();
                }
            }
        }
        Err(last_error)
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream, send_timeout: Duration) -> Result<Self, TransportError> {
        let peer = stream.peer_addr()?;
        stream.set_nodelay(true)?;
        stream.set_write_timeout(Some(socket_timeout(send_timeout)))?;
        Ok(Self { stream, peer })
    }
}

/// Resolve `address` without blocking past `deadline`.
///
/// Literal socket addresses skip the resolver. Host names are looked up on a
/// helper thread since the system resolver has no timeout of its own; a
/// lookup that outlives the deadline is abandoned.
fn resolve(address: &str, deadline: Instant) -> Result<Vec<SocketAddr>, TransportError> {
    if let Ok(addr) = address.parse::<SocketAddr>() {
        return Ok(vec![addr]);
    }

    let remaining = deadline.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        return Err(TransportError::Timeout);
    }

    let (tx, rx) = mpsc::channel();
    let host = address.to_string();
    thread::spawn(move || {
        let result = host
            .to_socket_addrs()
            .map(|addrs| addrs.collect::<Vec<_>>());
        let _ = tx.send(result);
    });

    match rx.recv_timeout(remaining) {
        Ok(Ok(addrs)) => Ok(addrs),
        Ok(Err(e)) => {
            crate::log_debug!("resolving {} failed: {}", address, e);
            Err(TransportError::IoError)
        }
        Err(_) => {
            crate::log_debug!("resolving {} timed out", address);
            Err(TransportError::Timeout)
        }
    }
}

impl MavlinkTransport for TcpTransport {
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError> {
        self.stream.set_read_timeout(Some(socket_timeout(timeout)))?;
        match self.stream.read(buf) {
            // Orderly shutdown by the peer
            Ok(0) if !buf.is_empty() => Err(TransportError::Disconnected),
            Ok(n) => Ok(n),
            Err(e) => match TransportError::from(e) {
                TransportError::Timeout => Ok(0),
                other => Err(other),
            },
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, TransportError> {
        Ok(self.stream.write(buf)?)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        Ok(self.stream.flush()?)
    }

    fn describe(&self) -> String {
        format!("tcp {}", self.peer)
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn deadline(ms: u64) -> Instant {
        Instant::now() + Duration::from_millis(ms)
    }

    #[test]
    fn test_loopback_read_write() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let mut transport = TcpTransport::connect(&addr, deadline(500), Duration::from_millis(50))
            .unwrap();
        let (mut server, _) = listener.accept().unwrap();

        transport.write(b"ping").unwrap();
        let mut buf = [0u8; 4];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ping");

        server.write_all(b"pong").unwrap();
        let mut buf = [0u8; 16];
        let n = transport.read(&mut buf, Duration::from_millis(500)).unwrap();
        assert_eq!(&buf[..n], b"pong");
    }

    #[test]
    fn test_read_timeout_returns_zero() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let mut transport =
            TcpTransport::connect(&addr, deadline(500), Duration::from_millis(50)).unwrap();
        let _server = listener.accept().unwrap();

        let mut buf = [0u8; 16];
        assert_eq!(transport.read(&mut buf, Duration::from_millis(10)), Ok(0));
    }

    #[test]
    fn test_peer_close_is_disconnected() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let mut transport =
            TcpTransport::connect(&addr, deadline(500), Duration::from_millis(50)).unwrap();
        let (server, _) = listener.accept().unwrap();
        drop(server);

        let mut buf = [0u8; 16];
        assert_eq!(
            transport.read(&mut buf, Duration::from_millis(500)),
            Err(TransportError::Disconnected)
        );
    }

    #[test]
    fn test_expired_deadline_does_not_connect() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let started = Instant::now();
        let result = TcpTransport::connect(&addr, started, Duration::from_millis(50));
        assert_eq!(result.err(), Some(TransportError::Timeout));
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_expired_deadline_skips_name_lookup() {
        let started = Instant::now();
        assert_eq!(
            resolve("autopilot.invalid:5760", started),
            Err(TransportError::Timeout)
        );
        assert_eq!(
            resolve("127.0.0.1:5760", started),
            Ok(vec!["127.0.0.1:5760".parse().unwrap()])
        );
    }
}
