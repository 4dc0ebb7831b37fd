//! UDP Transport for MAVLink Communication
//!
//! Two modes, matching ground-station tooling:
//!
//! - **udpin** binds a local port and waits for the autopilot to send first.
//!   The sender of the most recent datagram becomes the reply address.
//! - **udpout** binds an ephemeral port and sends to a fixed address.
//!
//! Each datagram carries whole MAVLink frames, so reads hand back complete
//! datagrams.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use super::{socket_timeout, MavlinkTransport, TransportError};

/// MAVLink over a UDP socket.
pub struct UdpTransport {
    socket: UdpSocket,
    remote: Option<SocketAddr>,
    /// `udpin` follows the autopilot's source address
    track_sender: bool,
}

impl UdpTransport {
    /// Bind `address` and wait for the autopilot to talk first.
    pub fn listen(address: &str, send_timeout: Duration) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(address)?;
        socket.set_write_timeout(Some(socket_timeout(send_timeout)))?;
        Ok(Self {
            socket,
            remote: None,
            track_sender: true,
        })
    }

    /// Bind an ephemeral port and send to `address`.
    pub fn send_to(address: &str, send_timeout: Duration) -> Result<Self, TransportError> {
        let remote = address
            .to_socket_addrs()?
            .next()
            .ok_or(TransportError::IoError)?;
        let bind_addr = if remote.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(bind_addr)?;
        socket.set_write_timeout(Some(socket_timeout(send_timeout)))?;
        Ok(Self {
            socket,
            remote: Some(remote),
            track_sender: false,
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.local_addr().ok()
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote
    }
}

impl MavlinkTransport for UdpTransport {
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError> {
        self.socket.set_read_timeout(Some(socket_timeout(timeout)))?;
        match self.socket.recv_from(buf) {
            Ok((len, sender)) => {
                if self.track_sender && self.remote != Some(sender) {
                    crate::log_debug!("udp peer is now {}", sender);
                    self.remote = Some(sender);
                }
                Ok(len)
            }
            Err(e) => match TransportError::from(e) {
                TransportError::Timeout => Ok(0),
                // ICMP port unreachable from an earlier send; the socket is still usable
                TransportError::Disconnected => Ok(0),
                other => Err(other),
            },
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, TransportError> {
        // Nobody has spoken to a udpin socket yet: nowhere to send
        let remote = self.remote.ok_or(TransportError::Disconnected)?;
        Ok(self.socket.send_to(buf, remote)?)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    fn describe(&self) -> String {
        match (self.track_sender, self.remote, self.local_addr()) {
            (true, Some(remote), _) => format!("udpin from {remote}"),
            (true, None, Some(local)) => format!("udpin on {local}"),
            (_, Some(remote), _) => format!("udpout to {remote}"),
            _ => "udp".to_string(),
        }
    }
}
