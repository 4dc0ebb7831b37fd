//! Endpoint strings.
//!
//! Accepts the connection strings ground-station tooling uses:
//!
//! | String                 | Transport                          |
//! |------------------------|------------------------------------|
//! | `/dev/ttyUSB0`, `COM11`| serial, configured baud rate       |
//! | `serial:PATH[:BAUD]`   | serial, optional baud override     |
//! | `tcp:HOST:PORT`        | TCP client                         |
//! | `udpin:HOST:PORT`      | UDP, listen for the autopilot      |
//! | `udp:HOST:PORT`        | same as `udpin:`                   |
//! | `udpout:HOST:PORT`     | UDP, send to the autopilot         |

use core::fmt;

use crate::error::ConnectionError;

/// Parsed endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Serial { path: String, baud: Option<u32> },
    Tcp { address: String },
    UdpIn { address: String },
    UdpOut { address: String },
}

impl Endpoint {
    pub fn parse(s: &str) -> Result<Self, ConnectionError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(invalid(s, "empty endpoint"));
        }

        if let Some(address) = s.strip_prefix("tcp:") {
            return Ok(Endpoint::Tcp {
                address: host_port(s, address)?,
            });
        }
        if let Some(address) = s.strip_prefix("udpout:") {
            return Ok(Endpoint::UdpOut {
                address: host_port(s, address)?,
            });
        }
        if let Some(address) = s.strip_prefix("udpin:").or_else(|| s.strip_prefix("udp:")) {
            return Ok(Endpoint::UdpIn {
                address: host_port(s, address)?,
            });
        }
        if let Some(rest) = s.strip_prefix("serial:") {
            return serial(s, rest);
        }

        Ok(Endpoint::Serial {
            path: s.to_string(),
            baud: None,
        })
    }

    pub fn is_serial(&self) -> bool {
        matches!(self, Endpoint::Serial { .. })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Serial { path, baud: None } => write!(f, "{path}"),
            Endpoint::Serial {
                path,
                baud: Some(baud),
            } => write!(f, "serial:{path}:{baud}"),
            Endpoint::Tcp { address } => write!(f, "tcp:{address}"),
            Endpoint::UdpIn { address } => write!(f, "udpin:{address}"),
            Endpoint::UdpOut { address } => write!(f, "udpout:{address}"),
        }
    }
}

fn serial(original: &str, rest: &str) -> Result<Endpoint, ConnectionError> {
    if rest.is_empty() {
        return Err(invalid(original, "missing serial device path"));
    }
    match rest.rsplit_once(':') {
        Some((path, baud)) if !path.is_empty() && baud.chars().all(|c| c.is_ascii_digit()) => {
            let baud: u32 = baud
                .parse()
                .map_err(|_| invalid(original, "baud rate out of range"))?;
            if baud == 0 {
                return Err(invalid(original, "baud rate must be non-zero"));
            }
            Ok(Endpoint::Serial {
                path: path.to_string(),
                baud: Some(baud),
            })
        }
        _ => Ok(Endpoint::Serial {
            path: rest.to_string(),
            baud: None,
        }),
    }
}

fn host_port(original: &str, address: &str) -> Result<String, ConnectionError> {
    let Some((host, port)) = address.rsplit_once(':') else {
        return Err(invalid(original, "expected HOST:PORT"));
    };
    if host.is_empty() {
        return Err(invalid(original, "missing host"));
    }
    port.parse::<u16>()
        .map_err(|_| invalid(original, "invalid port"))?;
    Ok(address.to_string())
}

fn invalid(endpoint: &str, reason: &str) -> ConnectionError {
    ConnectionError::InvalidEndpoint(format!("{endpoint:?}: {reason}"))
}
