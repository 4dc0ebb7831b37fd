//! Serial Transport Implementation
//!
//! Telemetry radios (SiK, RFD900) and USB-attached flight controllers show up
//! as serial devices. Settings follow the MAVLink convention:
//!
//! - Baud rate: 57600 (telemetry radios), 115200 / 921600 (USB, high-speed)
//! - 8 data bits, no parity, 1 stop bit
//! - No flow control (MAVLink handles flow control in protocol)

use std::io::{Read, Write};
use std::time::Duration;

use serialport::SerialPort;

use super::{socket_timeout, MavlinkTransport, TransportError};

/// MAVLink over a serial device.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    path: String,
    baud_rate: u32,
    send_timeout: Duration,
}

impl SerialTransport {
    /// Open `path` at `baud_rate`, 8N1, no flow control.
    pub fn open(path: &str, baud_rate: u32, send_timeout: Duration) -> Result<Self, TransportError> {
        let port = serialport::new(path, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(socket_timeout(send_timeout))
            .open()
            .map_err(|e| {
                crate::log_debug!("serial open {} failed: {}", path, e);
                classify(&e)
            })?;

        Ok(Self {
            port,
            path: path.to_string(),
            baud_rate,
            send_timeout,
        })
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<(), TransportError> {
        self.port
            .set_timeout(socket_timeout(timeout))
            .map_err(|e| classify(&e))
    }
}

impl MavlinkTransport for SerialTransport {
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError> {
        self.set_timeout(timeout)?;
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) => match TransportError::from(e) {
                TransportError::Timeout => Ok(0),
                other => Err(other),
            },
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, TransportError> {
        self.set_timeout(self.send_timeout)?;
        Ok(self.port.write(buf)?)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        Ok(self.port.flush()?)
    }

    fn describe(&self) -> String {
        format!("serial {} @ {} baud", self.path, self.baud_rate)
    }
}

fn classify(err: &serialport::Error) -> TransportError {
    match err.kind() {
        serialport::ErrorKind::NoDevice => TransportError::Disconnected,
        serialport::ErrorKind::Io(kind) => TransportError::from(std::io::Error::from(kind)),
        _ => TransportError::IoError,
    }
}
