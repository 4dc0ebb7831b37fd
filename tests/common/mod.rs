//! Fake autopilot for loopback tests.
//!
//! Speaks just enough MAVLink to satisfy the link: it sends ArduCopter
//! heartbeats and records every frame it receives until the peer goes away
//! or the capture window closes.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, UdpSocket};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use detect_link::communication::mavlink::parser::FrameParser;
use mavlink::common::{
    MavAutopilot, MavMessage, MavModeFlag, MavState, MavType, HEARTBEAT_DATA, STATUSTEXT_DATA,
};
use mavlink::MavHeader;

pub const AUTOPILOT_SYSTEM: u8 = 1;
pub const AUTOPILOT_COMPONENT: u8 = 1;
pub const COMPANION_COMPONENT: u8 = 191;

pub fn heartbeat_frame(sequence: u8) -> Vec<u8> {
    heartbeat_frame_from(
        AUTOPILOT_SYSTEM,
        AUTOPILOT_COMPONENT,
        MavType::MAV_TYPE_QUADROTOR,
        MavAutopilot::MAV_AUTOPILOT_ARDUPILOTMEGA,
        sequence,
    )
}

/// Heartbeat of a companion computer sharing the vehicle's system id.
pub fn companion_heartbeat_frame() -> Vec<u8> {
    heartbeat_frame_from(
        AUTOPILOT_SYSTEM,
        COMPANION_COMPONENT,
        MavType::MAV_TYPE_ONBOARD_CONTROLLER,
        MavAutopilot::MAV_AUTOPILOT_INVALID,
        0,
    )
}

pub fn heartbeat_frame_from(
    system_id: u8,
    component_id: u8,
    mavtype: MavType,
    autopilot: MavAutopilot,
    sequence: u8,
) -> Vec<u8> {
    let header = MavHeader {
        system_id,
        component_id,
        sequence,
    };
    let msg = MavMessage::HEARTBEAT(HEARTBEAT_DATA {
        custom_mode: 0, // STABILIZE
        mavtype,
        autopilot,
        base_mode: MavModeFlag::MAV_MODE_FLAG_CUSTOM_MODE_ENABLED,
        system_status: MavState::MAV_STATE_STANDBY,
        mavlink_version: 3,
    });
    let mut buf = Cursor::new(Vec::new());
    mavlink::write_v2_msg(&mut buf, header, &msg).unwrap();
    buf.into_inner()
}

pub fn decode(bytes: &[u8]) -> Vec<MavMessage> {
    let mut parser = FrameParser::new();
    parser.push(bytes);
    std::iter::from_fn(|| parser.next_message())
        .map(|(_, msg)| msg)
        .collect()
}

/// Text of a STATUSTEXT with the NUL padding removed.
pub fn statustext(data: &STATUSTEXT_DATA) -> String {
    let bytes: &[u8] = data.text.as_ref();
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8(bytes[..end].to_vec()).unwrap()
}

pub fn statustexts(messages: &[MavMessage]) -> Vec<String> {
    messages
        .iter()
        .filter_map(|msg| match msg {
            MavMessage::STATUSTEXT(data) => Some(statustext(data)),
            _ => None,
        })
        .collect()
}

/// TCP server that heartbeats once on accept, then records until the
/// client disconnects or `window` elapses.
pub fn tcp_autopilot(send_heartbeat: bool, window: Duration) -> (SocketAddr, JoinHandle<Vec<MavMessage>>) {
    let greeting = if send_heartbeat {
        vec![heartbeat_frame(0)]
    } else {
        Vec::new()
    };
    tcp_autopilot_greeting(greeting, window)
}

/// TCP server that writes `greeting` frames on accept, then records until
/// the client disconnects or `window` elapses.
pub fn tcp_autopilot_greeting(
    greeting: Vec<Vec<u8>>,
    window: Duration,
) -> (SocketAddr, JoinHandle<Vec<MavMessage>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        for frame in &greeting {
            stream.write_all(frame).unwrap();
        }
        record(&mut stream, Instant::now() + window, false)
    });

    (addr, handle)
}

/// Read frames from `stream` until the peer closes or `deadline` passes,
/// optionally heartbeating every read slice.
fn record(stream: &mut TcpStream, deadline: Instant, heartbeat: bool) -> Vec<MavMessage> {
    stream
        .set_read_timeout(Some(Duration::from_millis(50)))
        .unwrap();

    let mut received = Vec::new();
    let mut buf = [0u8; 1024];
    let mut sequence = 1u8;
    while Instant::now() < deadline {
        if heartbeat {
            if stream.write_all(&heartbeat_frame(sequence)).is_err() {
                break;
            }
            sequence = sequence.wrapping_add(1);
        }
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => received.extend_from_slice(&buf[..n]),
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(_) => break,
        }
    }
    decode(&received)
}

/// TCP autopilot that reboots: it heartbeats once, hangs up after
/// `first_session`, then accepts the next client and heartbeats every
/// 50 ms while recording until `window` elapses.
///
/// Returns what the second session received.
pub fn rebooting_tcp_autopilot(
    first_session: Duration,
    window: Duration,
) -> (SocketAddr, JoinHandle<Vec<MavMessage>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let (mut first, _) = listener.accept().unwrap();
        first.write_all(&heartbeat_frame(0)).unwrap();
        thread::sleep(first_session);
        drop(first);

        let (mut second, _) = listener.accept().unwrap();
        record(&mut second, Instant::now() + window, true)
    });

    (addr, handle)
}

/// A free UDP port on the loopback interface.
pub fn free_udp_port() -> u16 {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.local_addr().unwrap().port()
}

/// UDP autopilot that heartbeats to `target` every 50 ms and records
/// replies until `expected` messages arrived or `window` elapses.
pub fn udp_autopilot(
    target: SocketAddr,
    expected: usize,
    window: Duration,
) -> JoinHandle<Vec<MavMessage>> {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket
        .set_read_timeout(Some(Duration::from_millis(50)))
        .unwrap();

    thread::spawn(move || {
        let deadline = Instant::now() + window;
        let mut received = Vec::new();
        let mut buf = [0u8; 1024];
        let mut sequence = 0u8;
        while Instant::now() < deadline {
            let _ = socket.send_to(&heartbeat_frame(sequence), target);
            sequence = sequence.wrapping_add(1);
            if let Ok((n, _)) = socket.recv_from(&mut buf) {
                received.extend(decode(&buf[..n]));
                if received.len() >= expected {
                    break;
                }
            }
        }
        received
    })
}
