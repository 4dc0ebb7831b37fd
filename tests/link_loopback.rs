//! TelemetryLink against a fake autopilot over real loopback sockets.

mod common;

use std::net::TcpListener;
use std::time::{Duration, Instant};

use detect_link::communication::mavlink::connect;
use detect_link::{ConnectionError, LinkParams, TelemetryLink};
use detect_link_core::alert::Severity;
use detect_link_core::link::LinkState;
use mavlink::common::{MavCmd, MavMessage, MavSeverity};

use common::{
    companion_heartbeat_frame, heartbeat_frame, rebooting_tcp_autopilot, statustexts,
    tcp_autopilot, tcp_autopilot_greeting, udp_autopilot, AUTOPILOT_COMPONENT, AUTOPILOT_SYSTEM,
};

fn params(endpoint: String, heartbeat_timeout_ms: u64) -> LinkParams {
    LinkParams {
        heartbeat_timeout_ms,
        ..LinkParams::for_endpoint(endpoint)
    }
}

#[test]
fn test_tcp_session() {
    let (addr, autopilot) = tcp_autopilot(true, Duration::from_secs(5));

    let link = TelemetryLink::new(params(format!("tcp:{addr}"), 2000));
    let mut conn = link.connect();
    assert_eq!(conn.state(), LinkState::Connected);
    assert_eq!(conn.target_system_id(), Some(AUTOPILOT_SYSTEM));

    link.send_status(&mut conn, Severity::Alert, "DETECTED 2: car, person")
        .unwrap();
    let long = format!("{}ü tail", "b".repeat(49));
    link.send_status(&mut conn, Severity::Info, &long).unwrap();
    assert!(link.list_available_modes(&conn).unwrap().contains("LOITER"));
    assert!(link.request_mode(&mut conn, "LOITER"));
    assert!(!link.request_mode(&mut conn, "NOT_A_MODE"));

    link.close(&mut conn);
    link.close(&mut conn);
    assert_eq!(conn.state(), LinkState::Disconnected);

    let received = autopilot.join().unwrap();
    assert_eq!(
        statustexts(&received),
        vec!["DETECTED 2: car, person".to_string(), "b".repeat(49)]
    );

    let severities: Vec<MavSeverity> = received
        .iter()
        .filter_map(|msg| match msg {
            MavMessage::STATUSTEXT(data) => Some(data.severity),
            _ => None,
        })
        .collect();
    assert_eq!(
        severities,
        vec![MavSeverity::MAV_SEVERITY_ALERT, MavSeverity::MAV_SEVERITY_INFO]
    );

    let commands: Vec<_> = received
        .iter()
        .filter_map(|msg| match msg {
            MavMessage::COMMAND_LONG(cmd) => Some(cmd),
            _ => None,
        })
        .collect();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].command, MavCmd::MAV_CMD_DO_SET_MODE);
    assert_eq!(commands[0].target_system, AUTOPILOT_SYSTEM);
    assert_eq!(commands[0].param2, 5.0); // Copter LOITER
}

#[test]
fn test_tcp_no_heartbeat_times_out() {
    let (addr, autopilot) = tcp_autopilot(false, Duration::from_secs(2));

    let started = Instant::now();
    let link = TelemetryLink::new(params(format!("tcp:{addr}"), 300));
    let mut conn = link.connect();
    let elapsed = started.elapsed();

    assert_eq!(conn.state(), LinkState::Disconnected);
    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed < Duration::from_millis(1500), "took {elapsed:?}");
    assert!(matches!(
        conn.last_error(),
        Some(ConnectionError::HeartbeatTimeout { timeout_ms: 300, .. })
    ));

    // Nothing goes out on a disconnected link
    assert_eq!(link.send_status(&mut conn, Severity::Alert, "x"), Ok(()));
    assert!(!link.request_mode(&mut conn, "LOITER"));
    link.close(&mut conn);

    assert!(autopilot.join().unwrap().is_empty());
}

#[test]
fn test_unreachable_endpoint() {
    // Grab a free port and release it so nothing is listening there
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let started = Instant::now();
    let (link, mut conn) = connect(
        &format!("tcp:127.0.0.1:{port}"),
        57600,
        1,
        0,
        Duration::from_secs(5),
    );
    assert!(started.elapsed() < Duration::from_secs(6));
    assert_eq!(conn.state(), LinkState::Disconnected);
    assert!(matches!(conn.last_error(), Some(ConnectionError::Open { .. })));
    assert!(link.list_available_modes(&conn).is_err());
    link.close(&mut conn);
}

#[test]
fn test_missing_serial_device() {
    let link = TelemetryLink::new(params("/dev/detect-link-missing".into(), 200));
    let conn = link.connect();
    assert_eq!(conn.state(), LinkState::Disconnected);
    assert!(matches!(conn.last_error(), Some(ConnectionError::Open { .. })));
}

#[test]
fn test_udp_session() {
    let port = common::free_udp_port();
    let target = format!("127.0.0.1:{port}").parse().unwrap();
    let autopilot = udp_autopilot(target, 1, Duration::from_secs(5));

    let link = TelemetryLink::new(params(format!("udpin:127.0.0.1:{port}"), 3000));
    let mut conn = link.connect();
    assert_eq!(conn.state(), LinkState::Connected);

    link.send_status(&mut conn, Severity::Warning, "DETECTED 1: boat")
        .unwrap();

    let received = autopilot.join().unwrap();
    link.close(&mut conn);
    assert_eq!(statustexts(&received), vec!["DETECTED 1: boat".to_string()]);
}

#[test]
fn test_companion_heartbeat_first() {
    let (addr, autopilot) = tcp_autopilot_greeting(
        vec![companion_heartbeat_frame(), heartbeat_frame(0)],
        Duration::from_secs(5),
    );

    let link = TelemetryLink::new(params(format!("tcp:{addr}"), 2000));
    let mut conn = link.connect();
    assert_eq!(conn.state(), LinkState::Connected);
    let target = conn.target().copied().unwrap();
    assert_eq!(target.system_id, AUTOPILOT_SYSTEM);
    assert_eq!(target.component_id, AUTOPILOT_COMPONENT);
    assert!(link.list_available_modes(&conn).unwrap().contains("LOITER"));
    assert!(link.request_mode(&mut conn, "LOITER"));
    link.close(&mut conn);

    let received = autopilot.join().unwrap();
    let commands: Vec<_> = received
        .iter()
        .filter_map(|msg| match msg {
            MavMessage::COMMAND_LONG(cmd) => Some(cmd),
            _ => None,
        })
        .collect();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].target_component, AUTOPILOT_COMPONENT);
}

#[test]
fn test_tcp_autopilot_reboot_reconnects() {
    let (addr, autopilot) =
        rebooting_tcp_autopilot(Duration::from_millis(200), Duration::from_secs(5));

    let link = TelemetryLink::new(LinkParams {
        reconnect_interval_ms: 100,
        ..params(format!("tcp:{addr}"), 2000)
    });
    let mut conn = link.connect();
    assert_eq!(conn.state(), LinkState::Connected);

    // Keep reporting through the outage, as the detection loop would
    let started = Instant::now();
    let mut recovered = false;
    while started.elapsed() < Duration::from_secs(4) {
        link.poll(&mut conn);
        let _ = link.send_status(&mut conn, Severity::Info, "scanning");
        if conn.stats().reconnects > 0 && conn.is_connected() {
            recovered = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    assert!(recovered, "state {} stats {:?}", conn.state(), conn.stats());
    assert!(conn.stats().channel_drops >= 1);

    link.send_status(&mut conn, Severity::Alert, "DETECTED 1: person")
        .unwrap();
    link.close(&mut conn);

    let received = autopilot.join().unwrap();
    assert!(statustexts(&received).contains(&"DETECTED 1: person".to_string()));
}
