//! Telemetry Session Manager
//!
//! Owns the lifecycle of one link to an autopilot: open the channel, wait
//! for the first heartbeat, send STATUSTEXT alerts and mode changes, track
//! heartbeat liveness, and release the channel on close.
//!
//! # Failure model
//!
//! Nothing here is fatal to the caller. A channel that cannot be opened, or
//! an autopilot that never sends a heartbeat, yields a [`Connection`] in the
//! `Disconnected` state with the cause recorded in
//! [`Connection::last_error`]. Sends on a disconnected link are logged
//! no-ops. A failed transmit demotes the link to `Degraded`, and the next
//! heartbeat or successful transmit promotes it back.
//!
//! # Reconnection
//!
//! When an established channel goes away (TCP peer closed, serial device
//! unplugged) it is dropped and the link stays `Degraded`. `poll` and
//! `send_status` then try to reopen the same endpoint, at most once per
//! `reconnect_interval_ms` and each attempt bounded by `send_timeout_ms`. A
//! heartbeat on the new channel promotes the link back to `Connected`.
//!
//! # Blocking
//!
//! Only [`TelemetryLink::connect`] blocks, bounded by `heartbeat_timeout_ms`.
//! Sends and reopen attempts are bounded by the send timeout, and
//! [`TelemetryLink::poll`] only drains bytes that already arrived.
//!
//! # Concurrency
//!
//! A `Connection` exclusively owns its channel and is driven through
//! `&mut`. Callers reporting from several threads must serialize access
//! themselves, e.g. by wrapping the connection in a `Mutex`.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use detect_link_core::alert::{AlertMessage, Severity};
use detect_link_core::link::{LinkEvent, LinkState};
use detect_link_core::traits::TimeSource;
use mavlink::common::MavMessage;
use mavlink::MavHeader;

use super::command::set_mode_command;
use super::parser::{FrameParser, ParserStats};
use super::status_notifier::statustext;
use super::transport::{self, Endpoint, MavlinkTransport, TransportError};
use super::vehicle::{is_vehicle_heartbeat, TargetVehicle};
use super::writer::{MavlinkWriter, WriterStats};
use crate::core::StdTime;
use crate::error::{ConnectionError, NotConnectedError, SendError};
use crate::parameters::LinkParams;

/// Longest single read while waiting for the first heartbeat
const HEARTBEAT_READ_SLICE: Duration = Duration::from_millis(100);

/// Reads per `poll` call, so a chatty autopilot cannot pin the caller
const MAX_POLL_READS: usize = 16;

const READ_BUFFER_SIZE: usize = 2048;

/// Per-connection counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// STATUSTEXT frames put on the wire
    pub statustext_sent: u32,
    /// `send_status` calls skipped because the link was down
    pub send_noops: u32,
    /// Transmits that failed on an open channel
    pub send_failures: u32,
    /// Alerts shortened to fit the STATUSTEXT field
    pub truncations: u32,
    /// Heartbeats accepted from the target vehicle
    pub heartbeats_received: u32,
    /// Mode change commands sent
    pub mode_requests: u32,
    /// Established channels that went away
    pub channel_drops: u32,
    /// Attempts to reopen a lost channel
    pub reconnect_attempts: u32,
    /// Reopen attempts that produced a new channel
    pub reconnects: u32,
}

/// Logical link to one autopilot.
///
/// Created by [`TelemetryLink::connect`]; every operation on it goes
/// through the `TelemetryLink` that created it.
pub struct Connection {
    endpoint: String,
    baud_rate: u32,
    source_system_id: u8,
    source_component_id: u8,
    target: Option<TargetVehicle>,
    state: LinkState,
    closed: bool,
    transport: Option<Box<dyn MavlinkTransport>>,
    /// Where to reopen a lost channel; `None` for attached channels
    reopen_endpoint: Option<Endpoint>,
    last_reopen_us: Option<u64>,
    parser: FrameParser,
    writer: MavlinkWriter,
    last_heartbeat_us: Option<u64>,
    last_error: Option<ConnectionError>,
    stats: LinkStats,
}

impl Connection {
    fn new(endpoint: &str, params: &LinkParams) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            baud_rate: params.baud_rate,
            source_system_id: params.source_system_id,
            source_component_id: params.source_component_id,
            target: None,
            state: LinkState::Disconnected,
            closed: false,
            transport: None,
            reopen_endpoint: None,
            last_reopen_us: None,
            parser: FrameParser::new(),
            writer: MavlinkWriter::new(params.source_system_id, params.source_component_id),
            last_heartbeat_us: None,
            last_error: None,
            stats: LinkStats::default(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    pub fn source_system_id(&self) -> u8 {
        self.source_system_id
    }

    pub fn source_component_id(&self) -> u8 {
        self.source_component_id
    }

    /// System id learned from the first vehicle heartbeat
    pub fn target_system_id(&self) -> Option<u8> {
        self.target.map(|target| target.system_id)
    }

    pub fn target(&self) -> Option<&TargetVehicle> {
        self.target.as_ref()
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// True once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Why the connection attempt failed, if it did.
    pub fn last_error(&self) -> Option<&ConnectionError> {
        self.last_error.as_ref()
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    pub fn parser_stats(&self) -> ParserStats {
        self.parser.stats()
    }

    pub fn writer_stats(&self) -> WriterStats {
        self.writer.stats()
    }

    fn apply(&mut self, event: LinkEvent) {
        let next = self.state.on(event);
        if next != self.state {
            crate::log_debug!("link {}: {} -> {} ({:?})", self.endpoint, self.state, next, event);
            self.state = next;
        }
    }

    /// Handle one inbound message. Returns true for an accepted heartbeat.
    fn handle_message(&mut self, header: &MavHeader, message: &MavMessage, now_us: u64) -> bool {
        let MavMessage::HEARTBEAT(heartbeat) = message else {
            return false;
        };
        if !is_vehicle_heartbeat(
            header,
            heartbeat,
            self.source_system_id,
            self.source_component_id,
        ) {
            return false;
        }

        match self.target {
            None => {
                let target = TargetVehicle::from_heartbeat(header, heartbeat);
                let mode = target
                    .class
                    .and_then(|class| class.mode_name(heartbeat.custom_mode));
                crate::log_info!(
                    "heartbeat from system {} component {} ({:?}, {:?}, mode {})",
                    target.system_id,
                    target.component_id,
                    target.mav_type,
                    target.autopilot,
                    mode.unwrap_or("unknown")
                );
                self.target = Some(target);
            }
            // Other vehicles on a shared bus do not vouch for ours
            Some(target)
                if (target.system_id, target.component_id)
                    != (header.system_id, header.component_id) =>
            {
                return false
            }
            Some(_) => {}
        }

        self.stats.heartbeats_received += 1;
        self.last_heartbeat_us = Some(now_us);
        self.apply(LinkEvent::HeartbeatReceived);
        true
    }

    /// Encode and write one message, updating the link state.
    fn transmit(&mut self, message: &MavMessage) -> Result<(), SendError> {
        let Some(transport) = self.transport.as_mut() else {
            return Err(SendError::NotConnected);
        };

        match self.writer.send(transport.as_mut(), message) {
            Ok(()) => {
                self.apply(LinkEvent::TransmitSucceeded);
                Ok(())
            }
            Err(SendError::Transport(e)) => {
                self.stats.send_failures += 1;
                crate::log_warn!("transmit to {} failed: {}", self.endpoint, e);
                self.apply(LinkEvent::TransmitFailed);
                if e.is_channel_lost() {
                    self.drop_channel(e);
                }
                Err(SendError::Transport(e))
            }
            Err(e) => {
                self.stats.send_failures += 1;
                crate::log_error!("{}", e);
                Err(e)
            }
        }
    }

    /// Forget an established channel that went away.
    ///
    /// Logged once per loss; the link stays `Degraded` until a reopened
    /// channel delivers a heartbeat.
    fn drop_channel(&mut self, error: TransportError) {
        if self.transport.take().is_none() {
            return;
        }
        self.parser.clear();
        self.stats.channel_drops += 1;
        self.apply(LinkEvent::HeartbeatLost);
        crate::log_warn!("channel to {} lost: {}", self.endpoint, error);
    }

    /// Give up on the channel after a failed connection attempt.
    fn fail(&mut self, event: LinkEvent, error: ConnectionError) {
        crate::log_warn!("MAVLink connection failed: {}", error);
        self.transport = None;
        self.parser.clear();
        self.apply(event);
        self.last_error = Some(error);
    }
}

/// Open a link with explicit parameters and the wall clock.
///
/// Shorthand for building [`LinkParams`] and calling
/// [`TelemetryLink::connect`].
pub fn connect(
    endpoint: &str,
    baud_rate: u32,
    source_system_id: u8,
    source_component_id: u8,
    heartbeat_timeout: Duration,
) -> (TelemetryLink, Connection) {
    let params = LinkParams {
        endpoint: endpoint.to_string(),
        baud_rate,
        source_system_id,
        source_component_id,
        heartbeat_timeout_ms: heartbeat_timeout.as_millis() as u64,
        ..LinkParams::default()
    };
    let link = TelemetryLink::new(params);
    let connection = link.connect();
    (link, connection)
}

/// Telemetry session manager
///
/// Holds the link configuration and the clock used for heartbeat liveness.
/// The time source is injectable so staleness can be tested without
/// sleeping.
pub struct TelemetryLink<T: TimeSource = StdTime> {
    params: LinkParams,
    time: T,
}

impl TelemetryLink<StdTime> {
    pub fn new(params: LinkParams) -> Self {
        Self::with_time(params, StdTime::new())
    }
}

impl<T: TimeSource> TelemetryLink<T> {
    pub fn with_time(params: LinkParams, time: T) -> Self {
        Self { params, time }
    }

    pub fn params(&self) -> &LinkParams {
        &self.params
    }

    /// Open the configured endpoint and wait for the first heartbeat.
    ///
    /// Blocks for at most `heartbeat_timeout_ms` (plus one read slice of
    /// scheduling slack). Never fails: on any problem the returned
    /// connection is `Disconnected` and carries the error.
    pub fn connect(&self) -> Connection {
        let started = Instant::now();
        let deadline = started + self.params.heartbeat_timeout();
        let mut conn = Connection::new(&self.params.endpoint, &self.params);
        conn.apply(LinkEvent::ConnectStarted);

        let endpoint = match Endpoint::parse(&self.params.endpoint) {
            Ok(endpoint) => endpoint,
            Err(error) => {
                conn.fail(LinkEvent::OpenFailed, error);
                return conn;
            }
        };

        crate::log_info!("connecting to {} ...", endpoint);
        match transport::open(
            &endpoint,
            self.params.baud_rate,
            deadline,
            self.params.send_timeout(),
        ) {
            Ok(transport) => {
                crate::log_debug!("opened {}", transport.describe());
                if let Endpoint::Serial {
                    baud: Some(baud), ..
                } = &endpoint
                {
                    conn.baud_rate = *baud;
                }
                conn.transport = Some(transport);
                conn.reopen_endpoint = Some(endpoint);
                self.wait_heartbeat(&mut conn, deadline);
            }
            Err(source) => {
                let error = ConnectionError::Open {
                    endpoint: self.params.endpoint.clone(),
                    source,
                };
                conn.fail(LinkEvent::OpenFailed, error);
            }
        }

        if conn.is_connected() {
            crate::log_info!(
                "MAVLink connected to {} in {} ms",
                conn.endpoint,
                started.elapsed().as_millis()
            );
        }
        conn
    }

    /// Wrap an already-open channel and wait for the first heartbeat.
    ///
    /// Used for channels created outside [`transport::open`], such as a
    /// socket handed over by a supervisor, or a mock in tests.
    pub fn attach(&self, transport: Box<dyn MavlinkTransport>, endpoint: &str) -> Connection {
        let deadline = Instant::now() + self.params.heartbeat_timeout();
        let mut conn = Connection::new(endpoint, &self.params);
        conn.apply(LinkEvent::ConnectStarted);
        conn.transport = Some(transport);
        self.wait_heartbeat(&mut conn, deadline);
        if conn.is_connected() {
            crate::log_info!("MAVLink connected to {}", conn.endpoint);
        }
        conn
    }

    fn wait_heartbeat(&self, conn: &mut Connection, deadline: Instant) {
        let mut buf = [0u8; READ_BUFFER_SIZE];

        loop {
            while let Some((header, message)) = conn.parser.next_message() {
                conn.handle_message(&header, &message, self.time.now_us());
            }
            if conn.is_connected() {
                return;
            }

            let now = Instant::now();
            if now >= deadline {
                let error = ConnectionError::HeartbeatTimeout {
                    endpoint: conn.endpoint.clone(),
                    timeout_ms: self.params.heartbeat_timeout_ms,
                };
                conn.fail(LinkEvent::HeartbeatTimeout, error);
                return;
            }

            let Some(transport) = conn.transport.as_mut() else {
                return;
            };
            let slice = (deadline - now).min(HEARTBEAT_READ_SLICE);
            match transport.read(&mut buf, slice) {
                Ok(n) => conn.parser.push(&buf[..n]),
                Err(source) => {
                    let error = ConnectionError::Channel {
                        endpoint: conn.endpoint.clone(),
                        source,
                    };
                    conn.fail(LinkEvent::OpenFailed, error);
                    return;
                }
            }
        }
    }

    /// Process whatever the autopilot has sent since the last call.
    ///
    /// Never waits for new data. Returns the number of messages decoded.
    /// Heartbeats promote a degraded link; heartbeat silence longer than
    /// `heartbeat_stale_ms` demotes a connected one. A lost channel is
    /// dropped here and reopened on a later call.
    pub fn poll(&self, conn: &mut Connection) -> usize {
        if conn.transport.is_none() {
            self.reopen(conn);
        }
        let Some(transport) = conn.transport.as_mut() else {
            return 0;
        };

        let mut buf = [0u8; READ_BUFFER_SIZE];
        let mut read_failed = None;
        for _ in 0..MAX_POLL_READS {
            match transport.read(&mut buf, Duration::ZERO) {
                Ok(0) => break,
                Ok(n) => conn.parser.push(&buf[..n]),
                Err(e) => {
                    read_failed = Some(e);
                    break;
                }
            }
        }

        let mut decoded = 0;
        while let Some((header, message)) = conn.parser.next_message() {
            decoded += 1;
            conn.handle_message(&header, &message, self.time.now_us());
        }

        match read_failed {
            Some(e) if e.is_channel_lost() => conn.drop_channel(e),
            Some(e) => crate::log_debug!("read from {} failed: {}", conn.endpoint, e),
            None => {}
        }

        if let (Some(stale), Some(last)) = (self.params.heartbeat_stale(), conn.last_heartbeat_us)
        {
            let silent_us = self.time.elapsed_since(last);
            if conn.is_connected() && silent_us > stale.as_micros() as u64 {
                crate::log_warn!(
                    "no heartbeat from {} for {} ms",
                    conn.endpoint,
                    silent_us / 1000
                );
                conn.apply(LinkEvent::HeartbeatLost);
            }
        }

        decoded
    }

    /// Send a STATUSTEXT alert.
    ///
    /// Text longer than 50 bytes is cut at the last UTF-8 boundary that
    /// fits. On a disconnected or closed link, or while a lost channel is
    /// waiting to be reopened, this is a logged no-op that returns `Ok(())`
    /// without touching the channel. A transmit failure
    /// demotes the link to `Degraded` and is returned for the caller to log
    /// or ignore.
    pub fn send_status(
        &self,
        conn: &mut Connection,
        severity: Severity,
        text: &str,
    ) -> Result<(), SendError> {
        if conn.closed || !conn.state.can_transmit() {
            conn.stats.send_noops += 1;
            crate::log_debug!("not connected, STATUSTEXT not sent: {}", text);
            return Ok(());
        }
        if conn.transport.is_none() {
            self.reopen(conn);
        }
        if conn.transport.is_none() {
            conn.stats.send_noops += 1;
            crate::log_debug!("channel down, STATUSTEXT not sent: {}", text);
            return Ok(());
        }

        let (alert, notice) = AlertMessage::new(severity, text);
        if let Some(notice) = notice {
            conn.stats.truncations += 1;
            crate::log_warn!(
                "STATUSTEXT truncated to {} bytes (was {} bytes)",
                notice.kept_len,
                notice.original_len
            );
        }

        conn.transmit(&statustext(&alert))?;
        conn.stats.statustext_sent += 1;
        crate::log_info!("STATUSTEXT [{}]: {}", alert.severity(), alert.text());
        Ok(())
    }

    /// Mode names the connected autopilot understands.
    ///
    /// Empty for firmware or airframes without a known mode table.
    pub fn list_available_modes(
        &self,
        conn: &Connection,
    ) -> Result<BTreeSet<&'static str>, NotConnectedError> {
        if conn.closed || !conn.state.can_transmit() {
            return Err(NotConnectedError);
        }
        let modes = conn
            .target
            .and_then(|target| target.class)
            .map(|class| class.mode_names().collect())
            .unwrap_or_default();
        Ok(modes)
    }

    /// Ask the autopilot to switch to `mode_name`.
    ///
    /// Returns false without sending anything unless the link is connected
    /// and the autopilot advertises the mode. Fire-and-forget: true means
    /// the command was transmitted, not that the mode changed.
    pub fn request_mode(&self, conn: &mut Connection, mode_name: &str) -> bool {
        if conn.closed || !conn.state.is_connected() {
            crate::log_warn!("not connected, mode {} not requested", mode_name);
            return false;
        }
        let Some(target) = conn.target else {
            return false;
        };
        let Some(request) = target
            .class
            .and_then(|class| class.mode_request(mode_name))
        else {
            crate::log_warn!("mode {} is not available on this autopilot", mode_name);
            return false;
        };

        let command = set_mode_command(target.system_id, target.component_id, request.custom_mode);
        match conn.transmit(&command) {
            Ok(()) => {
                conn.stats.mode_requests += 1;
                crate::log_info!(
                    "mode change requested: {} ({})",
                    request.mode_name,
                    request.custom_mode
                );
                true
            }
            Err(e) => {
                crate::log_warn!("mode change to {} not sent: {}", mode_name, e);
                false
            }
        }
    }

    /// Try to reopen a lost channel on an established session.
    ///
    /// Rate limited by `reconnect_interval_ms` on the link's clock; each
    /// attempt gives up after `send_timeout_ms`.
    fn reopen(&self, conn: &mut Connection) {
        if conn.closed || conn.transport.is_some() || !conn.state.can_transmit() {
            return;
        }
        let (Some(endpoint), Some(interval)) =
            (conn.reopen_endpoint.as_ref(), self.params.reconnect_interval())
        else {
            return;
        };
        if let Some(last) = conn.last_reopen_us {
            if self.time.elapsed_since(last) < interval.as_micros() as u64 {
                return;
            }
        }

        conn.last_reopen_us = Some(self.time.now_us());
        conn.stats.reconnect_attempts += 1;
        let deadline = Instant::now() + self.params.send_timeout();
        match transport::open(endpoint, conn.baud_rate, deadline, self.params.send_timeout()) {
            Ok(transport) => {
                crate::log_info!("reopened {}, waiting for heartbeat", transport.describe());
                conn.stats.reconnects += 1;
                conn.transport = Some(transport);
            }
            Err(e) => crate::log_debug!("reopening {} failed: {}", conn.endpoint, e),
        }
    }

    /// Release the channel. Safe to call any number of times.
    pub fn close(&self, conn: &mut Connection) {
        let had_channel = conn.transport.take().is_some();
        conn.parser.clear();
        conn.apply(LinkEvent::Closed);
        conn.closed = true;
        if had_channel {
            crate::log_info!("MAVLink connection to {} closed", conn.endpoint);
        }
    }
}
