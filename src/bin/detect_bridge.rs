//! Detection alert bridge.
//!
//! Reads per-frame detections from stdin and reports them to a MAVLink
//! autopilot as STATUSTEXT alerts.
//!
//! Each input line is one frame, either a JSON array of detections or the
//! vision pipeline's log record:
//!
//! ```text
//! [{"class": "person", "confidence": 0.91, "bounding_box": {"x1": 10, "y1": 20, "x2": 110, "y2": 220}}]
//! {"detected_objects": []}
//! ```
//!
//! Usage:
//!   detect_bridge [OPTIONS] < detections.jsonl
//!
//! Options:
//!   --endpoint <ENDPOINT>          Serial device or tcp:/udpin:/udpout: address
//!   --baud <BAUD>                  Serial baud rate (default: 57600)
//!   --config <PATH>                TOML configuration file
//!   --mode-on-detect <MODE>        Request this flight mode on the first detection
//!   --clear-policy <POLICY>        never | always | on_transition (default: never)
//!   --heartbeat-timeout-ms <MS>    Heartbeat wait on connect (default: 5000)

use std::env;
use std::io::{self, BufRead};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use detect_link::core::logging;
use detect_link::{log_debug, log_info, log_warn};
use detect_link::{DetectionAlertBridge, Params, TelemetryLink};
use detect_link_core::alert::ClearPolicy;
use detect_link_core::detection::Detection;

/// How often the idle loop services the link and checks for Ctrl-C
const IDLE_TICK: Duration = Duration::from_millis(100);

/// Compile-time defaults from build.rs (empty when unset)
const BUILD_ENDPOINT: &str = env!("DETECT_LINK_ENDPOINT");
const BUILD_BAUD: &str = env!("DETECT_LINK_BAUD");

#[derive(Default)]
struct Args {
    endpoint: Option<String>,
    baud: Option<u32>,
    config: Option<String>,
    mode_on_detect: Option<String>,
    clear_policy: Option<ClearPolicy>,
    heartbeat_timeout_ms: Option<u64>,
}

fn parse_args() -> Args {
    let mut args = Args::default();

    let raw: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < raw.len() {
        match raw[i].as_str() {
            "--endpoint" => {
                i += 1;
                args.endpoint = Some(string_arg(&raw, i, "endpoint"));
            }
            "--baud" => {
                i += 1;
                args.baud = Some(parse_arg(&raw, i, "baud"));
            }
            "--config" => {
                i += 1;
                args.config = Some(string_arg(&raw, i, "config"));
            }
            "--mode-on-detect" => {
                i += 1;
                args.mode_on_detect = Some(string_arg(&raw, i, "mode-on-detect"));
            }
            "--clear-policy" => {
                i += 1;
                let value = string_arg(&raw, i, "clear-policy");
                args.clear_policy = Some(ClearPolicy::parse(&value).unwrap_or_else(|| {
                    eprintln!("Error: invalid value for --clear-policy: {value}");
                    process::exit(1);
                }));
            }
            "--heartbeat-timeout-ms" => {
                i += 1;
                args.heartbeat_timeout_ms = Some(parse_arg(&raw, i, "heartbeat-timeout-ms"));
            }
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {other}");
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    args
}

fn string_arg(raw: &[String], i: usize, name: &str) -> String {
    raw.get(i).cloned().unwrap_or_else(|| {
        eprintln!("Error: --{name} requires a value");
        process::exit(1);
    })
}

fn parse_arg<T: std::str::FromStr>(raw: &[String], i: usize, name: &str) -> T {
    string_arg(raw, i, name).parse().unwrap_or_else(|_| {
        eprintln!("Error: invalid value for --{name}");
        process::exit(1);
    })
}

fn print_usage() {
    eprintln!(
        "Usage: detect_bridge [OPTIONS] < detections.jsonl\n\
         \n\
         Options:\n\
         \x20 --endpoint <ENDPOINT>          Serial device or tcp:/udpin:/udpout: address\n\
         \x20 --baud <BAUD>                  Serial baud rate (default: 57600)\n\
         \x20 --config <PATH>                TOML configuration file\n\
         \x20 --mode-on-detect <MODE>        Request this flight mode on the first detection\n\
         \x20 --clear-policy <POLICY>        never | always | on_transition (default: never)\n\
         \x20 --heartbeat-timeout-ms <MS>    Heartbeat wait on connect (default: 5000)\n\
         \x20 -h, --help                     Show this help"
    );
}

/// Config file (or defaults plus build-time settings), then flags.
fn load_params(args: Args) -> Result<Params> {
    let mut params = match &args.config {
        Some(path) => Params::load(path).with_context(|| format!("loading {path}"))?,
        None => Params::default(),
    };

    if args.config.is_none() {
        if !BUILD_ENDPOINT.is_empty() {
            params.link.endpoint = BUILD_ENDPOINT.to_string();
        }
        if let Ok(baud) = BUILD_BAUD.parse() {
            params.link.baud_rate = baud;
        }
    }

    if let Some(endpoint) = args.endpoint {
        params.link.endpoint = endpoint;
    }
    if let Some(baud) = args.baud {
        params.link.baud_rate = baud;
    }
    if let Some(timeout) = args.heartbeat_timeout_ms {
        params.link.heartbeat_timeout_ms = timeout;
    }
    if let Some(mode) = args.mode_on_detect {
        params.bridge.mode_on_detection = Some(mode);
    }
    if let Some(policy) = args.clear_policy {
        params.bridge.clear_policy = policy;
    }

    params.validate()?;
    Ok(params)
}

/// One input line.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FrameRecord {
    Detections(Vec<Detection>),
    Logged { detected_objects: Vec<Detection> },
}

impl FrameRecord {
    fn into_detections(self) -> Vec<Detection> {
        match self {
            FrameRecord::Detections(d) | FrameRecord::Logged { detected_objects: d } => d,
        }
    }
}

/// Read stdin on its own thread so the main loop can notice Ctrl-C.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn main() -> Result<()> {
    logging::init("info");
    let params = load_params(parse_args())?;

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))
        .context("setting Ctrl-C handler")?;

    log_info!("detect_bridge starting");
    log_info!("  endpoint: {} @ {} baud", params.link.endpoint, params.link.baud_rate);
    log_info!("  clear policy: {:?}", params.bridge.clear_policy);
    if let Some(mode) = &params.bridge.mode_on_detection {
        log_info!("  mode on detection: {}", mode);
    }

    let link = TelemetryLink::new(params.link.clone());
    let mut conn = link.connect();
    if !conn.is_connected() {
        log_warn!("continuing without telemetry; alerts will be dropped");
    }

    let mut bridge = DetectionAlertBridge::new(&params.bridge);
    let lines = spawn_stdin_reader();

    while running.load(Ordering::SeqCst) {
        let line = match lines.recv_timeout(IDLE_TICK) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => {
                link.poll(&mut conn);
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => {
                log_info!("end of input");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: FrameRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(e) => {
                log_warn!("skipping malformed frame: {}", e);
                continue;
            }
        };

        if let Err(e) = bridge.report_detections(&link, &mut conn, &record.into_detections()) {
            log_debug!("alert not delivered: {}", e);
        }
    }

    if !running.load(Ordering::SeqCst) {
        log_info!("shutdown requested");
    }

    let stats = conn.stats();
    log_info!(
        "{} frames, {} alerts sent, {} dropped, {} send failures",
        bridge.frames(),
        stats.statustext_sent,
        stats.send_noops,
        stats.send_failures
    );
    link.close(&mut conn);
    Ok(())
}
