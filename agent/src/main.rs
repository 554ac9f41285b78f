//! # keywatch
//!
//! Continuous health-monitoring agent for a fleet of heartbeat keys in a
//! Redis store. It discovers two tracked key groups at startup, sweeps
//! them for liveness every interval, counts event throughput over an
//! all-events subscription, serves a remote command channel, and mirrors
//! overall health on a three-channel status indicator.
//!
//! ## Execution Flow:
//! 1. Parse CLI arguments and initialize logging.
//! 2. Open the status indicator and wait for the store host to become
//!    reachable (Pulse on, Alarm flicker per failed poll).
//! 3. Connect, authenticate and discover the tracked key groups
//!    (Activity on).
//! 4. Spawn the three workers against one shared counter set and wait for
//!    each to report readiness.
//! 5. Flash all indicator channels once and enter the liveness loop.
//! 6. On a kill command or termination signal, join every worker and
//!    report the final event count.
//!
//! Each startup failure exits with its own code; see `fatal.rs`.

mod fatal;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use log::{info, warn};
use tokio::signal;
use tokio::sync::oneshot;
use tokio::time::sleep;

use lib_common::connections::store::{reachable, StoreConfig};
use lib_common::core::liveness::{self, DEFAULT_GROUPS};
use lib_common::core::state::MonitorState;
use lib_common::indicator::{IndicatorChannel, IndicatorPanel, LogDriver};
use lib_common::workers::rate::RateTrackerConfig;
use lib_common::workers::{ActivityMonitor, CommandHandler, RateTracker, StartReport, WorkerKind};

use fatal::Fatal;

/// Seconds to wait for the store host to become reachable.
const NET_READY_ATTEMPTS: u64 = 120;
/// Upper bound on a single reachability probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);
/// Pause between reachability probes.
const PROBE_PAUSE: Duration = Duration::from_secs(1);
/// Liveness sweep cadence.
const CHECK_CADENCE: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(
    name = "keywatch",
    about = "Watches heartbeat keys in a Redis store and mirrors their health on a status indicator",
    long_about = None
)]
struct Args {
    /// Store host name or address.
    host: String,
    /// Store TCP port.
    port: u16,
    /// Optional credential for AUTH.
    credential: Option<String>,
}

/// Configures the `fern` logger to write to stderr and a dated log file.
fn setup_logging() -> Result<()> {
    let log_filename = format!("keywatch_{}.log", chrono::Local::now().format("%Y-%m-%d"));

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(std::io::stderr())
        .chain(fern::log_file(log_filename)?)
        .apply()?;
    Ok(())
}

/// Resolves when the process receives Ctrl+C or, on UNIX, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = setup_logging() {
        eprintln!("failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(fatal) => {
            log::error!("{fatal}");
            ExitCode::from(fatal.code())
        }
    }
}

async fn run(args: Args) -> Result<(), Fatal> {
    let store = StoreConfig::new(args.host, args.port, args.credential);

    let driver = LogDriver::open().map_err(Fatal::Indicator)?;
    let panel = IndicatorPanel::new(Arc::new(driver));
    panel.all_off();

    // --- Network readiness ---
    info!("Verifying store reachability...");
    panel.set(IndicatorChannel::Pulse, true);
    let mut attempts = NET_READY_ATTEMPTS;
    while !reachable(&store.host, store.port, PROBE_TIMEOUT).await {
        attempts -= 1;
        if attempts == 0 {
            panel.set(IndicatorChannel::Pulse, false);
            return Err(Fatal::NetworkTimeout {
                waited: NET_READY_ATTEMPTS,
            });
        }
        panel.boot_flicker().await;
        sleep(PROBE_PAUSE).await;
    }
    panel.set(IndicatorChannel::Pulse, false);
    if attempts != NET_READY_ATTEMPTS {
        info!(
            "... waited {} seconds for the network.",
            NET_READY_ATTEMPTS - attempts
        );
    }

    // --- Connect, authenticate, discover ---
    info!("Connecting to {}...", store.masked_url());
    panel.set(IndicatorChannel::Activity, true);
    let mut conn = store.connect_bare().await.map_err(Fatal::Connect)?;
    store.authenticate(&mut conn).await.map_err(Fatal::Auth)?;

    info!("Querying expected key sets...");
    let tracked = liveness::discover(&mut conn, &DEFAULT_GROUPS)
        .await
        .map_err(Fatal::Discovery)?;
    let total = tracked.total();
    for group in tracked.groups() {
        info!(
            "group '{}' ({}): {} keys",
            group.name,
            group.pattern,
            group.keys.len()
        );
    }
    info!(
        "Monitoring {} keys every {}s",
        total,
        CHECK_CADENCE.as_secs()
    );

    let state = MonitorState::new();

    // External termination takes the same path as the kill command.
    let signal_state = state.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Termination signal received. Shutting down...");
        signal_state.request_shutdown();
    });

    // --- Worker startup rendezvous ---
    let (activity_tx, activity_rx) = oneshot::channel();
    let activity = tokio::spawn(
        ActivityMonitor::new(store.clone(), state.clone(), panel.clone()).run(activity_tx),
    );
    let (command_tx, command_rx) = oneshot::channel();
    let command =
        tokio::spawn(CommandHandler::new(store.clone(), state.clone(), total).run(command_tx));
    let (rate_tx, rate_rx) = oneshot::channel();
    let rate = tokio::spawn(
        RateTracker::new(store.clone(), state.clone(), RateTrackerConfig::default()).run(rate_tx),
    );

    await_ready(WorkerKind::Activity, activity_rx).await?;
    await_ready(WorkerKind::Command, command_rx).await?;
    await_ready(WorkerKind::Rate, rate_rx).await?;

    panel.confirmation_flash().await;
    info!("keywatch fully initialized.");

    // --- Liveness loop ---
    let shutdown = state.shutdown_token().clone();
    while !state.shutdown_requested() {
        let lost = liveness::sweep(&mut conn, &tracked).await;
        state.set_lost(lost);
        if lost > 0 {
            warn!("{lost} of {total} tracked keys missing");
        }
        panel.apply_health(lost).await;

        tokio::select! {
            _ = sleep(CHECK_CADENCE) => {}
            _ = shutdown.cancelled() => break,
        }
    }

    // --- Shutdown ---
    info!(
        "keywatch exiting ({} workers still running)...",
        state.active_workers()
    );
    let _ = tokio::join!(activity, command, rate);
    panel.all_off();
    info!(
        "keywatch done, tracked {} total messages.",
        state.event_count()
    );
    Ok(())
}

/// Waits for one worker's startup report, mapping a failure — or a worker
/// that died before reporting — to that worker's exit code.
async fn await_ready(
    kind: WorkerKind,
    ready: oneshot::Receiver<StartReport>,
) -> Result<(), Fatal> {
    match ready.await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(cause)) => Err(Fatal::WorkerStart { kind, cause }),
        Err(_) => Err(Fatal::WorkerStart {
            kind,
            cause: anyhow!("worker exited before reporting readiness"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_with_and_without_credential() {
        let args = Args::try_parse_from(["keywatch", "cache.local", "6379"]).unwrap();
        assert_eq!(args.host, "cache.local");
        assert_eq!(args.port, 6379);
        assert!(args.credential.is_none());

        let args =
            Args::try_parse_from(["keywatch", "cache.local", "6379", "hunter2"]).unwrap();
        assert_eq!(args.credential.as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_args_reject_missing_port() {
        assert!(Args::try_parse_from(["keywatch", "cache.local"]).is_err());
    }

    #[test]
    fn test_args_reject_non_numeric_port() {
        assert!(Args::try_parse_from(["keywatch", "cache.local", "redis"]).is_err());
    }

    #[tokio::test]
    async fn test_await_ready_maps_failures_to_worker_codes() {
        let (tx, rx) = oneshot::channel();
        tx.send(Err(anyhow!("subscribe refused"))).unwrap();
        let fatal = await_ready(WorkerKind::Command, rx).await.unwrap_err();
        assert_eq!(fatal.code(), 22);

        // A worker that dies without reporting maps to the same code.
        let (tx, rx) = oneshot::channel::<StartReport>();
        drop(tx);
        let fatal = await_ready(WorkerKind::Rate, rx).await.unwrap_err();
        assert_eq!(fatal.code(), 23);
    }
}
