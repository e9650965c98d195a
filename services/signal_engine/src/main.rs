//! Signal engine service entry point
//!
//! Usage:
//!   signal_engine --config config/signal_engine.toml
//!   signal_engine --socket /tmp/torq/market_data.sock
//!   cat ticks.ndjson | signal_engine --stdin
//!
//! Fired signals are logged and written to stdout as one JSON object per line.

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossbeam_channel::Receiver;
use message_sink::{ChannelSink, FanoutSink, FiredSignal, LoggingSink};
use signal_engine::{init_logging, Dispatcher, ShardedEngine};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixStream;
use tokio::task::JoinHandle;
use torq_config::{RelaySettings, SignalEngineConfig};
use tracing::{error, info, warn};

/// Fired signals buffered for the stdout writer
const SIGNAL_BUFFER: usize = 4_096;

#[derive(Parser, Debug)]
#[command(name = "signal_engine")]
#[command(about = "Torq sharded strategy evaluation service")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Market data relay socket, overrides `relay.socket_path`
    #[arg(short, long)]
    socket: Option<String>,

    /// Read newline-delimited JSON ticks from stdin instead of the relay
    #[arg(long, conflicts_with = "socket")]
    stdin: bool,

    /// Log the effective configuration at startup
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = SignalEngineConfig::load(args.config.as_deref())
        .context("Failed to load signal engine configuration")?;
    if let Some(socket) = args.socket {
        config.relay.socket_path = socket;
    }

    init_logging(&config.logging)?;

    info!("Starting Torq Signal Engine");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    config.validate().context("Invalid signal engine configuration")?;
    if args.print_config {
        info!("Effective configuration:\n{}", config.to_toml_string()?);
    }

    let (channel_sink, signals) = ChannelSink::bounded(SIGNAL_BUFFER);
    let sink = FanoutSink::new()
        .with_sink(Arc::new(LoggingSink::new()))
        .with_sink(Arc::new(channel_sink));
    spawn_signal_writer(signals)?;

    let engine = Arc::new(
        ShardedEngine::from_config(&config, Arc::new(sink))
            .context("Failed to start sharded engine")?,
    );
    let dispatcher = Dispatcher::from_config(&config, engine.clone())?;

    let reporter = spawn_metrics_reporter(engine.clone(), config.logging.metrics_interval_secs);

    let mut feed: JoinHandle<Result<()>> = if args.stdin {
        info!("Reading ticks from stdin");
        tokio::spawn(consume_stdin(dispatcher))
    } else {
        tokio::spawn(consume_relay(dispatcher, config.relay.clone()))
    };

    info!("Signal engine running. Press Ctrl+C to stop.");

    tokio::select! {
        result = &mut feed => match result {
            Ok(Ok(())) => info!("Input stream ended"),
            Ok(Err(e)) => error!("Input stream failed: {:#}", e),
            Err(e) => error!("Input task failed: {}", e),
        },
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for shutdown signal")?;
            info!("Shutdown signal received");
            feed.abort();
        }
    }

    if let Some(reporter) = reporter {
        reporter.abort();
    }

    let stopping = engine.clone();
    let outcome = tokio::task::spawn_blocking(move || stopping.shutdown())
        .await
        .context("Engine shutdown task failed")?;

    info!(?outcome, metrics = ?engine.metrics(), "Signal engine stopped");
    Ok(())
}

/// Feed newline-delimited ticks from stdin until EOF
async fn consume_stdin(dispatcher: Dispatcher) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        tokio::task::block_in_place(|| dispatcher.dispatch_line(&line));
    }

    Ok(())
}

/// Feed ticks from the market data relay, reconnecting when it goes away
async fn consume_relay(dispatcher: Dispatcher, relay: RelaySettings) -> Result<()> {
    let retry = Duration::from_millis(relay.retry_interval_ms);
    let mut lines = BufReader::new(connect_to_market_data_relay(&relay).await?).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                tokio::task::block_in_place(|| dispatcher.dispatch_line(&line));
            }
            Ok(None) => {
                warn!("Market data connection closed, reconnecting...");
                lines = BufReader::new(connect_to_market_data_relay(&relay).await?).lines();
            }
            Err(e) => {
                error!("Error reading market data: {}", e);
                tokio::time::sleep(retry).await;
                lines = BufReader::new(connect_to_market_data_relay(&relay).await?).lines();
            }
        }
    }
}

async fn connect_to_market_data_relay(relay: &RelaySettings) -> Result<UnixStream> {
    info!("Connecting to market data relay: {}", relay.socket_path);

    let mut attempts = 0;
    loop {
        match UnixStream::connect(&relay.socket_path).await {
            Ok(stream) => {
                info!("Connected to market data relay");
                return Ok(stream);
            }
            Err(e) => {
                attempts += 1;
                if attempts >= relay.max_connect_attempts {
                    bail!(
                        "Failed to connect to market data relay after {} attempts: {}",
                        attempts,
                        e
                    );
                }
                warn!(
                    "Failed to connect to market data relay (attempt {}): {}",
                    attempts, e
                );
                tokio::time::sleep(Duration::from_millis(relay.retry_interval_ms)).await;
            }
        }
    }
}

/// Write fired signals to stdout as JSON lines
///
/// The thread ends once every shard worker has dropped its sink handle.
fn spawn_signal_writer(signals: Receiver<FiredSignal>) -> Result<()> {
    std::thread::Builder::new()
        .name("signal-writer".to_string())
        .spawn(move || {
            let stdout = std::io::stdout();
            for signal in signals.iter() {
                let line = match serde_json::to_string(&signal) {
                    Ok(line) => line,
                    Err(e) => {
                        warn!(error = %e, "Failed to serialize fired signal");
                        continue;
                    }
                };
                let mut out = stdout.lock();
                if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
                    error!(error = %e, "Failed to write fired signal, stopping writer");
                    break;
                }
            }
        })
        .context("Failed to spawn signal writer thread")?;
    Ok(())
}

fn spawn_metrics_reporter(engine: Arc<ShardedEngine>, interval_secs: u64) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        return None;
    }

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            let snapshot = engine.metrics();
            info!(
                uptime_secs = engine.uptime().as_secs(),
                instruments = engine.instrument_count(),
                submitted = snapshot.ticks_submitted,
                processed = snapshot.ticks_processed,
                backlog = snapshot.backlog(),
                dropped = snapshot.ticks_dropped,
                signals = snapshot.signals_fired,
                strategy_faults = snapshot.strategy_faults,
                tick_faults = snapshot.tick_faults,
                sink_failures = snapshot.sink_failures,
                "Engine metrics"
            );
        }
    }))
}
