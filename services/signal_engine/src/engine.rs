//! Sharded compute engine
//!
//! ```text
//!                    ┌──────────────┐   bounded queue   ┌────────────────────┐
//! process(tick) ───► │ shard_for(id)│ ────────────────► │ signal-shard-0     │──┐
//!                    │ crc32 % W    │ ────────────────► │ signal-shard-1     │──┤
//!                    └──────────────┘        ...        │ ...                │  ├─► SignalSink
//!                                     ────────────────► │ signal-shard-(W-1) │──┘
//!                                                       └────────────────────┘
//!                                                       own HashMap<id, InstrumentContext>
//! ```
//!
//! Every tick for an instrument lands on the same queue, so per-instrument
//! order is submission order and no context is ever touched by two threads.

use crossbeam_channel::{bounded, Receiver, Sender};
use message_sink::SignalSink;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use strategies::{ContextSnapshot, StrategySet};
use torq_config::{BackpressurePolicy, ConfigError, EngineSettings, SignalEngineConfig};
use tracing::{debug, error, info, warn};
use types::Tick;

use crate::error::{EngineError, Result};
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::router::shard_for;
use crate::shard::{ShardMessage, ShardWorker};

/// Upper bound on waiting for a diagnostic reply from a shard
const DIAGNOSTIC_TIMEOUT: Duration = Duration::from_secs(30);

/// Poll interval while shutdown waits for in-flight submissions
const QUIESCE_POLL: Duration = Duration::from_micros(100);

/// What happened to a submitted tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    Enqueued,
    /// Shard queue full (or its worker gone); tick discarded and logged
    Dropped,
    /// Engine is shutting down
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every worker reached its drain sentinel within the grace period
    Drained,
    /// Grace period elapsed; `remaining` workers were told to abort and detached.
    /// Also reported with `remaining: 0` when submissions were still in flight
    /// at the deadline, since those ticks may have landed behind a sentinel.
    TimedOut { remaining: usize },
    /// Shutdown had already been performed
    AlreadyStopped,
}

/// Holds one slot of the in-flight submission count for its lifetime
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(count: &'a AtomicUsize) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self(count)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

struct ShardHandle {
    queue: Sender<ShardMessage>,
    instruments: Arc<AtomicUsize>,
}

pub struct ShardedEngine {
    shards: Vec<ShardHandle>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    stopped: Receiver<usize>,
    metrics: Arc<EngineMetrics>,
    accepting: AtomicBool,
    in_flight: AtomicUsize,
    shutdown_started: AtomicBool,
    abort: Arc<AtomicBool>,
    backpressure: BackpressurePolicy,
    enqueue_timeout: Duration,
    shutdown_grace: Duration,
}

impl ShardedEngine {
    /// Spawn one worker thread per shard
    pub fn new(
        settings: &EngineSettings,
        strategies: StrategySet,
        sink: Arc<dyn SignalSink>,
    ) -> Result<Self> {
        let worker_count = settings.worker_count();
        if worker_count == 0 {
            return Err(ConfigError::ZeroWorkers.into());
        }
        if settings.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity.into());
        }
        if settings.history_capacity == 0 {
            return Err(ConfigError::ZeroHistoryCapacity.into());
        }

        let metrics = Arc::new(EngineMetrics::new());
        let abort = Arc::new(AtomicBool::new(false));
        let (stopped_tx, stopped_rx) = bounded(worker_count);

        let mut shards = Vec::with_capacity(worker_count);
        let mut workers = Vec::with_capacity(worker_count);

        for index in 0..worker_count {
            let (queue_tx, queue_rx) = bounded(settings.queue_capacity);
            let instruments = Arc::new(AtomicUsize::new(0));

            let worker = ShardWorker::new(
                index,
                settings.history_capacity,
                strategies.clone(),
                sink.clone(),
                metrics.clone(),
                instruments.clone(),
                abort.clone(),
            );
            let done = stopped_tx.clone();

            let handle = thread::Builder::new()
                .name(format!("signal-shard-{}", index))
                .spawn(move || worker.run(queue_rx, done))
                .map_err(|source| EngineError::SpawnFailed {
                    shard: index,
                    source,
                })?;

            shards.push(ShardHandle {
                queue: queue_tx,
                instruments,
            });
            workers.push(handle);
        }

        info!(
            workers = worker_count,
            queue_capacity = settings.queue_capacity,
            backpressure = ?settings.backpressure,
            history_capacity = settings.history_capacity,
            strategies = strategies.len(),
            sink = sink.name(),
            "Sharded engine started"
        );

        Ok(Self {
            shards,
            workers: Mutex::new(workers),
            stopped: stopped_rx,
            metrics,
            accepting: AtomicBool::new(true),
            in_flight: AtomicUsize::new(0),
            shutdown_started: AtomicBool::new(false),
            abort,
            backpressure: settings.backpressure,
            enqueue_timeout: settings.enqueue_timeout(),
            shutdown_grace: settings.shutdown_grace(),
        })
    }

    /// Validate `config`, build its strategy set and start the engine
    pub fn from_config(config: &SignalEngineConfig, sink: Arc<dyn SignalSink>) -> Result<Self> {
        let strategies = StrategySet::from_config(config)?;
        Self::new(&config.engine, strategies, sink)
    }

    /// Route a tick to its shard
    ///
    /// Never blocks longer than the configured enqueue timeout and never
    /// fails: overload and shutdown are reported in the returned status.
    pub fn process(&self, tick: Tick) -> SubmitStatus {
        self.metrics.increment_submitted();

        // Registered before the accepting check: once shutdown sees the count
        // at zero, no accepted tick can still be on its way to a queue
        let _in_flight = InFlight::enter(&self.in_flight);
        if !self.accepting.load(Ordering::SeqCst) {
            self.metrics.increment_rejected();
            debug!(instrument = %tick.instrument_id(), "Engine stopped, tick rejected");
            return SubmitStatus::Rejected;
        }

        let shard = self.shard_for(tick.instrument_id());
        let queue = &self.shards[shard].queue;
        let message = ShardMessage::Tick(tick);

        let result = match self.backpressure {
            BackpressurePolicy::Block => queue
                .send_timeout(message, self.enqueue_timeout)
                .map_err(|e| (e.is_disconnected(), e.into_inner())),
            BackpressurePolicy::Drop => queue
                .try_send(message)
                .map_err(|e| (e.is_disconnected(), e.into_inner())),
        };

        match result {
            Ok(()) => {
                self.metrics.increment_enqueued();
                SubmitStatus::Enqueued
            }
            Err((disconnected, message)) => {
                self.metrics.increment_dropped();
                if let ShardMessage::Tick(tick) = message {
                    warn!(
                        shard,
                        instrument = %tick.instrument_id(),
                        disconnected,
                        "Shard queue unavailable, tick dropped"
                    );
                }
                SubmitStatus::Dropped
            }
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn shard_for(&self, instrument_id: &str) -> usize {
        shard_for(instrument_id, self.shards.len())
    }

    /// Instruments with a context, summed over shards
    pub fn instrument_count(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.instruments.load(Ordering::Relaxed))
            .sum()
    }

    /// Snapshot an instrument's context
    ///
    /// The request travels through the owning shard's queue, so the result
    /// reflects every tick submitted for the instrument before this call.
    /// `None` when the instrument is unknown or the engine has stopped.
    pub fn inspect(&self, instrument_id: &str) -> Option<ContextSnapshot> {
        if self.shutdown_started.load(Ordering::Acquire) {
            return None;
        }

        let shard = self.shard_for(instrument_id);
        let (reply_tx, reply_rx) = bounded(1);
        let request = ShardMessage::Inspect {
            instrument_id: instrument_id.to_string(),
            reply: reply_tx,
        };

        self.shards[shard]
            .queue
            .send_timeout(request, DIAGNOSTIC_TIMEOUT)
            .ok()?;
        reply_rx.recv_timeout(DIAGNOSTIC_TIMEOUT).ok().flatten()
    }

    /// Wait until every shard has processed everything enqueued before the
    /// call; `false` if a shard did not answer in time
    pub fn sync(&self) -> bool {
        self.sync_timeout(DIAGNOSTIC_TIMEOUT)
    }

    pub fn sync_timeout(&self, timeout: Duration) -> bool {
        if self.shutdown_started.load(Ordering::Acquire) {
            return false;
        }

        let deadline = Instant::now() + timeout;
        let (ack_tx, ack_rx) = bounded(self.shards.len());

        for shard in &self.shards {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if shard
                .queue
                .send_timeout(ShardMessage::Barrier(ack_tx.clone()), remaining)
                .is_err()
            {
                return false;
            }
        }
        drop(ack_tx);

        (0..self.shards.len()).all(|_| {
            let remaining = deadline.saturating_duration_since(Instant::now());
            ack_rx.recv_timeout(remaining).is_ok()
        })
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn uptime(&self) -> Duration {
        self.metrics.uptime()
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    /// Stop accepting ticks, let queued work drain for up to the grace
    /// period, then abort and detach whatever is still running
    ///
    /// Only the first call does anything; later calls (including the one
    /// from `Drop`) return [`ShutdownOutcome::AlreadyStopped`].
    pub fn shutdown(&self) -> ShutdownOutcome {
        if self.shutdown_started.swap(true, Ordering::AcqRel) {
            return ShutdownOutcome::AlreadyStopped;
        }

        let worker_count = self.shards.len();
        info!(
            workers = worker_count,
            grace_ms = self.shutdown_grace.as_millis() as u64,
            "Engine shutdown started"
        );

        self.accepting.store(false, Ordering::SeqCst);
        let deadline = Instant::now() + self.shutdown_grace;
        let quiesced = self.wait_for_submissions(deadline);

        // The sentinel queues behind pending ticks, so reaching it means drained
        for (index, shard) in self.shards.iter().enumerate() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if shard
                .queue
                .send_timeout(ShardMessage::Shutdown, remaining)
                .is_err()
            {
                warn!(shard = index, "Could not enqueue shutdown sentinel");
            }
        }

        let mut stopped = 0;
        while stopped < worker_count {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.stopped.recv_timeout(remaining) {
                Ok(index) => {
                    debug!(shard = index, "Shard drained");
                    stopped += 1;
                }
                Err(_) => break,
            }
        }

        let mut workers = self.workers.lock();
        if stopped == worker_count {
            for handle in workers.drain(..) {
                if handle.join().is_err() {
                    error!("Shard worker thread panicked during shutdown");
                }
            }
            if quiesced {
                info!(metrics = ?self.metrics.snapshot(), "Engine shutdown complete");
                ShutdownOutcome::Drained
            } else {
                warn!(
                    metrics = ?self.metrics.snapshot(),
                    "Shutdown finished with submissions still in flight at the deadline"
                );
                ShutdownOutcome::TimedOut { remaining: 0 }
            }
        } else {
            self.abort.store(true, Ordering::Release);
            let remaining = worker_count - stopped;
            // Dropping a JoinHandle detaches the thread
            workers.clear();
            warn!(
                remaining,
                metrics = ?self.metrics.snapshot(),
                "Shutdown grace period elapsed, remaining workers aborted"
            );
            ShutdownOutcome::TimedOut { remaining }
        }
    }
}

impl ShardedEngine {
    /// Spin until no producer is between the accepting check and its enqueue;
    /// `false` if the deadline passes first
    fn wait_for_submissions(&self, deadline: Instant) -> bool {
        loop {
            let pending = self.in_flight.load(Ordering::SeqCst);
            if pending == 0 {
                return true;
            }
            if Instant::now() >= deadline {
                warn!(pending, "Submissions still in flight at shutdown deadline");
                return false;
            }
            thread::sleep(QUIESCE_POLL);
        }
    }
}

impl Drop for ShardedEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ShardedEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedEngine")
            .field("shards", &self.shards.len())
            .field("backpressure", &self.backpressure)
            .field("accepting", &self.is_accepting())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use message_sink::test_utils::CollectorSink;

    fn settings(workers: usize) -> EngineSettings {
        EngineSettings {
            workers: Some(workers),
            queue_capacity: 64,
            shutdown_grace_ms: 2_000,
            ..EngineSettings::default()
        }
    }

    #[test]
    fn test_rejects_zero_workers() {
        let result = ShardedEngine::new(
            &settings(0),
            StrategySet::empty(),
            Arc::new(CollectorSink::new()),
        );
        assert!(matches!(
            result,
            Err(EngineError::Config(ConfigError::ZeroWorkers))
        ));
    }

    #[test]
    fn test_rejects_zero_queue_capacity() {
        let mut settings = settings(2);
        settings.queue_capacity = 0;
        let result = ShardedEngine::new(
            &settings,
            StrategySet::empty(),
            Arc::new(CollectorSink::new()),
        );
        assert!(matches!(
            result,
            Err(EngineError::Config(ConfigError::ZeroQueueCapacity))
        ));
    }

    #[test]
    fn test_routing_matches_router() {
        let engine = ShardedEngine::new(
            &settings(5),
            StrategySet::empty(),
            Arc::new(CollectorSink::new()),
        )
        .unwrap();

        assert_eq!(engine.shard_count(), 5);
        for id in ["600000", "000001", "AAPL", "BTC-USD"] {
            assert_eq!(engine.shard_for(id), shard_for(id, 5));
        }
        assert_eq!(engine.shutdown(), ShutdownOutcome::Drained);
    }

    #[test]
    fn test_diagnostics_after_shutdown() {
        let engine = ShardedEngine::new(
            &settings(2),
            StrategySet::empty(),
            Arc::new(CollectorSink::new()),
        )
        .unwrap();

        assert_eq!(engine.process(Tick::new("X", 1.0, 0.0, 0, 0)), SubmitStatus::Enqueued);
        assert!(engine.sync());
        assert_eq!(engine.instrument_count(), 1);

        engine.shutdown();
        assert!(!engine.is_accepting());
        assert!(engine.inspect("X").is_none());
        assert!(!engine.sync());
        assert_eq!(engine.instrument_count(), 1);
    }
}
