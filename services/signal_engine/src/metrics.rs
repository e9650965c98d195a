//! Engine metrics collection

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Lock-free counters updated by the submitting thread and every shard worker
#[derive(Debug)]
pub struct EngineMetrics {
    start_time: Instant,
    ticks_submitted: AtomicU64,
    ticks_enqueued: AtomicU64,
    ticks_dropped: AtomicU64,
    ticks_rejected: AtomicU64,
    ticks_processed: AtomicU64,
    signals_fired: AtomicU64,
    strategy_faults: AtomicU64,
    tick_faults: AtomicU64,
    sink_failures: AtomicU64,
}

/// Plain copy of [`EngineMetrics`] at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub ticks_submitted: u64,
    pub ticks_enqueued: u64,
    /// Lost to a full shard queue
    pub ticks_dropped: u64,
    /// Submitted after shutdown began
    pub ticks_rejected: u64,
    pub ticks_processed: u64,
    pub signals_fired: u64,
    pub strategy_faults: u64,
    pub tick_faults: u64,
    pub sink_failures: u64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            ticks_submitted: AtomicU64::new(0),
            ticks_enqueued: AtomicU64::new(0),
            ticks_dropped: AtomicU64::new(0),
            ticks_rejected: AtomicU64::new(0),
            ticks_processed: AtomicU64::new(0),
            signals_fired: AtomicU64::new(0),
            strategy_faults: AtomicU64::new(0),
            tick_faults: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
        }
    }

    pub fn increment_submitted(&self) {
        self.ticks_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_enqueued(&self) {
        self.ticks_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_dropped(&self) {
        self.ticks_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejected(&self) {
        self.ticks_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_processed(&self) {
        self.ticks_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_signals(&self) {
        self.signals_fired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_strategy_faults(&self) {
        self.strategy_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_tick_faults(&self) {
        self.tick_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_sink_failures(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ticks_submitted: self.ticks_submitted.load(Ordering::Relaxed),
            ticks_enqueued: self.ticks_enqueued.load(Ordering::Relaxed),
            ticks_dropped: self.ticks_dropped.load(Ordering::Relaxed),
            ticks_rejected: self.ticks_rejected.load(Ordering::Relaxed),
            ticks_processed: self.ticks_processed.load(Ordering::Relaxed),
            signals_fired: self.signals_fired.load(Ordering::Relaxed),
            strategy_faults: self.strategy_faults.load(Ordering::Relaxed),
            tick_faults: self.tick_faults.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSnapshot {
    /// Enqueued ticks not yet processed
    pub fn backlog(&self) -> u64 {
        self.ticks_enqueued.saturating_sub(self.ticks_processed)
    }
}
