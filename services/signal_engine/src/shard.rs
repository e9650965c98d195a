//! Shard worker
//!
//! One OS thread per shard drains a bounded queue in FIFO order and owns the
//! [`InstrumentContext`] table of every instrument routed to it. Nothing in
//! here is shared with other shards except the strategy set, the sink and
//! the metrics counters.

use crossbeam_channel::{Receiver, Sender};
use message_sink::SignalSink;
use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use strategies::{ContextSnapshot, InstrumentContext, StrategySet};
use tracing::{debug, error, info, trace, warn};
use types::{FiredSignal, Tick};

use crate::metrics::EngineMetrics;

/// Work items on a shard queue
#[derive(Debug)]
pub(crate) enum ShardMessage {
    Tick(Tick),
    /// Snapshot one instrument's context on the owning thread
    Inspect {
        instrument_id: String,
        reply: Sender<Option<ContextSnapshot>>,
    },
    /// Acknowledged once everything queued before it is processed
    Barrier(Sender<()>),
    /// Drain sentinel: the worker exits after reaching it
    Shutdown,
}

pub(crate) struct ShardWorker {
    index: usize,
    contexts: HashMap<String, InstrumentContext>,
    history_capacity: usize,
    strategies: StrategySet,
    sink: Arc<dyn SignalSink>,
    metrics: Arc<EngineMetrics>,
    instruments: Arc<AtomicUsize>,
    abort: Arc<AtomicBool>,
}

impl ShardWorker {
    pub(crate) fn new(
        index: usize,
        history_capacity: usize,
        strategies: StrategySet,
        sink: Arc<dyn SignalSink>,
        metrics: Arc<EngineMetrics>,
        instruments: Arc<AtomicUsize>,
        abort: Arc<AtomicBool>,
    ) -> Self {
        Self {
            index,
            contexts: HashMap::new(),
            history_capacity,
            strategies,
            sink,
            metrics,
            instruments,
            abort,
        }
    }

    /// Worker thread body; reports its index on `done` when it exits
    pub(crate) fn run(mut self, queue: Receiver<ShardMessage>, done: Sender<usize>) {
        info!(shard = self.index, "Shard worker started");

        while let Ok(message) = queue.recv() {
            match message {
                ShardMessage::Tick(tick) => self.handle_tick(tick),
                ShardMessage::Inspect {
                    instrument_id,
                    reply,
                } => {
                    let snapshot = self.contexts.get(&instrument_id).map(|ctx| ctx.snapshot());
                    let _ = reply.send(snapshot);
                }
                ShardMessage::Barrier(reply) => {
                    let _ = reply.send(());
                }
                ShardMessage::Shutdown => break,
            }

            if self.abort.load(Ordering::Acquire) {
                warn!(
                    shard = self.index,
                    pending = queue.len(),
                    "Shard worker aborted, abandoning queued work"
                );
                break;
            }
        }

        info!(
            shard = self.index,
            instruments = self.contexts.len(),
            "Shard worker stopped"
        );
        let _ = done.send(self.index);
    }

    /// Per-tick fault boundary: nothing escaping here may stop the worker
    fn handle_tick(&mut self, tick: Tick) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.process_tick(&tick)));

        match outcome {
            Ok(()) => self.metrics.increment_processed(),
            Err(payload) => {
                self.metrics.increment_tick_faults();
                error!(
                    shard = self.index,
                    instrument = %tick.instrument_id(),
                    panic = panic_message(payload.as_ref()),
                    "Tick processing panicked"
                );
            }
        }
    }

    fn process_tick(&mut self, tick: &Tick) {
        let instrument_id = tick.instrument_id();

        let ctx = match self.contexts.entry(instrument_id.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                self.instruments.fetch_add(1, Ordering::Relaxed);
                debug!(shard = self.index, instrument = %instrument_id, "Tracking new instrument");
                entry.insert(InstrumentContext::new(instrument_id, self.history_capacity))
            }
        };

        ctx.record(tick);
        trace!(
            shard = self.index,
            instrument = %instrument_id,
            price = tick.price(),
            history = ctx.history().len(),
            "Tick recorded"
        );

        for strategy in self.strategies.iter() {
            let evaluation = panic::catch_unwind(AssertUnwindSafe(|| strategy.evaluate(tick, ctx)));

            match evaluation {
                Ok(Ok(false)) => {}
                Ok(Ok(true)) => {
                    self.metrics.increment_signals();
                    let signal = FiredSignal::from_tick(strategy.id(), tick);
                    if let Err(e) = self.sink.record_signal(signal) {
                        self.metrics.increment_sink_failures();
                        warn!(
                            shard = self.index,
                            strategy = %strategy.id(),
                            instrument = %instrument_id,
                            sink = self.sink.name(),
                            error = %e,
                            "Sink rejected fired signal"
                        );
                    }
                }
                Ok(Err(e)) => {
                    self.metrics.increment_strategy_faults();
                    error!(
                        shard = self.index,
                        strategy = %strategy.id(),
                        instrument = %instrument_id,
                        error = %e,
                        "Strategy evaluation failed"
                    );
                }
                Err(payload) => {
                    self.metrics.increment_strategy_faults();
                    error!(
                        shard = self.index,
                        strategy = %strategy.id(),
                        instrument = %instrument_id,
                        panic = panic_message(payload.as_ref()),
                        "Strategy panicked"
                    );
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
