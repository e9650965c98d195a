//! Shared fixtures for engine integration tests

#![allow(dead_code)]

use chrono::NaiveTime;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use strategies::{InstrumentContext, Strategy, StrategyError};
use torq_config::{EngineSettings, SignalEngineConfig};
use types::{SessionClock, Tick};

/// 2024-06-03 15:00:00 in UTC+8
pub const FIRST_CLOSE_MS: i64 = 1_717_398_000_000;
pub const DAY_MS: i64 = 86_400_000;

pub fn session() -> SessionClock {
    SessionClock::new(
        "+08:00".parse().unwrap(),
        NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
    )
}

pub fn engine_settings(workers: usize) -> EngineSettings {
    EngineSettings {
        workers: Some(workers),
        queue_capacity: 1_024,
        shutdown_grace_ms: 5_000,
        ..EngineSettings::default()
    }
}

/// Default roster, session pinned to UTC+8 so tests do not depend on the host zone
pub fn config(workers: usize) -> SignalEngineConfig {
    let mut config = SignalEngineConfig::default();
    config.engine = engine_settings(workers);
    config.session.utc_offset = Some("+08:00".to_string());
    config
}

pub fn close_tick(instrument: &str, day: i64, price: f64) -> Tick {
    Tick::new(instrument, price, price, 1_000, FIRST_CLOSE_MS + day * DAY_MS)
}

/// 13 descending closes, 20.0 down to 8.0
pub fn descending_closes(instrument: &str) -> Vec<Tick> {
    (0..13)
        .map(|day| close_tick(instrument, day, 20.0 - day as f64))
        .collect()
}

/// Fails every evaluation
#[derive(Debug)]
pub struct ErroringStrategy;

impl Strategy for ErroringStrategy {
    fn id(&self) -> &str {
        "ERRORING"
    }

    fn evaluate(&self, _tick: &Tick, _ctx: &mut InstrumentContext) -> strategies::Result<bool> {
        Err(StrategyError::evaluation("always fails"))
    }
}

/// Panics on every evaluation
#[derive(Debug)]
pub struct PanickingStrategy;

impl Strategy for PanickingStrategy {
    fn id(&self) -> &str {
        "PANICKING"
    }

    fn evaluate(&self, _tick: &Tick, _ctx: &mut InstrumentContext) -> strategies::Result<bool> {
        panic!("strategy blew up")
    }
}

/// Fires on every tick
#[derive(Debug)]
pub struct AlwaysFires;

impl Strategy for AlwaysFires {
    fn id(&self) -> &str {
        "ALWAYS"
    }

    fn evaluate(&self, _tick: &Tick, _ctx: &mut InstrumentContext) -> strategies::Result<bool> {
        Ok(true)
    }
}

/// Records the order in which each instrument's prices are seen
#[derive(Debug, Default)]
pub struct RecordingStrategy {
    seen: Mutex<HashMap<String, Vec<f64>>>,
}

impl RecordingStrategy {
    pub fn seen(&self) -> HashMap<String, Vec<f64>> {
        self.seen.lock().clone()
    }
}

impl Strategy for RecordingStrategy {
    fn id(&self) -> &str {
        "RECORDING"
    }

    fn evaluate(&self, tick: &Tick, _ctx: &mut InstrumentContext) -> strategies::Result<bool> {
        self.seen
            .lock()
            .entry(tick.instrument_id().to_string())
            .or_default()
            .push(tick.price());
        Ok(false)
    }
}

/// Announces each evaluation, then holds the worker until released
///
/// Dropping the release sender lets every held and later evaluation through.
#[derive(Debug)]
pub struct GateStrategy {
    entered: Sender<()>,
    release: Receiver<()>,
}

impl GateStrategy {
    pub fn new() -> (Self, Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = crossbeam_channel::unbounded();
        let (release_tx, release_rx) = crossbeam_channel::unbounded();
        (
            Self {
                entered: entered_tx,
                release: release_rx,
            },
            entered_rx,
            release_tx,
        )
    }
}

impl Strategy for GateStrategy {
    fn id(&self) -> &str {
        "GATE"
    }

    fn evaluate(&self, _tick: &Tick, _ctx: &mut InstrumentContext) -> strategies::Result<bool> {
        let _ = self.entered.send(());
        let _ = self.release.recv_timeout(Duration::from_secs(10));
        Ok(false)
    }
}

pub fn shared<S: Strategy + 'static>(strategy: S) -> Arc<dyn Strategy> {
    Arc::new(strategy)
}
