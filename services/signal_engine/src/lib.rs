//! # Torq Signal Engine
//!
//! ## Purpose
//!
//! Evaluates every configured strategy against every inbound tick with no
//! locks on the hot path, forwarding fired signals to a [`SignalSink`].
//!
//! ## Architecture Role
//!
//! ```text
//! relay / stdin ──► Dispatcher ──► ShardedEngine ──► shard workers ──► SignalSink
//!   (NDJSON)        (TickDecoder)   (crc32 routing)   (InstrumentContext,
//!                                                      StrategySet)
//! ```
//!
//! ## Guarantees
//!
//! - All ticks of one instrument are processed by one worker, in submission order
//! - A failing or panicking strategy is logged and counted; the others still run
//! - Nothing on the hot path reports an error to the producer
//! - Shutdown drains for a bounded grace period, then aborts
//!
//! [`SignalSink`]: message_sink::SignalSink

pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod router;
mod shard;

pub use dispatcher::{field_aliases, DispatchSummary, Dispatcher};
pub use engine::{ShardedEngine, ShutdownOutcome, SubmitStatus};
pub use error::{EngineError, Result};
pub use logging::init_logging;
pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use router::shard_for;
