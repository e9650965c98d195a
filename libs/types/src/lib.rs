//! # Torq Signal Types
//!
//! Value types shared by every stage of the signal pipeline:
//!
//! ```text
//! wire message → [codec] → Tick → [signal_engine shard] → strategies → FiredSignal → sink
//! ```
//!
//! - [`Tick`]: one immutable price observation for one instrument
//! - [`FiredSignal`]: what a strategy hands to the result sink when it triggers
//! - [`SessionClock`]: maps event timestamps onto the exchange's local clock and
//!   answers "is this end-of-session data?"
//!
//! Timestamps are epoch milliseconds (`i64`) throughout.

pub mod session;
pub mod signal;
pub mod tick;
pub mod time;

pub use session::{SessionClock, SessionZone, SessionZoneError};
pub use signal::FiredSignal;
pub use tick::Tick;
pub use time::current_timestamp_ms;
