//! # Torq Signal Codec
//!
//! The dispatch layer's decoding rules: turn a market data message from the
//! relay into [`types::Tick`] values, or explain precisely why it cannot.
//!
//! Producers disagree on field names, so every tick attribute is resolved
//! from a prioritized list of candidate keys ([`FieldAliases`]). A message
//! may carry one tick object, an array of them, or an envelope whose `data`
//! field holds either.
//!
//! ```text
//! relay bytes → TickDecoder::decode → Vec<Result<Tick, DecodeError>>
//!                     │
//!                     └── DecodeError for the whole message (bad JSON, wrong shape)
//! ```
//!
//! The decoder holds no mutable state and is safe to share between threads.

pub mod decoder;
pub mod error;
pub mod fields;
pub mod timestamp;

pub use decoder::{DecodedBatch, TickDecoder};
pub use error::DecodeError;
pub use fields::{FieldAliases, TickField};
pub use timestamp::parse_event_time;
