//! Fluent Bit event chunk decoding for the Redis sink.
//!
//! Fluent Bit hands output plugins a contiguous buffer of MessagePack
//! entries, one per log record, with no count or length prefix. Each entry
//! is a two-element array of `[timestamp, fields]`. This crate turns such a
//! buffer into [`Event`]s and flattens each event's fields into the
//! alternating name/value argument list that `HSET` expects.
//!
//! # Architecture
//!
//! ```text
//! chunk bytes --> EventStream (lazy) --> Event --> flatten() --> FlatRecord
//! ```
//!
//! # Modules
//!
//! - [`event`] -- [`Event`], [`EventTime`] and [`Fields`]
//! - [`stream`] -- [`EventStream`], the pull-based chunk decoder
//! - [`flatten`] -- [`flatten()`] and [`FlatRecord`]
//! - [`encode`] -- [`encode_event`], the inverse of decoding
//! - [`error`] -- Decode, flatten and encode errors

pub mod encode;
pub mod error;
pub mod event;
pub mod flatten;
pub mod stream;

// Re-export primary types for convenience.
pub use encode::{encode_event, encode_events};
pub use error::{DecodeError, EncodeError, FlattenError};
pub use event::{Event, EventTime, Fields};
pub use flatten::{FlatRecord, flatten};
pub use stream::EventStream;

/// Dynamic MessagePack value type used for field names and values.
pub use rmpv::Value;
