//! Flush orchestration for the Fluent Bit Redis output.
//!
//! Fluent Bit hands the plugin one chunk of encoded records per flush. The
//! [`Sink`] decodes the chunk lazily, writes each record as a Redis hash
//! and reduces whatever happened to one of three host-visible outcomes.
//!
//! # Architecture
//!
//! ```text
//! flush(chunk, tag)
//!     |
//!     +-- ensure connection ----------> Connector::connect   (lazy reconnect)
//!     |
//!     +-- for each decoded event
//!     |     +-- key = {tag}.{seconds}.{sequence}
//!     |     +-- flatten(fields)
//!     |     +-- HSET key fields -----> HashStore::hset
//!     |
//!     +-- OK | RETRY | ERROR
//! ```
//!
//! # Failure policy
//!
//! | Failure | Remaining records | Connection | Status |
//! |---------|-------------------|------------|--------|
//! | connect fails | not attempted | stays down | `RETRY` |
//! | connection error on `HSET` | abandoned | dropped | `RETRY` |
//! | store rejects `HSET` | abandoned | kept | `ERROR` |
//! | undecodable data | abandoned | kept | `OK` (or `ERROR` when rejecting) |
//!
//! # Modules
//!
//! - [`sink`] -- [`Sink`], the flush state machine
//! - [`config`] -- [`SinkConfig`] loaded from the environment
//! - [`key`] -- [`DeliveryKeys`], per-flush key derivation
//! - [`status`] -- [`FlushStatus`] and [`FlushReport`]
//! - [`error`] -- [`SinkError`]

pub mod config;
pub mod error;
pub mod key;
pub mod sink;
pub mod status;

// Re-export primary types for convenience.
pub use config::{DeliveryPolicy, KeyScheme, SinkConfig, TrailingData};
pub use error::SinkError;
pub use key::DeliveryKeys;
pub use sink::Sink;
pub use status::{FlushReport, FlushStatus};
