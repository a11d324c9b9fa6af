//! Error types for sink setup.
//!
//! Flushes never return errors -- every failure is reduced to a
//! [`FlushStatus`](crate::FlushStatus). [`SinkError`] covers what can go
//! wrong before the first flush: configuration and the initial connect.

use fluent_redis_store::StoreError;

/// Errors that can occur while setting up the sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// The store could not be reached or rejected the connection target.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
