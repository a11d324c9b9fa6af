//! Store side of the Redis sink.
//!
//! The sink needs exactly one command, `HSET`, over exactly one connection.
//! This crate defines the two seams the flush orchestrator is written
//! against and a `fred`-backed implementation of both.
//!
//! # Modules
//!
//! - [`store`] -- [`Connector`] and [`HashStore`] traits
//! - [`redis`] -- [`RedisConnector`] and [`RedisStore`] (`fred` client)
//! - [`error`] -- [`StoreError`] and its connection/application split

pub mod error;
pub mod redis;
pub mod store;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use redis::{RedisConnector, RedisStore};
pub use store::{Connector, HashStore};
