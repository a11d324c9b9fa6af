//! The seams between the flush orchestrator and the store.
//!
//! Both traits use return-position `impl Future` so implementations can be
//! written with `async fn` and used through static dispatch; nothing here
//! needs to be object-safe.

use std::future::Future;

use fluent_redis_events::FlatRecord;

use crate::error::StoreError;

/// Opens connections to a store.
pub trait Connector: Send + Sync {
    /// The connection type produced by [`Connector::connect`].
    type Store: HashStore;

    /// Establish one new connection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if the store is unreachable and
    /// [`StoreError::Config`] if the target cannot be used at all.
    fn connect(&self) -> impl Future<Output = Result<Self::Store, StoreError>> + Send;
}

/// One live connection able to write hashes.
pub trait HashStore: Send + Sync {
    /// Run `HSET key name value [name value ...]`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] when the command may not have
    /// reached the store, and [`StoreError::Application`] when the store
    /// rejected it.
    fn hset(
        &self,
        key: &str,
        record: FlatRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Shut the connection down. Failures are logged, not returned.
    fn close(self) -> impl Future<Output = ()> + Send
    where
        Self: Sized;
}
