//! The flush state machine.
//!
//! A [`Sink`] owns the only long-lived state in the plugin: the store
//! connection. The connection sits behind an async mutex that is held for
//! the whole flush, so checking, reconnecting, writing and dropping the
//! connection happen as one critical section even if the host flushes from
//! several threads at once.

use std::fmt;

use fluent_redis_events::{EventStream, flatten};
use fluent_redis_store::{Connector, HashStore, StoreError};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::{DeliveryPolicy, TrailingData};
use crate::key::DeliveryKeys;
use crate::status::{FlushReport, FlushStatus};

/// Connection lifecycle.
enum ConnectionState<S> {
    /// No usable connection; the next flush connects first.
    Disconnected,
    /// A connection that has not reported a transport failure.
    Connected(S),
}

impl<S: HashStore> ConnectionState<S> {
    const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }

    /// Connect if currently disconnected.
    async fn ensure<C>(&mut self, connector: &C) -> Result<&S, StoreError>
    where
        C: Connector<Store = S>,
    {
        if !self.is_connected() {
            *self = Self::Connected(connector.connect().await?);
        }
        match &*self {
            Self::Connected(store) => Ok(store),
            Self::Disconnected => Err(StoreError::Connection("not connected".to_owned())),
        }
    }

    /// Drop the current connection, closing it first.
    async fn reset(&mut self) {
        if let Self::Connected(store) = std::mem::replace(self, Self::Disconnected) {
            store.close().await;
        }
    }
}

/// Why the record loop stopped early.
enum Abort {
    /// The chunk stopped decoding or a record could not be flattened.
    Undecodable,
    /// The connection failed; drop it and have the host retry.
    Connection,
    /// The store rejected a record; the chunk is discarded.
    Rejected,
}

/// Writes Fluent Bit chunks to a store, one hash per record.
pub struct Sink<C: Connector> {
    connector: C,
    policy: DeliveryPolicy,
    state: Mutex<ConnectionState<C::Store>>,
}

impl<C: Connector> Sink<C> {
    /// Create a disconnected sink. Nothing touches the network until
    /// [`Sink::connect`] or the first flush.
    pub fn new(connector: C, policy: DeliveryPolicy) -> Self {
        Self {
            connector,
            policy,
            state: Mutex::new(ConnectionState::Disconnected),
        }
    }

    /// The delivery policy this sink was built with.
    pub const fn policy(&self) -> DeliveryPolicy {
        self.policy
    }

    /// Whether a connection is currently held.
    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.is_connected()
    }

    /// Establish the connection if it is not already up.
    ///
    /// # Errors
    ///
    /// Returns the [`StoreError`] from the connector.
    pub async fn connect(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.ensure(&self.connector).await.map(|_| ())
    }

    /// Close the connection, if any. A later flush reconnects.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        if state.is_connected() {
            info!("closing store connection");
        }
        state.reset().await;
    }

    /// Deliver one chunk and return only the host-visible status.
    pub async fn flush(&self, chunk: &[u8], tag: &str) -> FlushStatus {
        self.flush_report(chunk, tag).await.status
    }

    /// Deliver one chunk.
    ///
    /// Records are written in chunk order. The first failure ends the call:
    /// later records in the same chunk are not attempted.
    pub async fn flush_report(&self, chunk: &[u8], tag: &str) -> FlushReport {
        let mut state = self.state.lock().await;

        let reconnecting = !state.is_connected();
        if reconnecting {
            info!(tag, "store connection is down, reconnecting");
        }
        let store = match state.ensure(&self.connector).await {
            Ok(store) => store,
            Err(e) => {
                warn!(tag, error = %e, "cannot reach store, chunk will be retried");
                return FlushReport::new(FlushStatus::Retry, 0);
            }
        };
        if reconnecting {
            info!(tag, "reconnected to store");
        }

        let keys = DeliveryKeys::for_flush(self.policy.key_scheme);
        let mut written: u64 = 0;
        let mut abort = None;

        for pulled in EventStream::new(chunk) {
            let event = match pulled {
                Ok(event) => event,
                Err(e) => {
                    self.log_undecodable(tag, written, &e);
                    abort = Some(Abort::Undecodable);
                    break;
                }
            };
            let record = match flatten(&event.fields) {
                Ok(record) => record,
                Err(e) => {
                    self.log_undecodable(tag, written, &e);
                    abort = Some(Abort::Undecodable);
                    break;
                }
            };

            let key = keys.key(tag, event.time.seconds(), written);
            match store.hset(&key, record).await {
                Ok(()) => written = written.saturating_add(1),
                Err(e) if e.is_retryable() => {
                    warn!(
                        tag,
                        key = key.as_str(),
                        written,
                        error = %e,
                        "connection problem with store, chunk will be retried"
                    );
                    abort = Some(Abort::Connection);
                    break;
                }
                Err(e) => {
                    error!(
                        tag,
                        key = key.as_str(),
                        written,
                        error = %e,
                        "store rejected record, chunk discarded"
                    );
                    abort = Some(Abort::Rejected);
                    break;
                }
            }
        }

        let status = match abort {
            None => FlushStatus::Ok,
            Some(Abort::Undecodable) => match self.policy.trailing_data {
                TrailingData::Ignore => FlushStatus::Ok,
                TrailingData::Reject => FlushStatus::Error,
            },
            Some(Abort::Connection) => {
                state.reset().await;
                FlushStatus::Retry
            }
            Some(Abort::Rejected) => FlushStatus::Error,
        };

        debug!(tag, records = written, %status, "flush finished");
        FlushReport::new(status, written)
    }

    fn log_undecodable(&self, tag: &str, written: u64, reason: &dyn fmt::Display) {
        match self.policy.trailing_data {
            TrailingData::Ignore => {
                warn!(tag, written, error = %reason, "undecodable record, rest of chunk skipped");
            }
            TrailingData::Reject => {
                error!(tag, written, error = %reason, "undecodable record, chunk rejected");
            }
        }
    }
}
