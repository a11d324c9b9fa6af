//! `fred`-backed Redis connection.
//!
//! Each [`RedisStore`] wraps one [`fred::prelude::Client`] built without a
//! reconnect policy: when the socket dies, commands fail with a connection
//! error instead of being queued, and the orchestrator decides when to
//! open a fresh connection through [`RedisConnector`].

use fluent_redis_events::FlatRecord;
use fred::bytes::Bytes;
use fred::prelude::*;
use fred::types::{ClusterHash, CustomCommand, Value};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::{Connector, HashStore};

/// Scheme prepended to bare `host:port` targets.
const DEFAULT_SCHEME: &str = "redis://";

/// Opens [`RedisStore`] connections to one server.
#[derive(Debug, Clone)]
pub struct RedisConnector {
    target: String,
    config: Config,
}

impl RedisConnector {
    /// Build a connector for `server`.
    ///
    /// `server` is either `host:port` (as in `REDIS_SERVER`) or a full
    /// `redis://`, `rediss://` or `redis-sentinel://` URL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the target cannot be parsed.
    pub fn new(server: &str) -> Result<Self, StoreError> {
        let url = if server.contains("://") {
            server.to_owned()
        } else {
            format!("{DEFAULT_SCHEME}{server}")
        };
        let config = Config::from_url(&url)
            .map_err(|e| StoreError::Config(format!("invalid Redis server {server}: {e}")))?;

        Ok(Self {
            target: server.to_owned(),
            config,
        })
    }

    /// The server this connector was built for, as configured.
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Connector for RedisConnector {
    type Store = RedisStore;

    async fn connect(&self) -> Result<RedisStore, StoreError> {
        info!(server = self.target.as_str(), "connecting to Redis");
        let client = Builder::from_config(self.config.clone()).build()?;
        let _connection_task = client.init().await?;
        info!(server = self.target.as_str(), "connected to Redis");
        Ok(RedisStore { client })
    }
}

/// One live Redis connection.
pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    /// Return a reference to the underlying [`Client`].
    pub const fn client(&self) -> &Client {
        &self.client
    }
}

impl HashStore for RedisStore {
    async fn hset(&self, key: &str, record: FlatRecord) -> Result<(), StoreError> {
        let mut args: Vec<Value> = Vec::with_capacity(record.len().saturating_add(1));
        args.push(Value::from(key));
        args.extend(
            record
                .into_args()
                .into_iter()
                .map(|arg| Value::Bytes(Bytes::from(arg))),
        );

        let hset = CustomCommand::new_static("HSET", ClusterHash::FirstKey, false);
        let _: Value = self.client.custom(hset, args).await?;
        Ok(())
    }

    async fn close(self) {
        if let Err(e) = self.client.quit().await {
            debug!(error = %e, "error closing Redis connection");
        }
    }
}
