//! Process-wide plugin state behind the C exports.
//!
//! Fluent Bit gives a Go-proxy plugin no context pointer to stash state in,
//! so the sink and the runtime driving it live in one [`OnceLock`]. The
//! sink itself serializes flushes, so concurrent host threads are safe.

use std::os::raw::c_int;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Once, OnceLock};

use fluent_redis_sink::{FlushStatus, Sink, SinkConfig};
use fluent_redis_store::RedisConnector;
use tokio::runtime::{Builder, Runtime};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::PluginError;
use crate::proxy::{FLB_ERROR, FLB_OK, FLB_RETRY};

static PLUGIN: OnceLock<Plugin> = OnceLock::new();
static INIT_TRACING: Once = Once::new();
/// Set when init failed on settings; flushes then fail instead of retrying.
static CONFIG_REJECTED: AtomicBool = AtomicBool::new(false);

/// The sink plus the runtime its futures run on.
struct Plugin {
    runtime: Runtime,
    sink: Sink<RedisConnector>,
}

impl Plugin {
    fn from_env() -> Result<Self, PluginError> {
        let config = SinkConfig::from_env()?;
        info!(
            server = config.server,
            key_scheme = ?config.policy.key_scheme,
            trailing_data = ?config.policy.trailing_data,
            "configuration loaded"
        );

        let connector = RedisConnector::new(&config.server)?;
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("out-redis")
            .enable_all()
            .build()?;

        Ok(Self {
            runtime,
            sink: Sink::new(connector, config.policy),
        })
    }
}

/// Install the log subscriber once per process.
fn init_logging() {
    INIT_TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        // The host may already have a subscriber (tests, embedding); keep it.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    });
}

/// Map a flush outcome to Fluent Bit's return code.
pub(crate) const fn status_code(status: FlushStatus) -> c_int {
    match status {
        FlushStatus::Ok => FLB_OK,
        FlushStatus::Retry => FLB_RETRY,
        FlushStatus::Error => FLB_ERROR,
    }
}

/// Set up the plugin and open the first connection.
///
/// A failed connect still leaves the sink installed; later flushes
/// reconnect lazily and report `FLB_RETRY` until the store is back.
pub(crate) fn init() -> c_int {
    init_logging();
    info!(version = env!("CARGO_PKG_VERSION"), "out_redis starting");

    let plugin = if let Some(plugin) = PLUGIN.get() {
        plugin
    } else {
        match Plugin::from_env() {
            Ok(plugin) => PLUGIN.get_or_init(|| plugin),
            Err(e) => {
                error!(error = %e, "cannot initialize Redis output");
                if e.is_config() {
                    CONFIG_REJECTED.store(true, Ordering::Release);
                }
                return FLB_ERROR;
            }
        }
    };

    match plugin.runtime.block_on(plugin.sink.connect()) {
        Ok(()) => FLB_OK,
        Err(e) => {
            error!(error = %e, "error connecting to Redis");
            FLB_ERROR
        }
    }
}

/// Deliver one chunk.
pub(crate) fn flush(chunk: &[u8], tag: &str) -> c_int {
    let Some(plugin) = PLUGIN.get() else {
        return uninitialized_status(tag, CONFIG_REJECTED.load(Ordering::Acquire));
    };
    status_code(plugin.runtime.block_on(plugin.sink.flush(chunk, tag)))
}

/// Answer a flush that arrives with no sink installed.
///
/// A configuration error will not fix itself, so the chunk is discarded;
/// anything else is retried.
fn uninitialized_status(tag: &str, config_rejected: bool) -> c_int {
    if config_rejected {
        error!(tag, "plugin configuration is invalid, chunk discarded");
        FLB_ERROR
    } else {
        warn!(tag, "flush before successful init, asking host to retry");
        FLB_RETRY
    }
}

/// Close the connection. The runtime lives until the process exits.
pub(crate) fn exit() -> c_int {
    if let Some(plugin) = PLUGIN.get() {
        plugin.runtime.block_on(plugin.sink.shutdown());
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_fluent_bit() {
        assert_eq!(status_code(FlushStatus::Ok), 1);
        assert_eq!(status_code(FlushStatus::Retry), 2);
        assert_eq!(status_code(FlushStatus::Error), 0);
    }

    #[test]
    fn flush_without_sink_retries_unless_config_was_rejected() {
        assert_eq!(uninitialized_status("app.log", false), FLB_RETRY);
        assert_eq!(uninitialized_status("app.log", true), FLB_ERROR);
    }
}
