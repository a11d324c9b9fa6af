//! Error types for plugin initialization.

use fluent_redis_sink::SinkError;
use fluent_redis_store::StoreError;

/// Errors that stop the plugin from being set up.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// Environment configuration is invalid.
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    /// The Redis target cannot be used.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The async runtime could not be started.
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

impl PluginError {
    /// Whether the setup failed on settings that a retry cannot change.
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Sink(_) | Self::Store(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_settings_are_config_errors() {
        let sink = PluginError::from(SinkError::Config("unknown key scheme".to_owned()));
        let store = PluginError::from(StoreError::Config("invalid Redis server".to_owned()));
        assert!(sink.is_config());
        assert!(store.is_config());
    }

    #[test]
    fn runtime_failure_is_not_a_config_error() {
        let err = PluginError::from(std::io::Error::other("no threads"));
        assert!(!err.is_config());
    }
}
