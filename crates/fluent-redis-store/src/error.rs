//! Error types for the store client.
//!
//! The flush orchestrator only needs to know one thing about a failure:
//! can the same data be sent again later? [`StoreError`] answers that by
//! splitting `fred` errors into connection-level (retryable) and
//! application-level (the store said no) failures.

use fred::error::{Error as FredError, ErrorKind};

/// Errors that can occur talking to the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or the connection broke mid-command.
    #[error("connection error: {0}")]
    Connection(String),

    /// The store received the command and rejected it.
    #[error("application error: {0}")]
    Application(String),

    /// The connection target is unusable (bad URL, bad options).
    #[error("config error: {0}")]
    Config(String),
}

impl StoreError {
    /// Whether resubmitting the same data later may succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

impl From<FredError> for StoreError {
    fn from(e: FredError) -> Self {
        let details = format!("{:?}: {}", e.kind(), e.details());
        match e.kind() {
            // Server error replies: WRONGTYPE, unknown command, bad arity.
            ErrorKind::InvalidCommand
            | ErrorKind::InvalidArgument
            | ErrorKind::Unknown
            | ErrorKind::Parse
            | ErrorKind::NotFound => Self::Application(details),
            ErrorKind::Config | ErrorKind::Url => Self::Config(details),
            _ => Self::Connection(details),
        }
    }
}
