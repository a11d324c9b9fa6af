//! Configuration types for the sink.
//!
//! All configuration is loaded from environment variables, the only
//! configuration surface a Fluent Bit Go-proxy plugin gets before `init`.

use std::str::FromStr;

use crate::error::SinkError;

/// Redis target used when `REDIS_SERVER` is unset or empty.
pub const DEFAULT_SERVER: &str = "localhost:6379";

/// Complete sink configuration loaded from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Redis target, `host:port` or a `redis://` URL.
    pub server: String,
    /// How records are keyed and how undecodable data is treated.
    pub policy: DeliveryPolicy,
}

/// Per-flush delivery behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryPolicy {
    /// Shape of the hash keys written for each record.
    pub key_scheme: KeyScheme,
    /// What to tell the host when a chunk stops decoding early.
    pub trailing_data: TrailingData,
}

/// Shape of the key each record is written under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyScheme {
    /// `{tag}.{seconds}.{sequence}`. Two flushes carrying records with the
    /// same tag and second overwrite each other.
    #[default]
    PerFlush,
    /// `{tag}.{seconds}.{flush-id}.{sequence}` with a fresh `UUIDv7` per
    /// flush call, so keys never collide across flushes.
    FlushId,
}

/// Treatment of a chunk that stops decoding before its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingData {
    /// Stop at the bad entry and report `OK` for the chunk.
    #[default]
    Ignore,
    /// Stop at the bad entry and report `ERROR` for the chunk.
    Reject,
}

impl FromStr for KeyScheme {
    type Err = SinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "per-flush" | "legacy" => Ok(Self::PerFlush),
            "flush-id" => Ok(Self::FlushId),
            other => Err(SinkError::Config(format!(
                "unknown key scheme: {other} (expected per-flush or flush-id)"
            ))),
        }
    }
}

impl FromStr for TrailingData {
    type Err = SinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            other => Err(SinkError::Config(format!(
                "unknown trailing data policy: {other} (expected ignore or reject)"
            ))),
        }
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_owned(),
            policy: DeliveryPolicy::default(),
        }
    }
}

impl SinkConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional variables:
    /// - `REDIS_SERVER` -- Redis target (default `localhost:6379`)
    /// - `REDIS_KEY_SCHEME` -- `per-flush` or `flush-id` (default `per-flush`)
    /// - `REDIS_TRAILING_DATA` -- `ignore` or `reject` (default `ignore`)
    pub fn from_env() -> Result<Self, SinkError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SinkError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let server = var("REDIS_SERVER")
            .map_or_else(|| DEFAULT_SERVER.to_owned(), |s| s.trim().to_owned());
        let key_scheme: KeyScheme = var("REDIS_KEY_SCHEME")
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or_default();
        let trailing_data: TrailingData = var("REDIS_TRAILING_DATA")
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            server,
            policy: DeliveryPolicy {
                key_scheme,
                trailing_data,
            },
        })
    }
}
