//! Fluent Bit output plugin writing records to Redis hashes.
//!
//! Fluent Bit loads Go-proxy output plugins with `-e out_redis.so` and
//! drives them through four exported C functions. This crate provides those
//! exports on top of [`fluent_redis_sink::Sink`]:
//!
//! | Export | Does |
//! |--------|------|
//! | `FLBPluginRegister` | fills the proxy definition (`redis` output) |
//! | `FLBPluginInit` | logging, config from env, runtime, first connect |
//! | `FLBPluginFlush` | one chunk -> `FLB_OK` / `FLB_RETRY` / `FLB_ERROR` |
//! | `FLBPluginExit` | closes the connection |
//!
//! # Configuration
//!
//! - `REDIS_SERVER` -- `host:port` or URL (default `localhost:6379`)
//! - `REDIS_KEY_SCHEME` -- `per-flush` or `flush-id`
//! - `REDIS_TRAILING_DATA` -- `ignore` or `reject`
//! - `RUST_LOG` -- log filter (default `info`)
//!
//! # Panic Safety
//!
//! Every export runs inside `std::panic::catch_unwind`; a panic is logged
//! and reported to Fluent Bit as `FLB_ERROR` instead of unwinding into C.

mod error;
mod ffi;
mod host;
mod proxy;

pub use error::PluginError;
pub use ffi::{FLBPluginExit, FLBPluginFlush, FLBPluginInit, FLBPluginRegister};
pub use proxy::{
    FLB_ERROR, FLB_OK, FLB_PROXY_GOLANG, FLB_PROXY_OUTPUT_PLUGIN, FLB_RETRY, FlbPluginProxyDef,
};
