//! Anthropic-compatible chat completions gateway fronting a proprietary,
//! binary-framed streaming upstream (AWS event-stream framing + OAuth token
//! refresh).

pub mod auth;
pub mod cli;
pub mod config;
pub mod convert;
pub mod crc32;
pub mod error;
pub mod logging;
pub mod model;
pub mod server;
pub mod sse;
pub mod stream_aggregator;
pub mod upstream_client;
pub mod wire;
