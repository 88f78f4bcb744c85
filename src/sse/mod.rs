//! Upstream-event -> Anthropic-wire translation, streaming and aggregated.

pub mod aggregate;
pub mod emitter;

pub use aggregate::Aggregator;
pub use emitter::{SseEmitter, SseEvent};
