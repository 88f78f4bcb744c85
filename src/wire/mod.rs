//! Binary event-stream wire protocol: framing, headers, and event classification.

pub mod event;
pub mod frame;
pub mod header;

pub use event::Event;
pub use frame::{Frame, FrameDecoder};
