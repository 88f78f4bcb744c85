//! Drives an upstream byte stream through the frame decoder and classifier,
//! yielding typed events to the caller (§4 "Stream aggregator").
//!
//! One instance per request; owns the `FrameDecoder`'s growable buffer for
//! the lifetime of the response body.

use crate::wire::event::{self, Event};
use crate::wire::frame::FrameDecoder;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};

pub struct StreamAggregator {
    decoder: FrameDecoder,
}

impl StreamAggregator {
    pub fn new() -> Self {
        Self {
            decoder: FrameDecoder::new(),
        }
    }

    /// Wrap a raw upstream byte stream into a stream of classified events.
    /// Network errors end the stream; a corrupted-past-recovery frame
    /// decoder (§7 "exceeding max_errors stops the stream") ends it too.
    pub fn events<S>(mut self, body: S) -> impl Stream<Item = Event>
    where
        S: Stream<Item = Result<Bytes, reqwest::Error>>,
    {
        async_stream::stream! {
            let mut body = Box::pin(body);
            while let Some(chunk) = body.next().await {
                let Ok(chunk) = chunk else { break };
                for frame in self.decoder.feed(&chunk) {
                    yield event::classify(&frame);
                }
                if self.decoder.is_stopped() {
                    break;
                }
            }
        }
    }
}

impl Default for StreamAggregator {
    fn default() -> Self {
        Self::new()
    }
}
