//! Frame decoder roundtrip and split-tolerance properties (§8), exercised
//! through the crate's public API.

use kiro_gateway::wire::frame::{self, FrameDecoder};
use kiro_gateway::wire::header::HeaderValue;

fn event_frame(event_type: &str, payload: &[u8]) -> Vec<u8> {
    let headers = vec![(
        ":event-type".to_string(),
        HeaderValue::String(event_type.to_string()),
    )];
    frame::encode(&headers, payload)
}

#[test]
fn decode_of_encode_is_identity() {
    let bytes = event_frame("assistantResponseEvent", br#"{"content":"hi"}"#);
    let mut decoder = FrameDecoder::new();
    let frames = decoder.feed(&bytes);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].payload, br#"{"content":"hi"}"#);
    assert_eq!(frames[0].headers[0].0, ":event-type");
}

#[test]
fn arbitrary_chunking_yields_same_frames_as_one_shot() {
    let mut all = Vec::new();
    for i in 0..5 {
        all.extend(event_frame("assistantResponseEvent", format!("chunk-{i}").as_bytes()));
    }

    let whole = {
        let mut d = FrameDecoder::new();
        d.feed(&all)
    };

    for chunk_size in [1, 4, 9, 17, all.len()] {
        let mut d = FrameDecoder::new();
        let mut frames = Vec::new();
        for c in all.chunks(chunk_size) {
            frames.extend(d.feed(c));
        }
        assert_eq!(frames.len(), whole.len());
        for (a, b) in frames.iter().zip(whole.iter()) {
            assert_eq!(a.payload, b.payload);
        }
    }
}
