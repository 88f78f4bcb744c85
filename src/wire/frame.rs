//! Length-prefixed, CRC-checked binary frame decoder (§3, §4.1).
//!
//! `FrameDecoder::feed` is called repeatedly with arbitrary chunks of the
//! upstream response body. It buffers any partial tail and returns every
//! complete frame discovered so far, tolerating both split and coalesced
//! frames.

use crate::crc32;
use crate::wire::header::{self, Header};
use bytes::{Buf, BytesMut};

pub const MIN_FRAME_LEN: u32 = 16;
pub const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;
const PRELUDE_LEN: usize = 12;

#[derive(Debug, Clone)]
pub struct Frame {
    pub headers: Vec<Header>,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingPrelude,
    AwaitingData { total_length: u32, headers_length: u32 },
    Stopped,
}

/// Stateful frame decoder. One instance per upstream response; not thread-safe.
pub struct FrameDecoder {
    buf: BytesMut,
    state: State,
    error_count: u32,
    max_errors: u32,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::with_max_errors(10)
    }

    pub fn with_max_errors(max_errors: u32) -> Self {
        Self {
            buf: BytesMut::new(),
            state: State::AwaitingPrelude,
            error_count: 0,
            max_errors,
        }
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn is_stopped(&self) -> bool {
        self.state == State::Stopped
    }

    /// Feed newly-read bytes; returns every frame decoded from the combined
    /// buffer so far. Compacts consumed bytes after each successful frame.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Frame> {
        if self.state == State::Stopped {
            return Vec::new();
        }

        // Cap growable buffer at the maximum legal frame size; a well-formed
        // upstream never needs more than that queued at once.
        self.buf.extend_from_slice(bytes);
        if self.buf.len() as u64 > MAX_FRAME_LEN as u64 * 2 {
            self.buf.truncate(MAX_FRAME_LEN as usize * 2);
        }

        let mut frames = Vec::new();

        loop {
            if self.state == State::Stopped {
                break;
            }

            match self.state {
                State::AwaitingPrelude => {
                    if self.buf.len() < PRELUDE_LEN {
                        break;
                    }

                    let total_length = u32::from_be_bytes(self.buf[0..4].try_into().unwrap());
                    let headers_length = u32::from_be_bytes(self.buf[4..8].try_into().unwrap());
                    let prelude_crc = u32::from_be_bytes(self.buf[8..12].try_into().unwrap());

                    let bounds_ok = total_length >= MIN_FRAME_LEN
                        && total_length <= MAX_FRAME_LEN
                        && headers_length <= total_length.saturating_sub(16);
                    let crc_ok = bounds_ok && crc32::checksum(&self.buf[0..8]) == prelude_crc;

                    if crc_ok {
                        self.state = State::AwaitingData {
                            total_length,
                            headers_length,
                        };
                    } else {
                        // Byte-level resync: drop one byte, retry.
                        self.buf.advance(1);
                        self.error_count += 1;
                        if self.error_count >= self.max_errors {
                            self.state = State::Stopped;
                            break;
                        }
                    }
                }
                State::AwaitingData {
                    total_length,
                    headers_length,
                } => {
                    if (self.buf.len() as u32) < total_length {
                        break;
                    }

                    let message_crc = u32::from_be_bytes(
                        self.buf[(total_length - 4) as usize..total_length as usize]
                            .try_into()
                            .unwrap(),
                    );
                    let crc_ok =
                        crc32::checksum(&self.buf[0..(total_length - 4) as usize]) == message_crc;

                    if crc_ok {
                        let headers_start = PRELUDE_LEN;
                        let headers_end = headers_start + headers_length as usize;
                        let payload_end = (total_length - 4) as usize;

                        let headers_block = &self.buf[headers_start..headers_end];
                        let headers = header::decode_headers(headers_block).unwrap_or_default();
                        let payload = self.buf[headers_end..payload_end].to_vec();

                        frames.push(Frame { headers, payload });
                        self.buf.advance(total_length as usize);
                        self.state = State::AwaitingPrelude;
                    } else {
                        // Corrupted full frame: discard consumed bytes, resync.
                        self.buf.advance(total_length as usize);
                        self.error_count += 1;
                        self.state = State::AwaitingPrelude;
                        if self.error_count >= self.max_errors {
                            self.state = State::Stopped;
                            break;
                        }
                    }
                }
                State::Stopped => break,
            }
        }

        frames
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a frame's headers + payload into its wire representation. Exposed
/// for tests and fixture construction.
pub fn encode(headers: &[Header], payload: &[u8]) -> Vec<u8> {
    let headers_block = header::encode_headers(headers);
    let headers_length = headers_block.len() as u32;
    let total_length = 16 + headers_length + payload.len() as u32;

    let mut out = Vec::with_capacity(total_length as usize);
    out.extend_from_slice(&total_length.to_be_bytes());
    out.extend_from_slice(&headers_length.to_be_bytes());
    let prelude_crc = crc32::checksum(&out[0..8]);
    out.extend_from_slice(&prelude_crc.to_be_bytes());
    out.extend_from_slice(&headers_block);
    out.extend_from_slice(payload);

    let message_crc = crc32::checksum(&out);
    out.extend_from_slice(&message_crc.to_be_bytes());
    out
}
