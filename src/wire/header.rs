//! Typed header TLV codec (§3, §4.2).
//!
//! Each header is `u8 name_len` + name bytes + `u8 type_code` + a type-specific
//! payload. This module is a pure byte-cursor codec, consumed exactly: leftover
//! bytes after the last header is an error.

use crate::error::GatewayError;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    BoolTrue,
    BoolFalse,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Bytes(Vec<u8>),
    String(String),
    Timestamp(i64),
    Uuid([u8; 16]),
}

impl HeaderValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn type_code(&self) -> u8 {
        match self {
            HeaderValue::BoolTrue => 0,
            HeaderValue::BoolFalse => 1,
            HeaderValue::Byte(_) => 2,
            HeaderValue::Short(_) => 3,
            HeaderValue::Int(_) => 4,
            HeaderValue::Long(_) => 5,
            HeaderValue::Bytes(_) => 6,
            HeaderValue::String(_) => 7,
            HeaderValue::Timestamp(_) => 8,
            HeaderValue::Uuid(_) => 9,
        }
    }

    fn encode_payload(&self, out: &mut Vec<u8>) {
        match self {
            HeaderValue::BoolTrue | HeaderValue::BoolFalse => {}
            HeaderValue::Byte(v) => out.push(*v as u8),
            HeaderValue::Short(v) => out.extend_from_slice(&v.to_be_bytes()),
            HeaderValue::Int(v) => out.extend_from_slice(&v.to_be_bytes()),
            HeaderValue::Long(v) => out.extend_from_slice(&v.to_be_bytes()),
            HeaderValue::Bytes(b) => {
                out.extend_from_slice(&(b.len() as u16).to_be_bytes());
                out.extend_from_slice(b);
            }
            HeaderValue::String(s) => {
                out.extend_from_slice(&(s.len() as u16).to_be_bytes());
                out.extend_from_slice(s.as_bytes());
            }
            HeaderValue::Timestamp(v) => out.extend_from_slice(&v.to_be_bytes()),
            HeaderValue::Uuid(b) => out.extend_from_slice(b),
        }
    }
}

pub type Header = (String, HeaderValue);

/// Encode an ordered list of headers into their wire byte block.
pub fn encode_headers(headers: &[Header]) -> Vec<u8> {
    let mut out = Vec::new();
    for (name, value) in headers {
        out.push(name.len() as u8);
        out.extend_from_slice(name.as_bytes());
        out.push(value.type_code());
        value.encode_payload(&mut out);
    }
    out
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], GatewayError> {
        if self.remaining() < n {
            return Err(GatewayError::InvalidRequest(
                "truncated header block".to_string(),
            ));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_u8(&mut self) -> Result<u8, GatewayError> {
        Ok(self.take(1)?[0])
    }

    fn take_u16(&mut self) -> Result<u16, GatewayError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }
}

/// Decode the `headers_length`-byte block into an ordered list of headers.
///
/// Consumes the block exactly. An unknown type code, truncated length, or
/// non-UTF-8 string payload is an error (§4.2); the caller (the frame
/// decoder) substitutes an empty header set on error so classification can
/// still proceed.
pub fn decode_headers(block: &[u8]) -> Result<Vec<Header>, GatewayError> {
    let mut cursor = Cursor::new(block);
    let mut headers = Vec::new();

    while cursor.remaining() > 0 {
        let name_len = cursor.take_u8()? as usize;
        let name_bytes = cursor.take(name_len)?;
        let name = String::from_utf8(name_bytes.to_vec())
            .map_err(|_| GatewayError::InvalidRequest("non-utf8 header name".to_string()))?;
        let type_code = cursor.take_u8()?;

        let value = match type_code {
            0 => HeaderValue::BoolTrue,
            1 => HeaderValue::BoolFalse,
            2 => HeaderValue::Byte(cursor.take(1)?[0] as i8),
            3 => {
                let b = cursor.take(2)?;
                HeaderValue::Short(i16::from_be_bytes([b[0], b[1]]))
            }
            4 => {
                let b = cursor.take(4)?;
                HeaderValue::Int(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
            }
            5 => {
                let b = cursor.take(8)?;
                HeaderValue::Long(i64::from_be_bytes(b.try_into().unwrap()))
            }
            6 => {
                let len = cursor.take_u16()? as usize;
                HeaderValue::Bytes(cursor.take(len)?.to_vec())
            }
            7 => {
                let len = cursor.take_u16()? as usize;
                let bytes = cursor.take(len)?;
                let s = String::from_utf8(bytes.to_vec()).map_err(|_| {
                    GatewayError::InvalidRequest("non-utf8 header string value".to_string())
                })?;
                HeaderValue::String(s)
            }
            8 => {
                let b = cursor.take(8)?;
                HeaderValue::Timestamp(i64::from_be_bytes(b.try_into().unwrap()))
            }
            9 => {
                let b = cursor.take(16)?;
                let mut arr = [0u8; 16];
                arr.copy_from_slice(b);
                HeaderValue::Uuid(arr)
            }
            other => {
                return Err(GatewayError::InvalidRequest(format!(
                    "unknown header type code {other}"
                )));
            }
        };

        headers.push((name, value));
    }

    Ok(headers)
}

/// Look up the first header by name into a convenience map (well-known
/// headers only appear once per frame in practice, but headers are an
/// ordered list on the wire, not a map, per §3).
pub fn index_by_name(headers: &[Header]) -> HashMap<&str, &HeaderValue> {
    headers
        .iter()
        .map(|(k, v)| (k.as_str(), v))
        .collect()
}
