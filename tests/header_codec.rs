//! Header codec roundtrip and rejection properties (§8), through the public
//! `wire::header` API.

use kiro_gateway::wire::header::{HeaderValue, decode_headers, encode_headers};

#[test]
fn roundtrips_every_type_code() {
    let headers = vec![
        ("bool-true".to_string(), HeaderValue::BoolTrue),
        ("bool-false".to_string(), HeaderValue::BoolFalse),
        ("byte".to_string(), HeaderValue::Byte(42)),
        ("short".to_string(), HeaderValue::Short(-1000)),
        ("int".to_string(), HeaderValue::Int(123_456)),
        ("long".to_string(), HeaderValue::Long(9_000_000_000)),
        ("bytes".to_string(), HeaderValue::Bytes(vec![1, 2, 3, 4])),
        ("string".to_string(), HeaderValue::String("hello".to_string())),
        ("timestamp".to_string(), HeaderValue::Timestamp(1_700_000_000)),
        (
            "uuid".to_string(),
            HeaderValue::Uuid([0xAB; 16]),
        ),
    ];

    let encoded = encode_headers(&headers);
    let decoded = decode_headers(&encoded).expect("decode");

    assert_eq!(decoded.len(), headers.len());
    for ((expected_name, expected_value), (name, value)) in headers.iter().zip(decoded.iter()) {
        assert_eq!(name, expected_name);
        assert_eq!(value, expected_value);
    }
}

#[test]
fn rejects_unknown_type_code() {
    let mut block = Vec::new();
    block.push(4u8); // name length
    block.extend_from_slice(b"name");
    block.push(0xFF); // unknown type code
    assert!(decode_headers(&block).is_err());
}

#[test]
fn rejects_truncated_length_prefix() {
    let block = vec![9u8]; // name length says 9 bytes follow, but buffer ends here
    assert!(decode_headers(&block).is_err());
}

#[test]
fn rejects_non_utf8_string_payload() {
    let mut block = Vec::new();
    block.push(1u8);
    block.extend_from_slice(b"n");
    block.push(7u8); // string type code
    block.extend_from_slice(&2u16.to_be_bytes());
    block.extend_from_slice(&[0xFF, 0xFE]); // invalid UTF-8
    assert!(decode_headers(&block).is_err());
}
