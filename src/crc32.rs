//! IEEE 802.3 CRC32 over byte ranges.
//!
//! Pure function wrapper around `crc32fast` so the rest of the wire module
//! doesn't need to know which crate provides the checksum.

/// Compute the IEEE 802.3 CRC32 of `data`.
pub fn checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector() {
        // "123456789" is the standard CRC32 (IEEE) conformance vector.
        assert_eq!(checksum(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn empty_input() {
        assert_eq!(checksum(b""), 0);
    }
}
