//! String decoding for the two layout families
//!
//! Fixed-capacity fields are NUL-terminated UTF-8 embedded in the record;
//! trailing fields are UTF-16LE byte runs appended after the fixed record.
//! Both decoders are lossy and total: malformed bytes degrade to
//! replacement characters, never to a failed snapshot.

/// Decode a fixed-capacity NUL-terminated UTF-8 field.
///
/// Text runs from the field start up to the first zero byte, or the full
/// `capacity` if no zero byte occurs. An all-zero or zero-length field
/// decodes to the empty string.
pub fn decode_fixed_capacity(bytes: &[u8], capacity: usize) -> String {
    let field = &bytes[..capacity.min(bytes.len())];
    let len = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..len]).into_owned()
}

/// Decode a trailing UTF-16LE byte run.
///
/// The caller slices exactly the declared byte length. An odd trailing
/// byte cannot form a code unit and is dropped; unpaired surrogates are
/// replaced rather than failing the decode.
pub fn decode_trailing_utf16(bytes: &[u8]) -> String {
    let even = bytes.len() & !1;
    let units: Vec<u16> = bytes[..even]
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fixed_field(text: &str, capacity: usize) -> Vec<u8> {
        let mut field = vec![0u8; capacity];
        field[..text.len()].copy_from_slice(text.as_bytes());
        field
    }

    fn utf16_bytes(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    #[test]
    fn test_fixed_capacity_basic() {
        let field = fixed_field("60 Hz Pro", 256);
        assert_eq!(decode_fixed_capacity(&field, 256), "60 Hz Pro");
    }

    #[test]
    fn test_fixed_capacity_all_zero_is_empty() {
        let field = vec![0u8; 256];
        assert_eq!(decode_fixed_capacity(&field, 256), "");
        assert_eq!(decode_fixed_capacity(&[], 0), "");
    }

    #[test]
    fn test_fixed_capacity_no_terminator_uses_full_capacity() {
        let field = vec![b'x'; 8];
        assert_eq!(decode_fixed_capacity(&field, 8), "xxxxxxxx");
    }

    #[test]
    fn test_fixed_capacity_invalid_utf8_is_replaced() {
        let field = [0xFF, 0xFE, b'a', 0, 0, 0];
        let text = decode_fixed_capacity(&field, 6);
        assert!(text.ends_with('a'));
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_trailing_utf16_basic() {
        assert_eq!(decode_trailing_utf16(&utf16_bytes("abc")), "abc");
        assert_eq!(decode_trailing_utf16(&[]), "");
    }

    #[test]
    fn test_trailing_utf16_odd_tail_dropped() {
        let mut bytes = utf16_bytes("ab");
        bytes.push(0x41);
        assert_eq!(decode_trailing_utf16(&bytes), "ab");
    }

    #[test]
    fn test_trailing_utf16_unpaired_surrogate_replaced() {
        // Lone high surrogate
        let bytes = 0xD800u16.to_le_bytes();
        assert_eq!(decode_trailing_utf16(&bytes), "\u{FFFD}");
    }

    proptest! {
        #[test]
        fn prop_fixed_capacity_roundtrip(text in "[a-zA-Z0-9 ._-]{0,64}") {
            let field = fixed_field(&text, 256);
            prop_assert_eq!(decode_fixed_capacity(&field, 256), text);
        }

        #[test]
        fn prop_trailing_utf16_roundtrip(text in "\\PC{0,32}") {
            let bytes = utf16_bytes(&text);
            prop_assert_eq!(decode_trailing_utf16(&bytes), text);
        }
    }
}
