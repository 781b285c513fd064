//! Byte-wise delta coding for coordinate indices.
//!
//! Each output byte is the difference to the previously emitted index.
//! Two escape codes cover gaps that do not fit in a byte:
//!
//! | byte     | meaning                                        |
//! |----------|------------------------------------------------|
//! | 0..=253  | advance by this amount and emit the index      |
//! | 254      | advance the reference by 253, emit nothing     |
//! | 255      | reset the reference to 0, emit nothing         |
//!
//! Row-major coordinate lists restart at 0 on every new row, which the
//! reset code handles without a full 16-bit value.

use crate::deflate::{decode_zlib, encode_zlib, DeflateStrategy};
use crate::error::{CodecError, Result};

/// Largest delta stored directly in a byte.
pub const MAX_DIRECT_DELTA: u16 = 253;
/// Escape code: advance reference by [`MAX_DIRECT_DELTA`].
pub const ESCAPE_ADVANCE: u8 = 254;
/// Escape code: reset reference to zero.
pub const ESCAPE_RESET: u8 = 255;

/// Delta-encode a sequence of indices.
pub fn encode_difference_u8(values: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len());
    let mut last: u16 = 0;

    for &value in values {
        if value < last {
            out.push(ESCAPE_RESET);
            last = 0;
        }

        while value - last > MAX_DIRECT_DELTA {
            out.push(ESCAPE_ADVANCE);
            last += MAX_DIRECT_DELTA;
        }

        out.push((value - last) as u8);
        last = value;
    }

    out
}

/// Decode a delta-encoded byte sequence back to indices.
///
/// Fails only if the running index leaves the 16-bit range, which cannot
/// happen for output of [`encode_difference_u8`].
pub fn decode_difference_u8(bytes: &[u8]) -> Result<Vec<u16>> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut index: u32 = 0;

    for &byte in bytes {
        match byte {
            ESCAPE_ADVANCE => {
                index += MAX_DIRECT_DELTA as u32;
            }
            ESCAPE_RESET => {
                index = 0;
            }
            delta => {
                index += delta as u32;
                let value = u16::try_from(index).map_err(|_| {
                    CodecError::corrupt(format!("delta stream overflows 16 bits at {}", index))
                })?;
                out.push(value);
            }
        }
    }

    Ok(out)
}

/// Delta-encode then deflate a coordinate axis.
pub fn encode_coordinates(values: &[u16], strategy: DeflateStrategy) -> Result<Vec<u8>> {
    encode_zlib(&encode_difference_u8(values), strategy)
}

/// Inverse of [`encode_coordinates`].
pub fn decode_coordinates(bytes: &[u8]) -> Result<Vec<u16>> {
    decode_difference_u8(&decode_zlib(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_monotonic_sequence() {
        let values = [0, 1, 5, 5, 200];
        let encoded = encode_difference_u8(&values);
        assert_eq!(encoded, vec![0, 1, 4, 0, 195]);
        assert_eq!(decode_difference_u8(&encoded).unwrap(), values);
    }

    #[test]
    fn test_large_gap_uses_advance_escape() {
        let values = [600];
        let encoded = encode_difference_u8(&values);
        // 600 = 253 + 253 + 94
        assert_eq!(encoded, vec![ESCAPE_ADVANCE, ESCAPE_ADVANCE, 94]);
        assert_eq!(decode_difference_u8(&encoded).unwrap(), values);
    }

    #[test]
    fn test_gap_of_exactly_253_is_direct() {
        assert_eq!(encode_difference_u8(&[253]), vec![253]);
        assert_eq!(encode_difference_u8(&[254]), vec![ESCAPE_ADVANCE, 1]);
    }

    #[test]
    fn test_reset_on_decrease() {
        let values = [10, 20, 3, 4];
        let encoded = encode_difference_u8(&values);
        assert_eq!(encoded, vec![10, 10, ESCAPE_RESET, 3, 1]);
        assert_eq!(decode_difference_u8(&encoded).unwrap(), values);
    }

    #[test]
    fn test_reset_followed_by_large_gap() {
        let values = [1000, 700];
        let encoded = encode_difference_u8(&values);
        assert_eq!(decode_difference_u8(&encoded).unwrap(), values);
        assert_eq!(encoded.iter().filter(|&&b| b == ESCAPE_RESET).count(), 1);
    }

    #[test]
    fn test_row_major_coordinates_roundtrip() {
        // Column index of a flattened 3 x 300 mask, restarting on every row.
        let values: Vec<u16> = (0..3).flat_map(|_| (0..300).step_by(7)).collect();
        let encoded = encode_difference_u8(&values);
        assert_eq!(decode_difference_u8(&encoded).unwrap(), values);
    }

    #[test]
    fn test_full_u16_range() {
        let values = [0, u16::MAX, 0, u16::MAX];
        let encoded = encode_difference_u8(&values);
        assert_eq!(decode_difference_u8(&encoded).unwrap(), values);
    }

    #[test]
    fn test_empty_sequence() {
        assert!(encode_difference_u8(&[]).is_empty());
        assert!(decode_difference_u8(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_decode_overflow_is_error() {
        let bytes = vec![ESCAPE_ADVANCE; 300];
        let mut bytes = bytes;
        bytes.push(0);
        assert!(matches!(
            decode_difference_u8(&bytes),
            Err(CodecError::Corrupt(_))
        ));
    }

    #[test]
    fn test_coordinates_roundtrip_through_deflate() {
        let values: Vec<u16> = (0..2000).map(|i| (i * 37 % 1440) as u16).collect();
        let encoded = encode_coordinates(&values, DeflateStrategy::Filtered).unwrap();
        assert_eq!(decode_coordinates(&encoded).unwrap(), values);
    }
}
