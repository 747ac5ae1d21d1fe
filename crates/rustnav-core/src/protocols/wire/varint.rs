//! Unsigned LEB128 varints.
//!
//! Each byte carries 7 payload bits, least significant group first; a set
//! high bit means another byte follows. The last byte a width allows may only
//! carry the bits that still fit, otherwise the value overflows.

use super::cursor::ByteCursor;
use super::error::{DecodeError, DecodeResult};

const MAX_BYTES_U32: usize = 5;
/// Bits of the 5th byte that cannot fit into a u32 (continuation included).
const LAST_BYTE_MASK_U32: u8 = 0xF0;

const MAX_BYTES_U64: usize = 10;
/// Bits of the 10th byte that cannot fit into a u64 (continuation included).
const LAST_BYTE_MASK_U64: u8 = 0xFE;

pub fn decode_u32(cursor: &mut ByteCursor<'_>) -> DecodeResult<u32> {
    decode(cursor, MAX_BYTES_U32, LAST_BYTE_MASK_U32, 32).map(|value| value as u32)
}

pub fn decode_u64(cursor: &mut ByteCursor<'_>) -> DecodeResult<u64> {
    decode(cursor, MAX_BYTES_U64, LAST_BYTE_MASK_U64, 64)
}

fn decode(
    cursor: &mut ByteCursor<'_>,
    max_bytes: usize,
    last_byte_mask: u8,
    bits: u32,
) -> DecodeResult<u64> {
    let last = max_bytes - 1;
    let mut value = 0u64;
    for index in 0..last {
        let byte = cursor.read_u8()?;
        value |= u64::from(byte & 0x7F) << (7 * index);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }

    // The mask covers the continuation bit, so the last byte ends the varint.
    let offset = cursor.position();
    let byte = cursor.read_u8()?;
    if byte & last_byte_mask != 0 {
        return Err(DecodeError::Overflow { offset, bits });
    }
    Ok(value | u64::from(byte) << (7 * last))
}
