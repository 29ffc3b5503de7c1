//! Bounds-checked little-endian helpers over byte slices.

use super::CodecError;

/// Safe buffer slice read helper.
#[inline]
pub fn read_slice(buffer: &[u8], start: usize, len: usize) -> Result<&[u8], CodecError> {
    let end = start.saturating_add(len);
    buffer.get(start..end).ok_or(CodecError::BufferTooSmall {
        needed: end,
        available: buffer.len(),
    })
}

/// Read a fixed-size array starting at `offset`.
#[inline]
pub fn read_array<const N: usize>(buffer: &[u8], offset: usize) -> Result<[u8; N], CodecError> {
    let mut out = [0u8; N];
    out.copy_from_slice(read_slice(buffer, offset, N)?);
    Ok(out)
}

/// Read a little-endian u32.
#[inline]
pub fn read_u32_le(buffer: &[u8], offset: usize) -> Result<u32, CodecError> {
    read_array(buffer, offset).map(u32::from_le_bytes)
}

/// Read a little-endian u64.
#[inline]
pub fn read_u64_le(buffer: &[u8], offset: usize) -> Result<u64, CodecError> {
    read_array(buffer, offset).map(u64::from_le_bytes)
}

/// Require `buffer` to hold exactly `expected` bytes.
#[inline]
pub fn expect_len(buffer: &[u8], expected: usize) -> Result<(), CodecError> {
    if buffer.len() == expected {
        Ok(())
    } else {
        Err(CodecError::InvalidLength {
            expected,
            actual: buffer.len(),
        })
    }
}

/// Iterate the complete little-endian 16-bit units of `buffer`.
///
/// A trailing odd byte is not part of any unit and is skipped.
pub fn le_units(buffer: &[u8]) -> impl Iterator<Item = u16> + '_ {
    buffer
        .chunks_exact(2)
        .filter_map(|pair| <[u8; 2]>::try_from(pair).ok())
        .map(u16::from_le_bytes)
}

/// Serialize 16-bit units as little-endian bytes.
pub fn units_to_le_bytes(units: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(units.len() * 2);
    for unit in units {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_integers() {
        let data = [0x78, 0x56, 0x34, 0x12, 0, 0, 0, 0];
        assert_eq!(read_u32_le(&data, 0).unwrap(), 0x1234_5678);
        assert_eq!(read_u64_le(&data, 0).unwrap(), 0x1234_5678);
        assert_eq!(
            read_u32_le(&data, 6),
            Err(CodecError::BufferTooSmall { needed: 10, available: 8 })
        );
    }

    #[test]
    fn test_le_units_skips_odd_tail() {
        let units: Vec<u16> = le_units(&[0x41, 0x00, 0x42, 0x00, 0x43]).collect();
        assert_eq!(units, vec![0x41, 0x42]);
    }

    #[test]
    fn test_units_to_le_bytes() {
        assert_eq!(units_to_le_bytes(&[0x0041, 0x1234]), vec![0x41, 0x00, 0x34, 0x12]);
    }
}
