//! UTF-16 text helpers.
//!
//! Stored text is a sequence of little-endian 16-bit units. Decoding is total:
//! unpaired surrogates become U+FFFD rather than failing.

use super::CodecError;

/// Reject text containing a NUL character.
pub fn check_no_nul(s: &str) -> Result<(), CodecError> {
    match s.find('\0') {
        Some(position) => Err(CodecError::EmbeddedNul { position }),
        None => Ok(()),
    }
}

/// Encode `s` as UTF-16 followed by a terminating NUL unit.
pub fn encode_terminated(s: &str) -> Result<Vec<u16>, CodecError> {
    check_no_nul(s)?;
    let mut units: Vec<u16> = s.encode_utf16().collect();
    units.push(0);
    Ok(units)
}

/// Decode all of `units` as text.
pub fn decode(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

/// Decode `units` up to (not including) the first NUL unit.
pub fn decode_until_nul(units: &[u16]) -> String {
    let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    decode(units.get(..end).unwrap_or_default())
}
