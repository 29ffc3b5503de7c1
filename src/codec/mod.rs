//! Byte-level encoding and decoding of typed values.
//!
//! Every payload layout here is dictated by the store:
//!
//! - SZ / EXPAND_SZ: UTF-16LE text followed by one NUL unit
//! - MULTI_SZ: each string followed by a NUL unit, then one more NUL unit
//! - DWORD / QWORD: 4 / 8 byte little-endian unsigned integers
//! - BINARY and every other tag: bytes as-is
//!
//! All reads go through the bounds-checked helpers in [`buffer`]; nothing here
//! reinterprets memory in place.

pub(crate) mod buffer;
mod error;
pub(crate) mod utf16;

pub use error::CodecError;

use crate::value::{RawValue, Value, ValueType};

use buffer::{expect_len, le_units, read_u32_le, read_u64_le, units_to_le_bytes};

/// Decode a SZ / EXPAND_SZ payload.
///
/// An empty payload is the empty string. Decoding stops at the first NUL unit
/// or at the end of the payload, so a missing terminator is tolerated.
pub fn decode_string(data: &[u8]) -> String {
    if data.is_empty() {
        return String::new();
    }
    let units: Vec<u16> = le_units(data).collect();
    utf16::decode_until_nul(&units)
}

/// Decode a MULTI_SZ payload.
///
/// The final unit is dropped as the list terminator and the rest is split on
/// NUL; only NUL-terminated runs become entries. Payloads shorter than one
/// unit decode to an empty list.
pub fn decode_strings(data: &[u8]) -> Vec<String> {
    let units: Vec<u16> = le_units(data).collect();
    let Some((_, body)) = units.split_last() else {
        return Vec::new();
    };
    let terminated = body.iter().filter(|&&u| u == 0).count();
    body.split(|&u| u == 0)
        .take(terminated)
        .map(utf16::decode)
        .collect()
}

/// Decode a DWORD payload (exactly 4 bytes).
pub fn decode_dword(data: &[u8]) -> Result<u32, CodecError> {
    expect_len(data, 4)?;
    read_u32_le(data, 0)
}

/// Decode a QWORD payload (exactly 8 bytes).
pub fn decode_qword(data: &[u8]) -> Result<u64, CodecError> {
    expect_len(data, 8)?;
    read_u64_le(data, 0)
}

/// Encode text as a NUL-terminated UTF-16LE payload.
pub fn encode_string(s: &str) -> Result<Vec<u8>, CodecError> {
    Ok(units_to_le_bytes(&utf16::encode_terminated(s)?))
}

/// Encode a list of strings as a MULTI_SZ payload.
///
/// The empty list encodes to a single NUL unit.
pub fn encode_strings<S: AsRef<str>>(list: &[S]) -> Result<Vec<u8>, CodecError> {
    let mut units = Vec::new();
    for s in list {
        units.extend(utf16::encode_terminated(s.as_ref())?);
    }
    units.push(0);
    Ok(units_to_le_bytes(&units))
}

pub fn encode_dword(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

pub fn encode_qword(value: u64) -> [u8; 8] {
    value.to_le_bytes()
}

/// Decode a raw payload according to its own tag.
pub fn decode_value(raw: RawValue) -> Result<Value, CodecError> {
    let RawValue { value_type, data } = raw;
    Ok(match value_type {
        ValueType::Sz => Value::String(decode_string(&data)),
        ValueType::ExpandSz => Value::ExpandString(decode_string(&data)),
        ValueType::MultiSz => Value::MultiString(decode_strings(&data)),
        ValueType::DWord => Value::DWord(decode_dword(&data)?),
        ValueType::QWord => Value::QWord(decode_qword(&data)?),
        ValueType::Binary => Value::Binary(data),
        _ => Value::Raw(RawValue::new(value_type, data)),
    })
}

/// Encode a value into the tag and payload the store expects.
pub fn encode_value(value: &Value) -> Result<RawValue, CodecError> {
    let data = match value {
        Value::String(s) | Value::ExpandString(s) => encode_string(s)?,
        Value::MultiString(list) => encode_strings(list)?,
        Value::DWord(v) => encode_dword(*v).to_vec(),
        Value::QWord(v) => encode_qword(*v).to_vec(),
        Value::Binary(bytes) => bytes.clone(),
        Value::Raw(raw) => raw.data.clone(),
    };
    Ok(RawValue::new(value.value_type(), data))
}
