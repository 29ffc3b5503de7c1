//! Value reader: fetch with buffer growth, then typed decode.

use crate::codec::{self, CodecError};
use crate::error::{Error, Result};
use crate::logging::{trace, warn};
use crate::store::{RegistryStore, StoreError, ValueInfo};
use crate::value::{RawValue, Value, ValueType};

use super::{Key, check_name};

/// Initial buffer for text and binary accessors.
const TEXT_BUFFER_SIZE: usize = 64;

/// Initial buffer for the integer accessor.
const INTEGER_BUFFER_SIZE: usize = 8;

impl<S: RegistryStore + ?Sized> Key<'_, S> {
    /// Read the named value into `buf` with a single store call.
    ///
    /// Returns the byte count and tag. When `buf` is too small this fails with
    /// [`Error::ShortBuffer`] carrying the required size. An empty `buf`
    /// probes the tag and size without transferring data.
    ///
    /// This is the low-level primitive; prefer the typed accessors.
    pub fn get_value(&self, name: &str, buf: &mut [u8]) -> Result<ValueInfo> {
        check_name(name)?;
        self.store
            .query_value(self.handle, name, buf)
            .map_err(|e| Error::from_store(e, name))
    }

    /// Read the named value's payload and tag without decoding it.
    pub fn get_raw_value(&self, name: &str) -> Result<RawValue> {
        let (data, value_type) = self.fetch(name, TEXT_BUFFER_SIZE)?;
        Ok(RawValue::new(value_type, data))
    }

    /// Read a SZ or EXPAND_SZ value.
    pub fn get_string_value(&self, name: &str) -> Result<(String, ValueType)> {
        let (data, value_type) = self.fetch(name, TEXT_BUFFER_SIZE)?;
        if !value_type.is_string() {
            return Err(Error::TypeMismatch { actual: value_type });
        }
        Ok((codec::decode_string(&data), value_type))
    }

    /// Read a MULTI_SZ value.
    pub fn get_strings_value(&self, name: &str) -> Result<(Vec<String>, ValueType)> {
        let (data, value_type) = self.fetch(name, TEXT_BUFFER_SIZE)?;
        if value_type != ValueType::MultiSz {
            return Err(Error::TypeMismatch { actual: value_type });
        }
        Ok((codec::decode_strings(&data), value_type))
    }

    /// Read a DWORD or QWORD value, widened to 64 bits.
    pub fn get_integer_value(&self, name: &str) -> Result<(u64, ValueType)> {
        let (data, value_type) = self.fetch(name, INTEGER_BUFFER_SIZE)?;
        let value = match value_type {
            ValueType::DWord => codec::decode_dword(&data).map(u64::from),
            ValueType::QWord => codec::decode_qword(&data),
            actual => return Err(Error::TypeMismatch { actual }),
        };
        let value = value.map_err(|source| malformed(value_type, source))?;
        Ok((value, value_type))
    }

    /// Read a BINARY value.
    pub fn get_binary_value(&self, name: &str) -> Result<(Vec<u8>, ValueType)> {
        let (data, value_type) = self.fetch(name, TEXT_BUFFER_SIZE)?;
        if value_type != ValueType::Binary {
            return Err(Error::TypeMismatch { actual: value_type });
        }
        Ok((data, value_type))
    }

    /// Read the named value and decode it according to its stored tag.
    pub fn get(&self, name: &str) -> Result<Value> {
        let raw = self.get_raw_value(name)?;
        let value_type = raw.value_type;
        codec::decode_value(raw).map_err(|source| malformed(value_type, source))
    }

    /// Query until the buffer holds the whole payload.
    ///
    /// The buffer is reallocated to exactly the size the store asks for, and
    /// only while that size strictly exceeds the current one; any other answer
    /// ends the loop so a misbehaving store cannot keep it spinning.
    fn fetch(&self, name: &str, initial_size: usize) -> Result<(Vec<u8>, ValueType)> {
        check_name(name)?;
        let mut buf = vec![0u8; initial_size];
        loop {
            let required = match self.store.query_value(self.handle, name, &mut buf) {
                Ok(info) if info.len <= buf.len() => {
                    buf.truncate(info.len);
                    return Ok((buf, info.value_type));
                }
                // A probe answer: the store reported a size without copying.
                Ok(info) => info.len,
                Err(StoreError::MoreData { required }) => required,
                Err(e) => return Err(Error::from_store(e, name)),
            };
            if required <= buf.len() {
                warn!(
                    name,
                    required,
                    capacity = buf.len(),
                    "store asked for a buffer that is not larger; giving up"
                );
                return Err(Error::ShortBuffer { required });
            }
            trace!(name, from = buf.len(), to = required, "growing value buffer");
            buf = vec![0u8; required];
        }
    }
}

fn malformed(value_type: ValueType, source: CodecError) -> Error {
    Error::Malformed { value_type, source }
}
