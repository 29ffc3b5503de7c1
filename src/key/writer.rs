//! Value writer: encode, then exactly one store call.

use crate::codec;
use crate::error::{Error, Result};
use crate::logging::debug;
use crate::store::RegistryStore;
use crate::value::{Value, ValueType};

use super::{Key, check_name};

impl<S: RegistryStore + ?Sized> Key<'_, S> {
    /// Store a SZ value. The text must not contain NUL.
    pub fn set_string_value(&self, name: &str, value: &str) -> Result<()> {
        self.set_text(name, ValueType::Sz, value)
    }

    /// Store an EXPAND_SZ value. The text must not contain NUL.
    pub fn set_expand_string_value(&self, name: &str, value: &str) -> Result<()> {
        self.set_text(name, ValueType::ExpandSz, value)
    }

    /// Store a MULTI_SZ value. No element may contain NUL.
    pub fn set_strings_value<T: AsRef<str>>(&self, name: &str, values: &[T]) -> Result<()> {
        let data = codec::encode_strings(values).map_err(Error::InvalidInput)?;
        self.set_value(name, ValueType::MultiSz, &data)
    }

    pub fn set_dword_value(&self, name: &str, value: u32) -> Result<()> {
        self.set_value(name, ValueType::DWord, &codec::encode_dword(value))
    }

    pub fn set_qword_value(&self, name: &str, value: u64) -> Result<()> {
        self.set_value(name, ValueType::QWord, &codec::encode_qword(value))
    }

    pub fn set_binary_value(&self, name: &str, value: &[u8]) -> Result<()> {
        self.set_value(name, ValueType::Binary, value)
    }

    /// Store any [`Value`] with the tag it maps to.
    pub fn set(&self, name: &str, value: &Value) -> Result<()> {
        let raw = codec::encode_value(value).map_err(Error::InvalidInput)?;
        self.set_value(name, raw.value_type, &raw.data)
    }

    /// Store `data` under `name` with the given tag, as is.
    pub fn set_value(&self, name: &str, value_type: ValueType, data: &[u8]) -> Result<()> {
        check_name(name)?;
        // An empty payload goes out as no payload at all.
        let payload = (!data.is_empty()).then_some(data);
        debug!(name, %value_type, bytes = data.len(), "writing value");
        self.store
            .set_value(self.handle, name, value_type, payload)
            .map_err(|e| Error::from_store(e, name))
    }

    /// Remove the named value.
    pub fn delete_value(&self, name: &str) -> Result<()> {
        check_name(name)?;
        debug!(name, "deleting value");
        self.store
            .delete_value(self.handle, name)
            .map_err(|e| Error::from_store(e, name))
    }

    fn set_text(&self, name: &str, value_type: ValueType, value: &str) -> Result<()> {
        let data = codec::encode_string(value).map_err(Error::InvalidInput)?;
        self.set_value(name, value_type, &data)
    }
}
