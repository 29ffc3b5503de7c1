//! The store collaborator interface.
//!
//! The typed accessors never talk to storage directly. Everything they need is
//! expressed by [`RegistryStore`]: a single bounded read, a single write, a
//! delete, indexed name enumeration and key statistics. Opening and closing
//! keys is the store's own business; accessors only ever see a [`KeyHandle`].

mod error;
#[cfg(feature = "hive")]
mod hive;
mod memory;

pub use error::StoreError;
#[cfg(feature = "hive")]
pub use hive::HiveStore;
pub use memory::MemoryStore;

use std::fmt;

use crate::value::ValueType;

/// Opaque reference to an open key.
///
/// Handles are plain values; the accessors in this crate never open or
/// close them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyHandle(u64);

impl KeyHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Result of a successful value query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueInfo {
    /// Bytes written to the buffer, or the required size when the buffer
    /// was empty.
    pub len: usize,
    pub value_type: ValueType,
}

/// Key statistics.
///
/// Name lengths are in UTF-16 units, excluding the terminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyInfo {
    pub sub_key_count: u32,
    pub max_sub_key_len: u32,
    pub value_count: u32,
    pub max_value_name_len: u32,
    pub max_value_len: u32,
    /// Last modification time in seconds since the Unix epoch.
    pub last_write_time: u64,
}

/// A hierarchical store of typed values.
///
/// Implementations must follow the size-reporting contract below, which the
/// grow loops in [`crate::key`] rely on.
pub trait RegistryStore {
    /// Copy the named value's payload into `buf`.
    ///
    /// - If `buf` is empty, nothing is copied and the returned `len` is the
    ///   payload size (a probe).
    /// - If `buf` is non-empty but smaller than the payload, returns
    ///   [`StoreError::MoreData`] with the required size.
    /// - A missing value is [`StoreError::NotFound`].
    fn query_value(
        &self,
        key: KeyHandle,
        name: &str,
        buf: &mut [u8],
    ) -> Result<ValueInfo, StoreError>;

    /// Replace the named value's tag and payload in one operation.
    ///
    /// `None` is a zero-length payload.
    fn set_value(
        &self,
        key: KeyHandle,
        name: &str,
        value_type: ValueType,
        data: Option<&[u8]>,
    ) -> Result<(), StoreError>;

    /// Remove the named value.
    fn delete_value(&self, key: KeyHandle, name: &str) -> Result<(), StoreError>;

    /// Copy the name of the value at `index` into `buf` followed by a NUL unit
    /// and return the name length in units (terminator excluded).
    ///
    /// Returns [`StoreError::MoreData`] when `buf` cannot hold name and
    /// terminator, and [`StoreError::NoMoreItems`] past the last value.
    fn enum_value_name(
        &self,
        key: KeyHandle,
        index: u32,
        buf: &mut [u16],
    ) -> Result<usize, StoreError>;

    /// Statistics for the key.
    fn stat_key(&self, key: KeyHandle) -> Result<KeyInfo, StoreError>;
}

impl<S: RegistryStore + ?Sized> RegistryStore for &S {
    fn query_value(
        &self,
        key: KeyHandle,
        name: &str,
        buf: &mut [u8],
    ) -> Result<ValueInfo, StoreError> {
        (**self).query_value(key, name, buf)
    }

    fn set_value(
        &self,
        key: KeyHandle,
        name: &str,
        value_type: ValueType,
        data: Option<&[u8]>,
    ) -> Result<(), StoreError> {
        (**self).set_value(key, name, value_type, data)
    }

    fn delete_value(&self, key: KeyHandle, name: &str) -> Result<(), StoreError> {
        (**self).delete_value(key, name)
    }

    fn enum_value_name(
        &self,
        key: KeyHandle,
        index: u32,
        buf: &mut [u16],
    ) -> Result<usize, StoreError> {
        (**self).enum_value_name(key, index, buf)
    }

    fn stat_key(&self, key: KeyHandle) -> Result<KeyInfo, StoreError> {
        (**self).stat_key(key)
    }
}

/// Copy `data` into `buf` following the [`RegistryStore::query_value`]
/// size contract.
pub(crate) fn fill_value(
    data: &[u8],
    value_type: ValueType,
    buf: &mut [u8],
) -> Result<ValueInfo, StoreError> {
    let info = ValueInfo {
        len: data.len(),
        value_type,
    };
    if buf.is_empty() {
        return Ok(info);
    }
    match buf.get_mut(..data.len()) {
        Some(dst) => {
            dst.copy_from_slice(data);
            Ok(info)
        }
        None => Err(StoreError::MoreData {
            required: data.len(),
        }),
    }
}

/// Copy a value name into `buf` following the
/// [`RegistryStore::enum_value_name`] size contract.
pub(crate) fn fill_name(name: &str, buf: &mut [u16]) -> Result<usize, StoreError> {
    let units: Vec<u16> = name.encode_utf16().collect();
    let required = units.len() + 1;
    let dst = buf
        .get_mut(..required)
        .ok_or(StoreError::MoreData { required })?;
    let (terminator, body) = dst
        .split_last_mut()
        .ok_or(StoreError::MoreData { required })?;
    body.copy_from_slice(&units);
    *terminator = 0;
    Ok(units.len())
}

/// Current time in seconds since the Unix epoch.
pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Length of `s` in UTF-16 units.
pub(crate) fn utf16_len(s: &str) -> u32 {
    u32::try_from(s.encode_utf16().count()).unwrap_or(u32::MAX)
}
