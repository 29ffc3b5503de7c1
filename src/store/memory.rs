//! In-process store.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::value::{RawValue, ValueType};

use super::{
    KeyHandle, KeyInfo, RegistryStore, StoreError, ValueInfo, fill_name, fill_value, unix_now,
    utf16_len,
};

/// A store that keeps every key in memory.
///
/// Keys are addressed by backslash-separated paths. Value names enumerate in
/// insertion order; overwriting a value keeps its position.
#[derive(Debug, Default)]
pub struct MemoryStore {
    keys: RwLock<Vec<MemoryKey>>,
}

#[derive(Debug)]
struct MemoryKey {
    path: String,
    values: Vec<(String, RawValue)>,
    last_write_time: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the key at `path`, or return the handle of the existing one.
    pub fn create_key(&self, path: &str) -> Result<KeyHandle, StoreError> {
        let path = normalize_path(path);
        let mut keys = self.write()?;
        if let Some(index) = keys.iter().position(|k| k.path == path) {
            return Ok(handle_for(index));
        }
        keys.push(MemoryKey {
            path: path.to_string(),
            values: Vec::new(),
            last_write_time: unix_now(),
        });
        Ok(handle_for(keys.len() - 1))
    }

    /// Open an existing key.
    pub fn open_key(&self, path: &str) -> Result<KeyHandle, StoreError> {
        let path = normalize_path(path);
        self.read()?
            .iter()
            .position(|k| k.path == path)
            .map(handle_for)
            .ok_or(StoreError::NotFound)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<MemoryKey>>, StoreError> {
        self.keys
            .read()
            .map_err(|_| StoreError::other("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<MemoryKey>>, StoreError> {
        self.keys
            .write()
            .map_err(|_| StoreError::other("memory store lock poisoned"))
    }
}

fn normalize_path(path: &str) -> &str {
    path.trim_matches('\\')
}

fn handle_for(index: usize) -> KeyHandle {
    KeyHandle::new(index as u64 + 1)
}

fn lookup(keys: &[MemoryKey], handle: KeyHandle) -> Result<&MemoryKey, StoreError> {
    handle
        .raw()
        .checked_sub(1)
        .and_then(|i| keys.get(i as usize))
        .ok_or_else(|| StoreError::other(format!("invalid key handle {}", handle)))
}

fn lookup_mut(keys: &mut [MemoryKey], handle: KeyHandle) -> Result<&mut MemoryKey, StoreError> {
    handle
        .raw()
        .checked_sub(1)
        .and_then(|i| keys.get_mut(i as usize))
        .ok_or_else(|| StoreError::other(format!("invalid key handle {}", handle)))
}

impl RegistryStore for MemoryStore {
    fn query_value(
        &self,
        key: KeyHandle,
        name: &str,
        buf: &mut [u8],
    ) -> Result<ValueInfo, StoreError> {
        let keys = self.read()?;
        let (_, value) = lookup(&keys, key)?
            .values
            .iter()
            .find(|(n, _)| n == name)
            .ok_or(StoreError::NotFound)?;
        fill_value(&value.data, value.value_type, buf)
    }

    fn set_value(
        &self,
        key: KeyHandle,
        name: &str,
        value_type: ValueType,
        data: Option<&[u8]>,
    ) -> Result<(), StoreError> {
        let mut keys = self.write()?;
        let entry = lookup_mut(&mut keys, key)?;
        let value = RawValue::new(value_type, data.map(<[u8]>::to_vec).unwrap_or_default());
        match entry.values.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => entry.values.push((name.to_string(), value)),
        }
        entry.last_write_time = unix_now();
        Ok(())
    }

    fn delete_value(&self, key: KeyHandle, name: &str) -> Result<(), StoreError> {
        let mut keys = self.write()?;
        let entry = lookup_mut(&mut keys, key)?;
        let index = entry
            .values
            .iter()
            .position(|(n, _)| n == name)
            .ok_or(StoreError::NotFound)?;
        entry.values.remove(index);
        entry.last_write_time = unix_now();
        Ok(())
    }

    fn enum_value_name(
        &self,
        key: KeyHandle,
        index: u32,
        buf: &mut [u16],
    ) -> Result<usize, StoreError> {
        let keys = self.read()?;
        let (name, _) = lookup(&keys, key)?
            .values
            .get(index as usize)
            .ok_or(StoreError::NoMoreItems)?;
        fill_name(name, buf)
    }

    fn stat_key(&self, key: KeyHandle) -> Result<KeyInfo, StoreError> {
        let keys = self.read()?;
        let entry = lookup(&keys, key)?;

        let prefix = format!("{}\\", entry.path);
        let sub_keys: Vec<&str> = keys
            .iter()
            .filter_map(|k| k.path.strip_prefix(&prefix))
            .filter(|rest| !rest.is_empty() && !rest.contains('\\'))
            .collect();

        Ok(KeyInfo {
            sub_key_count: u32::try_from(sub_keys.len()).unwrap_or(u32::MAX),
            max_sub_key_len: sub_keys.iter().map(|s| utf16_len(s)).max().unwrap_or(0),
            value_count: u32::try_from(entry.values.len()).unwrap_or(u32::MAX),
            max_value_name_len: entry
                .values
                .iter()
                .map(|(n, _)| utf16_len(n))
                .max()
                .unwrap_or(0),
            max_value_len: entry
                .values
                .iter()
                .map(|(_, v)| u32::try_from(v.data.len()).unwrap_or(u32::MAX))
                .max()
                .unwrap_or(0),
            last_write_time: entry.last_write_time,
        })
    }
}
