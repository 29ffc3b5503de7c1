//! Persistent store backed by fjall.
//!
//! Layout:
//!
//! - `_meta` keyspace: `config` holds the store version, `keys/<path>` marks
//!   an existing key and holds its last write time (u64 LE)
//! - `values` keyspace: `<path>\0<name>` holds `tag (u32 LE) ++ payload`
//!
//! Value names cannot contain NUL, so the separator is unambiguous. Names
//! enumerate in byte order.

use std::path::Path;
use std::sync::RwLock;

use fjall::{Keyspace, KeyspaceCreateOptions, PersistMode};

use crate::codec::CodecError;
use crate::codec::buffer::{read_slice, read_u32_le, read_u64_le};
use crate::logging::{debug, info};
use crate::value::{RawValue, ValueType};

use super::{
    KeyHandle, KeyInfo, RegistryStore, StoreError, ValueInfo, fill_name, fill_value, unix_now,
    utf16_len,
};

const META_CONFIG_KEY: &str = "config";
const META_KEYS_PREFIX: &str = "keys/";

/// Current store version.
const STORE_VERSION: u32 = 1;

/// Size of the tag header in front of every stored payload.
const RECORD_HEADER: usize = 4;

impl From<fjall::Error> for StoreError {
    fn from(e: fjall::Error) -> Self {
        StoreError::Other(anyhow::Error::new(e))
    }
}

/// Key store persisted on disk.
pub struct HiveStore {
    db: fjall::Database,
    meta: Keyspace,
    values: Keyspace,
    handles: RwLock<Vec<String>>,
}

impl HiveStore {
    /// Open an existing store at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::other(format!(
                "Store not initialized at {}",
                path.display()
            )));
        }

        let db = fjall::Database::builder(path).open()?;
        let meta = db.keyspace("_meta", KeyspaceCreateOptions::default)?;

        let Some(config) = meta.get(META_CONFIG_KEY)? else {
            return Err(StoreError::other(format!(
                "Store not initialized at {}",
                path.display()
            )));
        };
        let version =
            read_u32_le(&config, 0).map_err(|_| StoreError::other("Invalid config format"))?;
        if version != STORE_VERSION {
            return Err(StoreError::other(format!(
                "Store version mismatch: expected {}, got {}",
                STORE_VERSION, version
            )));
        }

        let values = db.keyspace("values", KeyspaceCreateOptions::default)?;
        info!(path = %path.display(), "opened hive store");

        Ok(Self {
            db,
            meta,
            values,
            handles: RwLock::new(Vec::new()),
        })
    }

    /// Initialize a new store at the given path.
    pub fn init(path: &Path) -> Result<Self, StoreError> {
        let db = fjall::Database::builder(path).open()?;
        let meta = db.keyspace("_meta", KeyspaceCreateOptions::default)?;
        let values = db.keyspace("values", KeyspaceCreateOptions::default)?;

        meta.insert(META_CONFIG_KEY, STORE_VERSION.to_le_bytes())?;
        db.persist(PersistMode::SyncAll)?;
        info!(path = %path.display(), "initialized hive store");

        Ok(Self {
            db,
            meta,
            values,
            handles: RwLock::new(Vec::new()),
        })
    }

    /// Create the key at `path` and any missing ancestors.
    pub fn create_key(&self, path: &str) -> Result<KeyHandle, StoreError> {
        let path = normalize_path(path);
        let now = unix_now().to_le_bytes();
        let mut ancestor = String::new();
        for segment in path.split('\\') {
            if !ancestor.is_empty() {
                ancestor.push('\\');
            }
            ancestor.push_str(segment);
            let marker = key_marker(&ancestor);
            if self.meta.get(&marker)?.is_none() {
                self.meta.insert(&marker, now)?;
                debug!(key = %ancestor, "created key");
            }
        }
        self.db.persist(PersistMode::SyncAll)?;
        self.register(path)
    }

    /// Open an existing key.
    pub fn open_key(&self, path: &str) -> Result<KeyHandle, StoreError> {
        let path = normalize_path(path);
        if self.meta.get(&key_marker(path))?.is_none() {
            return Err(StoreError::NotFound);
        }
        self.register(path)
    }

    fn register(&self, path: &str) -> Result<KeyHandle, StoreError> {
        let mut handles = self
            .handles
            .write()
            .map_err(|_| StoreError::other("handle table lock poisoned"))?;
        let index = match handles.iter().position(|p| p == path) {
            Some(index) => index,
            None => {
                handles.push(path.to_string());
                handles.len() - 1
            }
        };
        Ok(KeyHandle::new(index as u64 + 1))
    }

    fn key_path(&self, handle: KeyHandle) -> Result<String, StoreError> {
        let handles = self
            .handles
            .read()
            .map_err(|_| StoreError::other("handle table lock poisoned"))?;
        handle
            .raw()
            .checked_sub(1)
            .and_then(|i| handles.get(i as usize))
            .cloned()
            .ok_or_else(|| StoreError::other(format!("invalid key handle {}", handle)))
    }

    fn value_names(&self, path: &str) -> Vec<String> {
        let prefix = values_prefix(path);
        let mut names = Vec::new();
        for kv in self.values.prefix(prefix.as_str()) {
            let Ok(key_bytes) = kv.key() else {
                continue;
            };
            let key_str = String::from_utf8_lossy(&key_bytes);
            if let Some(name) = key_str.strip_prefix(prefix.as_str()) {
                names.push(name.to_string());
            }
        }
        names
    }

    fn load(&self, path: &str, name: &str) -> Result<Option<RawValue>, StoreError> {
        let Some(stored) = self.values.get(&value_key(path, name))? else {
            return Ok(None);
        };
        decode_record(&stored).map(Some)
    }

    fn touch(&self, path: &str) -> Result<(), StoreError> {
        self.meta.insert(&key_marker(path), unix_now().to_le_bytes())?;
        Ok(())
    }
}

fn normalize_path(path: &str) -> &str {
    path.trim_matches('\\')
}

fn key_marker(path: &str) -> String {
    format!("{}{}", META_KEYS_PREFIX, path)
}

fn values_prefix(path: &str) -> String {
    format!("{}\0", path)
}

fn value_key(path: &str, name: &str) -> String {
    format!("{}\0{}", path, name)
}

fn encode_record(value_type: ValueType, data: &[u8]) -> Vec<u8> {
    let mut record = Vec::with_capacity(RECORD_HEADER + data.len());
    record.extend_from_slice(&value_type.to_raw().to_le_bytes());
    record.extend_from_slice(data);
    record
}

fn decode_record(record: &[u8]) -> Result<RawValue, StoreError> {
    let corrupt =
        |e: CodecError| StoreError::Other(anyhow::Error::new(e).context("corrupt value record"));
    let tag = read_u32_le(record, 0).map_err(corrupt)?;
    let data = read_slice(record, RECORD_HEADER, record.len().saturating_sub(RECORD_HEADER))
        .map_err(corrupt)?;
    Ok(RawValue::new(ValueType::from_raw(tag), data.to_vec()))
}

impl RegistryStore for HiveStore {
    fn query_value(
        &self,
        key: KeyHandle,
        name: &str,
        buf: &mut [u8],
    ) -> Result<ValueInfo, StoreError> {
        let path = self.key_path(key)?;
        let value = self.load(&path, name)?.ok_or(StoreError::NotFound)?;
        fill_value(&value.data, value.value_type, buf)
    }

    fn set_value(
        &self,
        key: KeyHandle,
        name: &str,
        value_type: ValueType,
        data: Option<&[u8]>,
    ) -> Result<(), StoreError> {
        let path = self.key_path(key)?;
        let record = encode_record(value_type, data.unwrap_or_default());
        self.values.insert(&value_key(&path, name), record.as_slice())?;
        self.touch(&path)?;
        self.db.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    fn delete_value(&self, key: KeyHandle, name: &str) -> Result<(), StoreError> {
        let path = self.key_path(key)?;
        let db_key = value_key(&path, name);
        if self.values.get(&db_key)?.is_none() {
            return Err(StoreError::NotFound);
        }
        self.values.remove(&db_key)?;
        self.touch(&path)?;
        self.db.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    fn enum_value_name(
        &self,
        key: KeyHandle,
        index: u32,
        buf: &mut [u16],
    ) -> Result<usize, StoreError> {
        let path = self.key_path(key)?;
        // Rescans the key's prefix on every call; a full listing is quadratic
        // in the number of values.
        let names = self.value_names(&path);
        let name = names.get(index as usize).ok_or(StoreError::NoMoreItems)?;
        fill_name(name, buf)
    }

    fn stat_key(&self, key: KeyHandle) -> Result<KeyInfo, StoreError> {
        let path = self.key_path(key)?;

        let Some(marker) = self.meta.get(&key_marker(&path))? else {
            return Err(StoreError::NotFound);
        };
        let last_write_time = read_u64_le(&marker, 0).unwrap_or(0);

        let child_prefix = format!("{}{}\\", META_KEYS_PREFIX, path);
        let mut sub_keys = Vec::new();
        for kv in self.meta.prefix(child_prefix.as_str()) {
            let Ok(key_bytes) = kv.key() else {
                continue;
            };
            let key_str = String::from_utf8_lossy(&key_bytes);
            if let Some(rest) = key_str.strip_prefix(child_prefix.as_str()) {
                if !rest.is_empty() && !rest.contains('\\') {
                    sub_keys.push(rest.to_string());
                }
            }
        }

        let names = self.value_names(&path);
        // Loads every payload of the key to find the longest one.
        let mut max_value_len = 0u32;
        for name in &names {
            if let Some(value) = self.load(&path, name)? {
                let len = u32::try_from(value.data.len()).unwrap_or(u32::MAX);
                max_value_len = max_value_len.max(len);
            }
        }

        Ok(KeyInfo {
            sub_key_count: u32::try_from(sub_keys.len()).unwrap_or(u32::MAX),
            max_sub_key_len: sub_keys.iter().map(|s| utf16_len(s)).max().unwrap_or(0),
            value_count: u32::try_from(names.len()).unwrap_or(u32::MAX),
            max_value_name_len: names.iter().map(|n| utf16_len(n)).max().unwrap_or(0),
            max_value_len,
            last_write_time,
        })
    }
}
