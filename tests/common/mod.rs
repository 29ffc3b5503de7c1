//! Common test utilities and fake stores.
//!
//! The fakes wrap a [`MemoryStore`] and either observe the calls made to it or
//! misbehave in one specific way.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use regkv::{
    Key, KeyHandle, KeyInfo, MemoryStore, RegistryStore, StoreError, ValueInfo, ValueType,
};

/// Key path used by most tests.
pub const TEST_KEY: &str = "Software\\RegKv\\Tests";

/// Create [`TEST_KEY`] in `store` and return a typed view of it.
pub fn test_key(store: &MemoryStore) -> anyhow::Result<Key<'_, MemoryStore>> {
    Ok(Key::new(store, store.create_key(TEST_KEY)?))
}

/// One `set_value` call as seen by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write {
    pub name: String,
    pub value_type: ValueType,
    pub data: Option<Vec<u8>>,
}

/// Counts calls and records writes, forwarding everything to a [`MemoryStore`].
///
/// `fail_enum_at` makes enumeration fail with an opaque error at that index.
#[derive(Default)]
pub struct Recorder {
    pub inner: MemoryStore,
    pub queries: Cell<usize>,
    pub enums: Cell<usize>,
    pub writes: RefCell<Vec<Write>>,
    pub fail_enum_at: Option<u32>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_enum_at(index: u32) -> Self {
        Self {
            fail_enum_at: Some(index),
            ..Self::default()
        }
    }

    /// Create [`TEST_KEY`] in the inner store and return a view through the recorder.
    pub fn key(&self) -> anyhow::Result<Key<'_, Recorder>> {
        Ok(Key::new(self, self.inner.create_key(TEST_KEY)?))
    }

    pub fn store_calls(&self) -> usize {
        self.queries.get() + self.enums.get() + self.writes.borrow().len()
    }
}

impl RegistryStore for Recorder {
    fn query_value(
        &self,
        key: KeyHandle,
        name: &str,
        buf: &mut [u8],
    ) -> Result<ValueInfo, StoreError> {
        self.queries.set(self.queries.get() + 1);
        self.inner.query_value(key, name, buf)
    }

    fn set_value(
        &self,
        key: KeyHandle,
        name: &str,
        value_type: ValueType,
        data: Option<&[u8]>,
    ) -> Result<(), StoreError> {
        self.writes.borrow_mut().push(Write {
            name: name.to_string(),
            value_type,
            data: data.map(<[u8]>::to_vec),
        });
        self.inner.set_value(key, name, value_type, data)
    }

    fn delete_value(&self, key: KeyHandle, name: &str) -> Result<(), StoreError> {
        self.inner.delete_value(key, name)
    }

    fn enum_value_name(
        &self,
        key: KeyHandle,
        index: u32,
        buf: &mut [u16],
    ) -> Result<usize, StoreError> {
        self.enums.set(self.enums.get() + 1);
        if self.fail_enum_at == Some(index) {
            return Err(StoreError::other("device went away"));
        }
        self.inner.enum_value_name(key, index, buf)
    }

    fn stat_key(&self, key: KeyHandle) -> Result<KeyInfo, StoreError> {
        self.inner.stat_key(key)
    }
}

/// A store whose every query answers "too small, need `required`".
pub struct Stuck {
    pub required: usize,
    pub value_type: ValueType,
    pub calls: Cell<usize>,
}

impl Stuck {
    pub fn new(required: usize) -> Self {
        Self {
            required,
            value_type: ValueType::Sz,
            calls: Cell::new(0),
        }
    }
}

impl RegistryStore for Stuck {
    fn query_value(&self, _: KeyHandle, _: &str, _: &mut [u8]) -> Result<ValueInfo, StoreError> {
        self.calls.set(self.calls.get() + 1);
        Err(StoreError::MoreData {
            required: self.required,
        })
    }

    fn set_value(
        &self,
        _: KeyHandle,
        _: &str,
        _: ValueType,
        _: Option<&[u8]>,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    fn delete_value(&self, _: KeyHandle, _: &str) -> Result<(), StoreError> {
        Ok(())
    }

    fn enum_value_name(&self, _: KeyHandle, _: u32, _: &mut [u16]) -> Result<usize, StoreError> {
        Err(StoreError::NoMoreItems)
    }

    fn stat_key(&self, _: KeyHandle) -> Result<KeyInfo, StoreError> {
        Ok(KeyInfo::default())
    }
}
