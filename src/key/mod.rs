//! Typed access to the values of one key.
//!
//! [`Key`] pairs a store with a [`KeyHandle`] and carries the three halves of
//! the typed API:
//!
//! - reading: fetch with buffer growth, then decode per accessor
//! - writing: encode, then one store call per write
//! - listing: paged enumeration of value names

mod names;
mod reader;
mod writer;

pub use names::{ListStatus, ValueNames};

use crate::codec::utf16;
use crate::error::{Error, Result};
use crate::store::{KeyHandle, KeyInfo, RegistryStore};

/// A store and an open key handle.
///
/// The handle is borrowed as a plain value; dropping a `Key` does not close
/// anything.
///
/// # Example
///
/// ```
/// use regkv::{Key, MemoryStore, ValueType};
///
/// let store = MemoryStore::new();
/// let handle = store.create_key("Software\\Demo")?;
/// let key = Key::new(&store, handle);
///
/// key.set_string_value("greeting", "hello")?;
/// assert_eq!(key.get_string_value("greeting")?, ("hello".to_string(), ValueType::Sz));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Key<'s, S: ?Sized> {
    store: &'s S,
    handle: KeyHandle,
}

impl<S: ?Sized> Clone for Key<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for Key<'_, S> {}

impl<'s, S: RegistryStore + ?Sized> Key<'s, S> {
    pub fn new(store: &'s S, handle: KeyHandle) -> Self {
        Self { store, handle }
    }

    pub fn handle(&self) -> KeyHandle {
        self.handle
    }

    pub fn store(&self) -> &'s S {
        self.store
    }

    /// Statistics for this key.
    pub fn stat(&self) -> Result<KeyInfo> {
        self.store
            .stat_key(self.handle)
            .map_err(|e| Error::from_store(e, &format!("key {}", self.handle)))
    }
}

/// Value names travel NUL-terminated on the platform side.
fn check_name(name: &str) -> Result<()> {
    utf16::check_no_nul(name).map_err(Error::InvalidInput)
}
