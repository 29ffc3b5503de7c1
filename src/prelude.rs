//! Convenient re-exports for common usage patterns.
//!
//! # Example
//!
//! ```
//! use regkv::prelude::*;
//!
//! let store = MemoryStore::new();
//! let key = Key::new(&store, store.create_key("Software\\Demo")?);
//! key.set_qword_value("size", 1 << 40)?;
//! assert_eq!(key.get_integer_value("size")?, (1 << 40, ValueType::QWord));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Unified error handling
pub use crate::error::{Error, Result};

// Typed access
pub use crate::key::{Key, ListStatus, ValueNames};
pub use crate::value::{RawValue, Value, ValueType};

// Stores
pub use crate::store::{KeyHandle, KeyInfo, MemoryStore, RegistryStore, StoreError};

#[cfg(feature = "hive")]
pub use crate::store::HiveStore;

// Expansion
pub use crate::expand::{expand_string, expand_string_with};
