//! Typed access to registry-style key values.
//!
//! A registry stores, under each key, named values made of a type tag and a
//! byte payload. This crate turns those payloads into Rust values and back:
//! UTF-16 strings, multi-strings, 32/64-bit integers and binary blobs. It also
//! implements the grow-and-retry protocol needed to read values whose size is
//! only known after a first attempt fails.
//!
//! # Quick Start
//!
//! ```
//! use regkv::prelude::*;
//!
//! let store = MemoryStore::new();
//! let key = Key::new(&store, store.create_key("Software\\Demo")?);
//!
//! key.set_strings_value("paths", &["C:\\bin", "D:\\tools"])?;
//! key.set_dword_value("retries", 3)?;
//!
//! let (paths, _) = key.get_strings_value("paths")?;
//! assert_eq!(paths, ["C:\\bin", "D:\\tools"]);
//!
//! let err = key.get_binary_value("retries").unwrap_err();
//! assert_eq!(err.actual_type(), Some(ValueType::DWord));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! - [`key`] - Typed reader, writer and name enumeration over a key handle
//! - [`codec`] - Payload encoding and decoding
//! - [`store`] - The store interface plus in-memory and on-disk stores
//! - [`expand`] - `%NAME%` expansion for EXPAND_SZ text
//! - [`value`] - Type tags and decoded values
//!
//! # Feature Flags
//!
//! - `hive` - Enable the fjall-backed [`store::HiveStore`] (enabled by default)
//! - `logging` - Enable library-level tracing (consumers provide their own subscriber)
//! - `cli` - Enable the `regkv` command-line binary
//! - `full` - Enable all features

pub mod codec;
#[cfg(feature = "cli")]
pub mod config;
pub mod expand;
pub mod key;
mod logging;
pub mod prelude;
pub mod store;
#[cfg(feature = "cli")]
pub mod subscriber;
pub mod value;

mod error;

// Re-export the unified error type
pub use error::{Error, Result};

pub use codec::CodecError;
pub use expand::{Environment, ProcessEnvironment, expand_string, expand_string_with};
pub use key::{Key, ListStatus, ValueNames};
pub use store::{KeyHandle, KeyInfo, MemoryStore, RegistryStore, StoreError, ValueInfo};
pub use value::{RawValue, Value, ValueType};

#[cfg(feature = "hive")]
pub use store::HiveStore;
