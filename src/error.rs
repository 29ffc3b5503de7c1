//! Unified error type for the regkv library.
//!
//! Store implementations report [`StoreError`]; the typed accessors normalize
//! it into [`Error`] so callers match on one taxonomy. Buffer growth is handled
//! internally and only surfaces as [`Error::ShortBuffer`] when the store stops
//! making progress or when the low-level [`crate::Key::get_value`] is called
//! with a buffer that is too small.

use thiserror::Error;

use crate::codec::CodecError;
use crate::store::StoreError;
use crate::value::ValueType;

/// Unified error type for all regkv operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The named value does not exist.
    #[error("Value not found: {0}")]
    NotFound(String),

    /// The value exists but its tag does not match the accessor.
    #[error("Unexpected value type: {actual}")]
    TypeMismatch { actual: ValueType },

    /// The buffer cannot hold the value.
    #[error("Buffer too small: {required} bytes required")]
    ShortBuffer { required: usize },

    /// Input rejected before reaching the store.
    #[error("Invalid input: {0}")]
    InvalidInput(#[source] CodecError),

    /// A stored payload does not fit its tag.
    #[error("Malformed {value_type} payload: {source}")]
    Malformed {
        value_type: ValueType,
        #[source]
        source: CodecError,
    },

    /// Enumeration stopped by a failure; `names` holds what was read before it.
    #[error("Enumeration interrupted after {} names: {source}", .names.len())]
    Interrupted {
        names: Vec<String>,
        #[source]
        source: Box<Error>,
    },

    /// Any other store failure.
    #[error("Store error: {0}")]
    Other(#[from] anyhow::Error),
}

/// A [`Result`] type alias using the unified [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Normalize a store failure for the value called `name`.
    pub(crate) fn from_store(err: StoreError, name: &str) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound(name.to_string()),
            StoreError::MoreData { required } => Self::ShortBuffer { required },
            StoreError::NoMoreItems => Self::Other(anyhow::anyhow!(
                "unexpected end of items while accessing '{}'",
                name
            )),
            StoreError::Other(e) => Self::Other(e),
        }
    }

    /// Returns `true` if the value was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` if this is a type mismatch.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// The actual tag carried by a type mismatch.
    pub fn actual_type(&self) -> Option<ValueType> {
        match self {
            Self::TypeMismatch { actual } => Some(*actual),
            _ => None,
        }
    }
}
