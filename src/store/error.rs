//! Errors reported by store implementations.

use thiserror::Error;

/// Conditions a [`super::RegistryStore`] reports to its callers.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Not found")]
    NotFound,

    #[error("More data available: buffer of {required} required")]
    MoreData { required: usize },

    #[error("No more items")]
    NoMoreItems,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    /// Wrap an arbitrary message as [`StoreError::Other`].
    pub fn other(msg: impl std::fmt::Display + std::fmt::Debug + Send + Sync + 'static) -> Self {
        Self::Other(anyhow::Error::msg(msg))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
