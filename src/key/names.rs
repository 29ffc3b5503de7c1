//! Value name enumeration.

use crate::codec::utf16;
use crate::error::{Error, Result};
use crate::logging::{debug, trace};
use crate::store::{KeyInfo, RegistryStore, StoreError};

use super::Key;

/// Upper bound on the result capacity reserved up front from key statistics.
const MAX_PRESIZE: usize = 4096;

/// How an enumeration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStatus {
    /// Every name was returned.
    Complete,
    /// Stopped at the limit while more names exist.
    Truncated,
    /// The key ran out of names before the requested count was reached.
    Short { requested: usize },
}

/// Names returned by [`Key::read_value_names`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueNames {
    names: Vec<String>,
    status: ListStatus,
}

impl ValueNames {
    /// The names read, in store order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Take the names, dropping the status.
    pub fn into_names(self) -> Vec<String> {
        self.names
    }

    /// How the enumeration ended.
    pub fn status(&self) -> ListStatus {
        self.status
    }

    /// Returns `true` if more names exist past the limit.
    pub fn is_truncated(&self) -> bool {
        self.status == ListStatus::Truncated
    }

    /// Returns `true` if fewer names than requested were available.
    pub fn is_short(&self) -> bool {
        matches!(self.status, ListStatus::Short { .. })
    }

    /// Number of names read.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no names were read.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate the names by reference.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.names.iter()
    }
}

impl IntoIterator for ValueNames {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValueNames {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

impl<S: RegistryStore + ?Sized> Key<'_, S> {
    /// List the names of this key's values.
    ///
    /// With `Some(n)` for a positive `n`, at most `n` names are returned and
    /// the status tells whether the key held more ([`ListStatus::Truncated`])
    /// or fewer ([`ListStatus::Short`]). `None` and `Some(0)` list everything.
    ///
    /// A store failure mid-way yields [`Error::Interrupted`] with the names
    /// read so far.
    pub fn read_value_names(&self, limit: Option<usize>) -> Result<ValueNames> {
        let info = self.stat()?;
        self.read_value_names_with(&info, limit)
    }

    /// Like [`Key::read_value_names`], sizing buffers from `info` instead of
    /// querying the key statistics.
    pub fn read_value_names_with(
        &self,
        info: &KeyInfo,
        limit: Option<usize>,
    ) -> Result<ValueNames> {
        let limit = limit.filter(|&n| n > 0);
        let expected = (info.value_count as usize).min(limit.unwrap_or(usize::MAX));
        let mut names = Vec::with_capacity(expected.min(MAX_PRESIZE));
        // Room for the longest name plus its terminator.
        let mut buf = vec![0u16; (info.max_value_name_len as usize).saturating_add(1)];

        let mut index: u32 = 0;
        let status = loop {
            if limit == Some(names.len()) {
                // One more call to learn whether the limit cut anything off.
                // The requested names are already read, so a failure here
                // falls back to the key statistics.
                break match self.name_at(index, &mut buf) {
                    Ok(Some(_)) => ListStatus::Truncated,
                    Ok(None) => ListStatus::Complete,
                    Err(_) if info.value_count as usize > names.len() => ListStatus::Truncated,
                    Err(_) => ListStatus::Complete,
                };
            }
            match self.name_at(index, &mut buf) {
                Ok(Some(name)) => names.push(name),
                Ok(None) => {
                    break match limit {
                        Some(requested) => ListStatus::Short { requested },
                        None => ListStatus::Complete,
                    };
                }
                Err(source) => return Err(interrupted(names, source)),
            }
            index = match index.checked_add(1) {
                Some(next) => next,
                None => break ListStatus::Complete,
            };
        };

        debug!(key = %self.handle, count = names.len(), ?status, "read value names");
        Ok(ValueNames { names, status })
    }

    /// Name at `index`, or `None` past the last value.
    ///
    /// The buffer doubles on every "too small" answer and the same index is
    /// asked again.
    fn name_at(&self, index: u32, buf: &mut Vec<u16>) -> Result<Option<String>> {
        loop {
            match self.store.enum_value_name(self.handle, index, buf) {
                Ok(len) => {
                    let units = buf.get(..len).ok_or(Error::ShortBuffer {
                        required: len.saturating_add(1),
                    })?;
                    return Ok(Some(utf16::decode(units)));
                }
                Err(StoreError::MoreData { .. }) => {
                    let grown = buf.len().max(1).checked_mul(2).ok_or(Error::ShortBuffer {
                        required: usize::MAX,
                    })?;
                    trace!(index, from = buf.len(), to = grown, "growing name buffer");
                    *buf = vec![0u16; grown];
                }
                Err(StoreError::NoMoreItems) => return Ok(None),
                Err(e) => return Err(Error::from_store(e, &format!("value #{}", index))),
            }
        }
    }
}

fn interrupted(names: Vec<String>, source: Error) -> Error {
    Error::Interrupted {
        names,
        source: Box::new(source),
    }
}
