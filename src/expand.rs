//! Environment-variable expansion for EXPAND_SZ text.
//!
//! Expansion is delegated to an [`Environment`], which follows the same
//! size-reporting convention as the store: it fills a UTF-16 buffer and
//! reports how many units the result needs, so the caller can grow and retry.

use crate::codec::utf16;
use crate::error::{Error, Result};
use crate::logging::trace;
use crate::store::StoreError;

/// Initial expansion buffer, in UTF-16 units.
const EXPAND_BUFFER_UNITS: usize = 100;

/// Source of variable values for [`expand_string_with`].
///
/// Any `Fn(&str) -> Option<String>` is an environment that resolves
/// `%NAME%` placeholders through the closure.
pub trait Environment {
    /// Expand `src` into `dst` followed by a NUL unit.
    ///
    /// Returns the number of units the result needs, terminator included.
    /// When that exceeds `dst.len()` the contents of `dst` are unspecified.
    fn expand(&self, src: &[u16], dst: &mut [u16]) -> std::result::Result<usize, StoreError>;
}

/// Resolves placeholders from the current process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn expand(&self, src: &[u16], dst: &mut [u16]) -> std::result::Result<usize, StoreError> {
        Ok(expand_units(src, dst, |name| std::env::var(name).ok()))
    }
}

impl<F> Environment for F
where
    F: Fn(&str) -> Option<String>,
{
    fn expand(&self, src: &[u16], dst: &mut [u16]) -> std::result::Result<usize, StoreError> {
        Ok(expand_units(src, dst, self))
    }
}

/// Expand `%NAME%` placeholders in `value` from the process environment.
pub fn expand_string(value: &str) -> Result<String> {
    expand_string_with(&ProcessEnvironment, value)
}

/// Expand `value` through `env`.
///
/// Empty input is returned as is without consulting `env`; input containing
/// NUL is rejected.
pub fn expand_string_with<E: Environment + ?Sized>(env: &E, value: &str) -> Result<String> {
    if value.is_empty() {
        return Ok(String::new());
    }
    utf16::check_no_nul(value).map_err(Error::InvalidInput)?;
    let src: Vec<u16> = value.encode_utf16().collect();
    let mut buf = vec![0u16; EXPAND_BUFFER_UNITS];
    loop {
        let required = env
            .expand(&src, &mut buf)
            .map_err(|e| Error::from_store(e, value))?;
        if required <= buf.len() {
            return Ok(utf16::decode_until_nul(&buf));
        }
        trace!(from = buf.len(), to = required, "growing expansion buffer");
        buf = vec![0u16; required];
    }
}

/// Replace `%NAME%` placeholders using `lookup`.
///
/// Unknown names, `%%` and a lone `%` are kept verbatim; the closing `%` of an
/// unknown name may open the next placeholder.
pub fn expand_vars<F>(text: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    loop {
        let Some((before, after)) = rest.split_once('%') else {
            out.push_str(rest);
            return out;
        };
        out.push_str(before);
        let Some((name, tail)) = after.split_once('%') else {
            out.push('%');
            out.push_str(after);
            return out;
        };
        let value = if name.is_empty() { None } else { lookup(name) };
        match value {
            Some(value) => {
                out.push_str(&value);
                rest = tail;
            }
            None => {
                out.push('%');
                out.push_str(name);
                rest = after.get(name.len()..).unwrap_or_default();
            }
        }
    }
}

fn expand_units<F>(src: &[u16], dst: &mut [u16], lookup: F) -> usize
where
    F: Fn(&str) -> Option<String>,
{
    let expanded = expand_vars(&utf16::decode(src), lookup);
    let mut units: Vec<u16> = expanded.encode_utf16().collect();
    units.push(0);
    if let Some(slot) = dst.get_mut(..units.len()) {
        slot.copy_from_slice(&units);
    }
    units.len()
}
