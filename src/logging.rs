//! Conditional logging macros for library-level tracing.
//!
//! With the `logging` feature the macros forward to `tracing`; without it they
//! expand to nothing, so the grow loops carry no logging cost.
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::logging::{trace, warn};
//!
//! trace!(name, from = buf.len(), to = required, "growing value buffer");
//! warn!(name, required, "store asked for a buffer that is not larger");
//! ```

/// Per-iteration detail of the grow loops.
#[cfg(feature = "logging")]
macro_rules! log_trace {
    ($($arg:tt)*) => { tracing::trace!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_trace {
    ($($arg:tt)*) => {};
}

/// Writes, deletes and enumeration summaries.
#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

/// Store lifecycle (init, open).
#[cfg(feature = "logging")]
macro_rules! log_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

/// A store answer that ends a loop early.
#[cfg(feature = "logging")]
macro_rules! log_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

#[allow(unused_imports)]
pub(crate) use log_debug as debug;
#[allow(unused_imports)]
pub(crate) use log_info as info;
#[allow(unused_imports)]
pub(crate) use log_trace as trace;
#[allow(unused_imports)]
pub(crate) use log_warn as warn;
