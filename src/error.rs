//! Error types for the memokit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache configuration parameters are invalid
//!   (e.g. zero capacity).
//! - [`UnhashableArgument`]: Returned when a call argument has no stable
//!   identity (e.g. a NaN float) and cannot be part of a cache key.
//! - [`MemoError`]: Returned by the memoizing facade. Wraps key construction
//!   failures, configuration failures and the wrapped operation's own error.
//!
//! ## Example Usage
//!
//! ```
//! use memokit::builder::{CacheBuilder, CachePolicy};
//! use memokit::error::ConfigError;
//!
//! let bad = CacheBuilder::new(0)
//!     .policy(CachePolicy::RecencySingle)
//!     .try_build::<u64, String>();
//! let err: ConfigError = bad.unwrap_err();
//! assert!(err.to_string().contains("capacity"));
//! ```

use thiserror::Error;

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build)
/// and [`Memoizer::new`](crate::memo::Memoizer::new). Carries a human-readable
/// description of which parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Error returned when a call argument cannot form a stable cache identity.
///
/// Produced by [`KeyBuilder::build`](crate::key::KeyBuilder::build) before any
/// store lookup or operation call happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unhashable argument at {position}: {reason}")]
pub struct UnhashableArgument {
    /// Where the argument sits in the call, e.g. `positional argument 0`.
    pub position: String,
    /// Why no identity could be formed.
    pub reason: String,
}

/// Error returned by a memoized call.
///
/// `E` is the wrapped operation's error type. It is surfaced unchanged in
/// [`MemoError::Operation`]; use [`MemoError::into_operation`] to recover it.
#[derive(Debug, Error)]
pub enum MemoError<E> {
    /// An argument has no stable identity and cannot be part of a cache key.
    #[error(transparent)]
    UnhashableArgument(#[from] UnhashableArgument),

    /// The cache configuration was rejected at construction.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// The wrapped operation failed; nothing was cached.
    #[error("operation failed: {0}")]
    Operation(#[source] E),
}

impl<E> MemoError<E> {
    /// Returns the wrapped operation's error, if this is an operation failure.
    pub fn into_operation(self) -> Option<E> {
        match self {
            MemoError::Operation(err) => Some(err),
            _ => None,
        }
    }

    /// Returns `true` for [`MemoError::UnhashableArgument`].
    pub fn is_unhashable(&self) -> bool {
        matches!(self, MemoError::UnhashableArgument(_))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
