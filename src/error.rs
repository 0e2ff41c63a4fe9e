//! Error types for the refcache library.
//!
//! ## Key Components
//!
//! - [`GetEntryError`]: Returned by [`RefCountedCache::get_entry`](crate::cache::RefCountedCache::get_entry)
//!   when a key is rejected, the cache was disposed, or the factory failed.
//! - [`ConfigError`]: Returned when soft/hard limits are invalid.
//! - [`CursorError`]: Returned when a list cursor mutation is issued out of order.
//! - [`InvariantError`]: Returned by `check_invariants` when internal
//!   bookkeeping is inconsistent.
//!
//! ## Example Usage
//!
//! ```
//! use refcache::builder::RefCacheBuilder;
//! use refcache::error::ConfigError;
//! # use refcache::entry::CacheEntry;
//! # use refcache::traits::EntryFactory;
//! # struct Brushes;
//! # impl EntryFactory<u32> for Brushes {
//! #     type Data = u32;
//! #     type Object = String;
//! #     type Error = std::convert::Infallible;
//! #     fn create_entry(&mut self, key: &u32, _cached: bool) -> Result<(u32, String), Self::Error> {
//! #         Ok((*key, format!("brush-{key}")))
//! #     }
//! #     fn is_match(&self, key: &u32, entry: &CacheEntry<u32, String>) -> bool {
//! #         entry.data() == key
//! #     }
//! # }
//!
//! // hard limit below soft limit is caught without panicking
//! let err: ConfigError = RefCacheBuilder::new(8)
//!     .hard_limit(4)
//!     .try_build::<u32, _>(Brushes)
//!     .unwrap_err();
//! assert!(err.to_string().contains("hard_limit"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by [`RefCountedCache::check_invariants`](crate::cache::RefCountedCache::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache limits are invalid.
///
/// Produced by [`RefCountedCache::try_new`](crate::cache::RefCountedCache::try_new)
/// and [`RefCacheBuilder::try_build`](crate::builder::RefCacheBuilder::try_build).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// CursorError
// ---------------------------------------------------------------------------

/// Misuse of a [`CursorMut`](crate::ds::intrusive_list::CursorMut) mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorError {
    /// `move_next` has not returned `true` yet.
    NotStarted,
    /// The current node was already removed or relocated; call `move_next` first.
    Vacated,
    /// Traversal already ran past the tail.
    Exhausted,
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorError::NotStarted => f.write_str("cursor is not positioned on a node"),
            CursorError::Vacated => {
                f.write_str("current node was already removed or relocated")
            },
            CursorError::Exhausted => f.write_str("cursor ran past the end of the list"),
        }
    }
}

impl std::error::Error for CursorError {}

// ---------------------------------------------------------------------------
// GetEntryError
// ---------------------------------------------------------------------------

/// Error returned by a cache lookup.
///
/// `E` is the factory's own error type; it is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetEntryError<E> {
    /// The factory classified the key as null.
    NullKey,
    /// The cache was disposed and no longer hands out entries.
    Disposed,
    /// The factory failed to create a resource.
    Create(E),
}

impl<E> GetEntryError<E> {
    /// Returns the factory error, if that is what this is.
    pub fn into_create_error(self) -> Option<E> {
        match self {
            GetEntryError::Create(err) => Some(err),
            _ => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for GetEntryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GetEntryError::NullKey => f.write_str("key must not be null"),
            GetEntryError::Disposed => f.write_str("cache has been disposed"),
            GetEntryError::Create(err) => write!(f, "failed to create cache entry: {err}"),
        }
    }
}

impl<E> std::error::Error for GetEntryError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GetEntryError::Create(err) => Some(err),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
