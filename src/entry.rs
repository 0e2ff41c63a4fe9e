//! Reference-counted cache entries.
//!
//! A [`CacheEntry`] pairs one resource object with the immutable data it was
//! built from and counts the [`Scope`](crate::scope::Scope) guards that
//! currently borrow it.
//!
//! ## Lifecycle
//!
//! ```text
//!   created by EntryFactory ──► cached = true  ──► linked into the cache list
//!                          └──► cached = false ──► owned only by its scopes
//!
//!   ref_count: 0 ──add_ref──► 1 ──add_ref──► 2 ──remove_ref──► 1 ──remove_ref──► 0
//!
//!   cached   at 0: stays linked, reusable, evictable by clean()
//!   overflow at 0: last Arc goes away with the scope, object and data drop
//! ```
//!
//! Disposal is `Drop`. The cache and the scopes share the entry through
//! `Arc`, so the object and data are dropped exactly once, when the final owner
//! lets go. Cleaning only unlinks entries whose count is zero, which means the
//! list held the final `Arc`.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One cached resource plus its sharing state.
///
/// # Type Parameters
///
/// - `D`: immutable data used to match lookups and to build the object
/// - `O`: the resource handed out to callers
pub struct CacheEntry<D, O> {
    data: D,
    object: O,
    cached: bool,
    ref_count: AtomicUsize,
}

impl<D, O> CacheEntry<D, O> {
    pub(crate) fn new(data: D, object: O, cached: bool) -> Self {
        Self {
            data,
            object,
            cached,
            ref_count: AtomicUsize::new(0),
        }
    }

    /// Returns the data the entry was created from.
    #[inline]
    pub fn data(&self) -> &D {
        &self.data
    }

    /// Returns the shared resource.
    ///
    /// Only reachable through a live scope or while the cache holds the entry,
    /// so the borrow can never outlive the resource.
    #[inline]
    pub fn object(&self) -> &O {
        &self.object
    }

    /// Returns `true` if the entry is linked into a cache list, `false` for
    /// overflow entries.
    #[inline]
    pub fn is_cached(&self) -> bool {
        self.cached
    }

    /// Returns the number of live scopes on this entry.
    #[inline]
    pub fn ref_count(&self) -> usize {
        self.ref_count.load(Ordering::Acquire)
    }

    /// Returns `true` if any scope currently references the entry.
    #[inline]
    pub fn is_referenced(&self) -> bool {
        self.ref_count() > 0
    }

    #[inline]
    pub(crate) fn add_ref(&self) {
        self.ref_count.fetch_add(1, Ordering::AcqRel);
    }

    /// Drops one reference and returns the remaining count.
    ///
    /// Releasing an entry that has no references is a caller bug: it panics in
    /// debug builds and leaves the count at zero otherwise.
    pub(crate) fn remove_ref(&self) -> usize {
        let released = self
            .ref_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                count.checked_sub(1)
            });
        match released {
            Ok(previous) => previous - 1,
            Err(_) => {
                debug_assert!(false, "cache entry released more often than acquired");
                0
            },
        }
    }
}

impl<D, O> fmt::Debug for CacheEntry<D, O>
where
    D: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("data", &self.data)
            .field("cached", &self.cached)
            .field("ref_count", &self.ref_count())
            .finish_non_exhaustive()
    }
}
