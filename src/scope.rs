//! RAII access guard for cached resources.
//!
//! A [`Scope`] is what [`RefCountedCache::get_entry`](crate::cache::RefCountedCache::get_entry)
//! hands out. Creating one takes a reference on the entry, dropping it gives
//! the reference back. Because `Scope` is neither `Clone` nor `Copy`, every
//! increment is paired with exactly one decrement.
//!
//! Access to the resource goes through [`Scope::object`] or `Deref`; both
//! borrow from the guard, so the resource cannot be used after the guard is
//! gone.
//!
//! ## Example Usage
//!
//! ```
//! use refcache::scope::Scope;
//!
//! // wrap an object that never lived in a cache
//! let scope: Scope<(), String> = Scope::unpooled("stock brush".to_string());
//! assert_eq!(scope.len(), 11);
//! assert!(scope.data().is_none());
//! ```

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::entry::CacheEntry;

enum Inner<D, O> {
    Pooled(Arc<CacheEntry<D, O>>),
    Unpooled(O),
}

/// Guard that keeps a cache entry referenced while it is alive.
pub struct Scope<D, O> {
    inner: Inner<D, O>,
}

impl<D, O> Scope<D, O> {
    /// Takes one reference on `entry`.
    pub(crate) fn new(entry: Arc<CacheEntry<D, O>>) -> Self {
        entry.add_ref();
        Self {
            inner: Inner::Pooled(entry),
        }
    }

    /// Wraps an object that is not owned by any cache.
    ///
    /// No reference counting happens; the object is dropped with the scope.
    pub fn unpooled(object: O) -> Self {
        Self {
            inner: Inner::Unpooled(object),
        }
    }

    /// Returns the resource.
    #[inline]
    pub fn object(&self) -> &O {
        match &self.inner {
            Inner::Pooled(entry) => entry.object(),
            Inner::Unpooled(object) => object,
        }
    }

    /// Returns the entry data, or `None` for an unpooled scope.
    #[inline]
    pub fn data(&self) -> Option<&D> {
        self.entry().map(CacheEntry::data)
    }

    /// Returns the wrapped entry, or `None` for an unpooled scope.
    #[inline]
    pub fn entry(&self) -> Option<&CacheEntry<D, O>> {
        match &self.inner {
            Inner::Pooled(entry) => Some(entry),
            Inner::Unpooled(_) => None,
        }
    }

    /// Returns `true` if the scope wraps an entry that lives in the cache list.
    pub fn is_cached(&self) -> bool {
        self.entry().is_some_and(CacheEntry::is_cached)
    }

    /// Returns `true` if the scope wraps an overflow entry.
    pub fn is_overflow(&self) -> bool {
        self.entry().is_some_and(|entry| !entry.is_cached())
    }

    /// Returns `true` if both scopes reference the same cache entry.
    pub fn same_entry(&self, other: &Scope<D, O>) -> bool {
        match (&self.inner, &other.inner) {
            (Inner::Pooled(a), Inner::Pooled(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<D, O> Deref for Scope<D, O> {
    type Target = O;

    #[inline]
    fn deref(&self) -> &O {
        self.object()
    }
}

impl<D, O> AsRef<O> for Scope<D, O> {
    fn as_ref(&self) -> &O {
        self.object()
    }
}

impl<D, O> Drop for Scope<D, O> {
    fn drop(&mut self) {
        if let Inner::Pooled(entry) = &self.inner {
            let remaining = entry.remove_ref();
            if remaining == 0 && !entry.is_cached() {
                // our Arc is the last one; the entry drops with this scope
                log::trace!("releasing overflow cache entry");
            }
        }
    }
}

impl<D, O> fmt::Debug for Scope<D, O>
where
    D: fmt::Debug,
    O: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Inner::Pooled(entry) => f
                .debug_struct("Scope")
                .field("data", entry.data())
                .field("cached", &entry.is_cached())
                .field("ref_count", &entry.ref_count())
                .finish(),
            Inner::Unpooled(object) => f
                .debug_struct("Scope")
                .field("unpooled", object)
                .finish(),
        }
    }
}
