//! Factory contract between the cache and the resources it manages.
//!
//! The cache never builds or compares resources itself. It asks an
//! [`EntryFactory`] to create the data/object pair for a key and to decide
//! whether an existing entry satisfies a key.
//!
//! ```text
//!   get_entry(key)
//!      │
//!      ├─ is_null_key(key)?  ──► GetEntryError::NullKey
//!      │
//!      ├─ for entry in list: is_match(key, entry)?  ──► Scope (hit)
//!      │
//!      └─ create_entry(key, cached) ──► (data, object) ──► CacheEntry ──► Scope
//! ```
//!
//! ## Example
//!
//! ```
//! use refcache::entry::CacheEntry;
//! use refcache::traits::EntryFactory;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct PenKey { color: u32, width: u8 }
//!
//! struct Pen { handle: usize }
//!
//! struct PenFactory { next_handle: usize }
//!
//! impl EntryFactory<PenKey> for PenFactory {
//!     type Data = PenKey;
//!     type Object = Pen;
//!     type Error = std::convert::Infallible;
//!
//!     fn create_entry(&mut self, key: &PenKey, _cached: bool) -> Result<(PenKey, Pen), Self::Error> {
//!         self.next_handle += 1;
//!         Ok((key.clone(), Pen { handle: self.next_handle }))
//!     }
//!
//!     fn is_match(&self, key: &PenKey, entry: &CacheEntry<PenKey, Pen>) -> bool {
//!         entry.data() == key
//!     }
//!
//!     fn is_null_key(&self, key: &PenKey) -> bool {
//!         key.width == 0
//!     }
//! }
//! ```

use crate::entry::CacheEntry;

/// Creates and matches the resources held by a
/// [`RefCountedCache`](crate::cache::RefCountedCache).
pub trait EntryFactory<K: ?Sized> {
    /// Immutable data stored with each entry, used for matching.
    type Data;
    /// The resource handed out through scopes.
    type Object;
    /// Failure raised while creating a resource.
    type Error;

    /// Builds the data and resource for `key`.
    ///
    /// `cached` is `false` when the cache is full and the entry will only
    /// live as long as the scope that receives it.
    fn create_entry(
        &mut self,
        key: &K,
        cached: bool,
    ) -> Result<(Self::Data, Self::Object), Self::Error>;

    /// Returns `true` if `entry` can serve `key`.
    fn is_match(&self, key: &K, entry: &CacheEntry<Self::Data, Self::Object>) -> bool;

    /// Returns `true` for keys that must be rejected outright, such as a zero
    /// native handle. Defaults to accepting every key.
    fn is_null_key(&self, key: &K) -> bool {
        let _ = key;
        false
    }
}
