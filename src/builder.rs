//! Builder for reference-counted caches.
//!
//! Collects the capacity policy (soft limit, hard limit, promotion threshold)
//! before a factory is attached, so limits can come from configuration while
//! the factory comes from the code that owns the resources.
//!
//! ## Example
//!
//! ```rust
//! use refcache::builder::RefCacheBuilder;
//! use refcache::entry::CacheEntry;
//! use refcache::traits::EntryFactory;
//!
//! struct Brushes;
//!
//! impl EntryFactory<u32> for Brushes {
//!     type Data = u32;
//!     type Object = String;
//!     type Error = std::convert::Infallible;
//!
//!     fn create_entry(&mut self, color: &u32, _cached: bool) -> Result<(u32, String), Self::Error> {
//!         Ok((*color, format!("brush #{color:06x}")))
//!     }
//!
//!     fn is_match(&self, color: &u32, entry: &CacheEntry<u32, String>) -> bool {
//!         entry.data() == color
//!     }
//! }
//!
//! let mut cache = RefCacheBuilder::new(16)
//!     .hard_limit(32)
//!     .promotion_threshold(4)
//!     .build::<u32, _>(Brushes);
//!
//! let brush = cache.get_entry(&0xff0000).unwrap();
//! assert_eq!(brush.as_str(), "brush #ff0000");
//! assert_eq!(cache.hard_limit(), 32);
//! ```

use crate::cache::{DEFAULT_PROMOTION_THRESHOLD, RefCountedCache};
use crate::error::ConfigError;
use crate::traits::EntryFactory;

/// Builder for [`RefCountedCache`] instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefCacheBuilder {
    soft_limit: usize,
    hard_limit: Option<usize>,
    promotion_threshold: usize,
}

impl RefCacheBuilder {
    /// Starts a builder with the given soft limit.
    ///
    /// The hard limit defaults to twice the soft limit.
    pub fn new(soft_limit: usize) -> Self {
        Self {
            soft_limit,
            hard_limit: None,
            promotion_threshold: DEFAULT_PROMOTION_THRESHOLD,
        }
    }

    /// Sets the number of linked entries past which new misses become overflow entries.
    pub fn hard_limit(mut self, hard_limit: usize) -> Self {
        self.hard_limit = Some(hard_limit);
        self
    }

    /// Sets the list position from which hits are moved to the head.
    ///
    /// `0` promotes every hit; `usize::MAX` disables promotion.
    pub fn promotion_threshold(mut self, threshold: usize) -> Self {
        self.promotion_threshold = threshold;
        self
    }

    /// Returns the hard limit the cache will be built with.
    pub fn effective_hard_limit(&self) -> usize {
        self.hard_limit
            .unwrap_or_else(|| self.soft_limit.saturating_mul(2))
    }

    /// Builds the cache.
    ///
    /// # Panics
    ///
    /// Panics on invalid limits; see [`try_build`](Self::try_build).
    pub fn build<K, F>(self, factory: F) -> RefCountedCache<K, F>
    where
        K: ?Sized,
        F: EntryFactory<K>,
    {
        match self.try_build(factory) {
            Ok(cache) => cache,
            Err(err) => panic!("invalid cache limits: {err}"),
        }
    }

    /// Builds the cache, returning [`ConfigError`] if `soft_limit` is zero or
    /// the hard limit is below it.
    pub fn try_build<K, F>(self, factory: F) -> Result<RefCountedCache<K, F>, ConfigError>
    where
        K: ?Sized,
        F: EntryFactory<K>,
    {
        RefCountedCache::with_config(
            factory,
            self.soft_limit,
            self.effective_hard_limit(),
            self.promotion_threshold,
        )
    }
}
