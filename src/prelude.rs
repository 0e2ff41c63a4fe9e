pub use crate::builder::RefCacheBuilder;
#[cfg(feature = "concurrency")]
pub use crate::cache::ConcurrentRefCountedCache;
pub use crate::cache::{DEFAULT_PROMOTION_THRESHOLD, RefCountedCache};
pub use crate::entry::CacheEntry;
pub use crate::error::{ConfigError, GetEntryError};
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::MetricsSnapshotProvider;
pub use crate::scope::Scope;
pub use crate::traits::EntryFactory;
