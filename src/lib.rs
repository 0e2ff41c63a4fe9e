//! refcache: reference-counted, size-bounded caching of expensive shared resources.
//!
//! Resources such as native handles or device objects are created through an
//! [`EntryFactory`](traits::EntryFactory), shared through RAII
//! [`Scope`](scope::Scope) guards, and kept alive while idle up to a soft limit.
//!
//! ## Module map
//!
//! - [`ds`]: slot arena and the singly linked list with its mutating cursor
//! - [`entry`]: [`CacheEntry`], one resource plus its reference count
//! - [`scope`]: [`Scope`], the guard callers hold while using a resource
//! - [`cache`]: [`RefCountedCache`], find-or-create with soft/hard limits
//! - [`builder`]: [`RefCacheBuilder`] for validated construction
//! - `metrics` (feature `metrics`): lookup and eviction counters
//!
//! ## Features
//!
//! - `metrics`: record counters and expose `metrics_snapshot()`
//! - `concurrency`: `ConcurrentRefCountedCache` behind a `parking_lot::Mutex`

pub mod builder;
pub mod cache;
pub mod ds;
pub mod entry;
pub mod error;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod scope;
pub mod traits;

pub use crate::builder::RefCacheBuilder;
#[cfg(feature = "concurrency")]
pub use crate::cache::ConcurrentRefCountedCache;
pub use crate::cache::RefCountedCache;
pub use crate::ds::{IntrusiveList, SlotArena, SlotId};
pub use crate::entry::CacheEntry;
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::RefCacheMetricsSnapshot;
pub use crate::scope::Scope;
pub use crate::traits::EntryFactory;
