//! Lookup and eviction counters for [`RefCountedCache`](crate::cache::RefCountedCache).
//!
//! Compiled only with the `metrics` feature. Recording goes through
//! [`RefCacheMetricsRecorder`](traits::RefCacheMetricsRecorder); consumers read
//! a [`RefCacheMetricsSnapshot`](snapshot::RefCacheMetricsSnapshot).

pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
