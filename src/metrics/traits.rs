//! # Metrics Trait Hierarchy
//!
//! Recording and snapshotting are split so the cache only ever writes
//! counters, and benches/tests only ever read them.
//!
//! ```text
//!   ┌──────────────────────────────┐     ┌──────────────────────────────┐
//!   │   RefCacheMetricsRecorder    │     │  MetricsSnapshotProvider<S>  │
//!   │  get hit/miss, promotion,    │     │  (bench/test)                │
//!   │  clean, evict, create, leak  │     └──────────────────────────────┘
//!   └──────────────────────────────┘
//! ```

/// Counters written by the cache on its lookup and eviction paths.
pub trait RefCacheMetricsRecorder {
    fn record_get_call(&mut self);
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_null_key(&mut self);
    fn record_scan_step(&mut self);
    fn record_promotion(&mut self);
    fn record_clean_call(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_leak_warning(&mut self);
    fn record_cached_create(&mut self);
    fn record_overflow_create(&mut self);
    fn record_create_failure(&mut self);
    fn record_dispose(&mut self);
}

/// Snapshot provider for bench/testing.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}
