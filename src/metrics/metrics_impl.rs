use crate::metrics::snapshot::RefCacheMetricsSnapshot;
use crate::metrics::traits::RefCacheMetricsRecorder;

/// Plain counters owned by the cache; mutated under `&mut self` only.
#[derive(Debug, Default, Clone)]
pub struct RefCacheMetrics {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub null_keys: u64,
    pub scan_steps: u64,
    pub promotions: u64,
    pub clean_calls: u64,
    pub evicted_entries: u64,
    pub leak_warnings: u64,
    pub cached_creates: u64,
    pub overflow_creates: u64,
    pub create_failures: u64,
    pub disposals: u64,
}

impl RefCacheMetrics {
    /// Copies the counters and attaches the supplied gauges.
    pub fn snapshot(&self, len: usize, soft_limit: usize, hard_limit: usize) -> RefCacheMetricsSnapshot {
        RefCacheMetricsSnapshot {
            get_calls: self.get_calls,
            get_hits: self.get_hits,
            get_misses: self.get_misses,
            null_keys: self.null_keys,
            scan_steps: self.scan_steps,
            promotions: self.promotions,
            clean_calls: self.clean_calls,
            evicted_entries: self.evicted_entries,
            leak_warnings: self.leak_warnings,
            cached_creates: self.cached_creates,
            overflow_creates: self.overflow_creates,
            create_failures: self.create_failures,
            disposals: self.disposals,
            len,
            soft_limit,
            hard_limit,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl RefCacheMetricsRecorder for RefCacheMetrics {
    fn record_get_call(&mut self) {
        self.get_calls += 1;
    }

    fn record_get_hit(&mut self) {
        self.get_hits += 1;
    }

    fn record_get_miss(&mut self) {
        self.get_misses += 1;
    }

    fn record_null_key(&mut self) {
        self.null_keys += 1;
    }

    fn record_scan_step(&mut self) {
        self.scan_steps += 1;
    }

    fn record_promotion(&mut self) {
        self.promotions += 1;
    }

    fn record_clean_call(&mut self) {
        self.clean_calls += 1;
    }

    fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }

    fn record_leak_warning(&mut self) {
        self.leak_warnings += 1;
    }

    fn record_cached_create(&mut self) {
        self.cached_creates += 1;
    }

    fn record_overflow_create(&mut self) {
        self.overflow_creates += 1;
    }

    fn record_create_failure(&mut self) {
        self.create_failures += 1;
    }

    fn record_dispose(&mut self) {
        self.disposals += 1;
    }
}
