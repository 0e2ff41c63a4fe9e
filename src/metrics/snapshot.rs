/// Point-in-time copy of the cache counters plus list gauges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefCacheMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub null_keys: u64,
    pub scan_steps: u64, // nodes inspected by lookups, hits and misses alike
    pub promotions: u64,

    pub clean_calls: u64,
    pub evicted_entries: u64,
    pub leak_warnings: u64,

    pub cached_creates: u64,
    pub overflow_creates: u64,
    pub create_failures: u64,
    pub disposals: u64,

    // gauges captured at snapshot time
    pub len: usize,
    pub soft_limit: usize,
    pub hard_limit: usize,
}

impl RefCacheMetricsSnapshot {
    /// Fraction of lookups served from the list, `0.0` before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.get_hits + self.get_misses;
        if lookups == 0 {
            0.0
        } else {
            self.get_hits as f64 / lookups as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_handles_zero_lookups() {
        assert_eq!(RefCacheMetricsSnapshot::default().hit_rate(), 0.0);
    }

    #[test]
    fn hit_rate_ignores_rejected_keys() {
        let snapshot = RefCacheMetricsSnapshot {
            get_calls: 5,
            get_hits: 3,
            get_misses: 1,
            null_keys: 1,
            ..Default::default()
        };
        assert_eq!(snapshot.hit_rate(), 0.75);
    }
}
