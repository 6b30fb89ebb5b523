//! Cache statistics tracking

/// Counters kept by a strategy
///
/// Strategies are single-owner, so these are plain integers updated through
/// `&mut`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    hits: u64,
    misses: u64,
    inserts: u64,
    evictions: u64,
}

impl CacheStats {
    /// Create zeroed stats
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_insert(&mut self) {
        self.inserts += 1;
    }

    pub(crate) fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    /// Lookups that found a value
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that found nothing
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Values written
    pub fn inserts(&self) -> u64 {
        self.inserts
    }

    /// Entries removed by eviction passes
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Share of lookups that hit, 0.0 when nothing was looked up
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Zero every counter
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_basic() {
        let mut stats = CacheStats::new();

        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        stats.record_evictions(3);

        assert_eq!(stats.hits(), 2);
        assert_eq!(stats.misses(), 1);
        assert_eq!(stats.evictions(), 3);
        assert_eq!(stats.hit_ratio(), 2.0 / 3.0);
    }

    #[test]
    fn test_stats_reset() {
        let mut stats = CacheStats::new();

        stats.record_insert();
        stats.record_miss();
        stats.reset();

        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.hit_ratio(), 0.0);
    }
}
