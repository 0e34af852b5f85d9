//! Bounded least-recently-used score cache

use crate::features::FeatureVector;
use serde::Serialize;
use std::collections::HashMap;
use tracing::trace;

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedScore {
    score: f64,
    last_used: u64,
}

/// Maps feature vectors to raw ensemble scores
///
/// Recency is tracked with a monotonically increasing tick; the entry with
/// the smallest tick is evicted once `capacity` is reached. A capacity of 0
/// disables caching entirely.
#[derive(Debug)]
pub struct ScoreCache {
    entries: HashMap<FeatureVector, CachedScore>,
    capacity: usize,
    tick: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl ScoreCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.min(1024)),
            capacity,
            tick: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a score and mark it most recently used
    pub fn get(&mut self, key: &FeatureVector) -> Option<f64> {
        self.tick += 1;
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.last_used = self.tick;
                self.hits += 1;
                Some(entry.score)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store a score, evicting the least recently used entry when full
    pub fn insert(&mut self, key: FeatureVector, score: f64) {
        if self.capacity == 0 {
            return;
        }
        self.tick += 1;
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_oldest();
        }
        self.entries.insert(
            key,
            CachedScore {
                score,
                last_used: self.tick,
            },
        );
    }

    pub fn contains(&self, key: &FeatureVector) -> bool {
        self.entries.contains_key(key)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            entries: self.entries.len(),
            capacity: self.capacity,
        }
    }

    fn evict_oldest(&mut self) {
        if let Some(oldest) = self
            .entries
            .iter()
            .min_by_key(|(_, c)| c.last_used)
            .map(|(k, _)| k.clone())
        {
            self.entries.remove(&oldest);
            self.evictions += 1;
            trace!(entries = self.entries.len(), "evicted least recently used score");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(v: f64) -> FeatureVector {
        FeatureVector::new(vec![v, 1.0])
    }

    #[test]
    fn test_hit_and_miss_counting() {
        let mut cache = ScoreCache::new(4);
        assert_eq!(cache.get(&key(1.0)), None);
        cache.insert(key(1.0), 10.0);
        assert_eq!(cache.get(&key(1.0)), Some(10.0));
        assert_eq!(cache.get(&key(1.0)), Some(10.0));

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_lru_eviction_order() {
        let mut cache = ScoreCache::new(2);
        cache.insert(key(1.0), 1.0);
        cache.insert(key(2.0), 2.0);

        // touch 1 so that 2 becomes the oldest
        assert_eq!(cache.get(&key(1.0)), Some(1.0));
        cache.insert(key(3.0), 3.0);

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&key(1.0)));
        assert!(!cache.contains(&key(2.0)));
        assert!(cache.contains(&key(3.0)));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_reinsert_does_not_evict() {
        let mut cache = ScoreCache::new(2);
        cache.insert(key(1.0), 1.0);
        cache.insert(key(2.0), 2.0);
        cache.insert(key(2.0), 2.0);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_zero_capacity_never_stores() {
        let mut cache = ScoreCache::new(0);
        cache.insert(key(1.0), 1.0);
        assert!(cache.is_empty());
        assert_eq!(cache.get(&key(1.0)), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_capacity_is_respected() {
        let mut cache = ScoreCache::new(128);
        for i in 0..1000 {
            cache.insert(key(i as f64), i as f64);
            assert!(cache.len() <= 128);
        }
        assert_eq!(cache.stats().evictions, 1000 - 128);
        // most recent entries survive
        assert_eq!(cache.get(&key(999.0)), Some(999.0));
        assert_eq!(cache.get(&key(0.0)), None);
    }
}
