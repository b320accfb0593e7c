// Time-bucketed reading cache
use crate::domain::reading::ReadingSeries;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// How many buckets per region to retain. Older entries are discarded on
/// `put` so the map stays bounded regardless of uptime.
const BUCKETS_RETAINED: i64 = 2;

/// Maps (region, time bucket) to the series fetched during that bucket.
///
/// Freshness is bucket-quantized: a lookup hits only if an entry exists for
/// the exact bucket `now` falls into. An entry, once written, is
/// authoritative for the remainder of its bucket and is never overwritten.
#[derive(Debug)]
pub struct BucketCache {
    bucket_width_secs: i64,
    entries: HashMap<(String, i64), ReadingSeries>,
}

impl BucketCache {
    pub fn new(bucket_width_secs: i64) -> Self {
        debug_assert!(bucket_width_secs > 0);
        Self {
            bucket_width_secs,
            entries: HashMap::new(),
        }
    }

    pub fn bucket_index(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp().div_euclid(self.bucket_width_secs)
    }

    pub fn get(&self, region_id: &str, now: DateTime<Utc>) -> Option<&ReadingSeries> {
        let bucket = self.bucket_index(now);
        self.entries.get(&(region_id.to_string(), bucket))
    }

    /// Store a series under the bucket of `requested_at`, the time the fetch
    /// was initiated. A slow fetch still lands in the bucket it was requested
    /// for. A no-op if that bucket already holds an entry for the region.
    pub fn put(&mut self, region_id: &str, requested_at: DateTime<Utc>, series: ReadingSeries) {
        let bucket = self.bucket_index(requested_at);
        let key = (region_id.to_string(), bucket);
        if self.entries.contains_key(&key) {
            return;
        }
        self.entries
            .retain(|(region, b), _| region.as_str() != region_id || *b > bucket - BUCKETS_RETAINED);
        self.entries.insert(key, series);
    }

    #[cfg(test)]
    fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reading::Reading;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn series(n: usize) -> ReadingSeries {
        let readings = (0..n)
            .map(|i| Reading {
                timestamp: at(i as i64),
                power_consumption: 900.0 + i as f64,
                voltage: 230.0,
                current: 4.0,
                temperature: None,
                humidity: None,
                zone_distribution: None,
                efficiency_score: None,
                per_capita_consumption: None,
                is_anomaly: false,
                is_peak_hour: None,
            })
            .collect();
        ReadingSeries::from_unordered(readings)
    }

    #[test]
    fn test_miss_before_put() {
        let cache = BucketCache::new(300);
        assert!(cache.get("Mumbai", at(0)).is_none());
    }

    #[test]
    fn test_same_bucket_is_stable() {
        let mut cache = BucketCache::new(300);
        cache.put("Mumbai", at(0), series(3));
        assert_eq!(cache.get("Mumbai", at(0)), cache.get("Mumbai", at(60)));
        assert_eq!(cache.get("Mumbai", at(299)).unwrap().len(), 3);
    }

    #[test]
    fn test_new_bucket_misses() {
        let mut cache = BucketCache::new(300);
        cache.put("Mumbai", at(0), series(3));
        assert!(cache.get("Mumbai", at(301)).is_none());
    }

    #[test]
    fn test_regions_are_independent() {
        let mut cache = BucketCache::new(300);
        cache.put("Mumbai", at(0), series(3));
        assert!(cache.get("Delhi", at(0)).is_none());
    }

    #[test]
    fn test_no_overwrite_within_bucket() {
        let mut cache = BucketCache::new(300);
        cache.put("Mumbai", at(0), series(3));
        cache.put("Mumbai", at(10), series(7));
        assert_eq!(cache.get("Mumbai", at(20)).unwrap().len(), 3);
    }

    #[test]
    fn test_slow_fetch_lands_in_requested_bucket() {
        let mut cache = BucketCache::new(300);
        // Fetch initiated at t=290, committed after the bucket rolled over.
        cache.put("Mumbai", at(290), series(3));
        assert!(cache.get("Mumbai", at(295)).is_some());
        assert!(cache.get("Mumbai", at(310)).is_none());
    }

    #[test]
    fn test_old_buckets_are_pruned_per_region() {
        let mut cache = BucketCache::new(300);
        cache.put("Mumbai", at(0), series(1));
        cache.put("Delhi", at(0), series(1));
        cache.put("Mumbai", at(300), series(2));
        cache.put("Mumbai", at(600), series(3));
        // Mumbai keeps the two most recent buckets; Delhi is untouched.
        assert!(cache.get("Mumbai", at(10)).is_none());
        assert!(cache.get("Mumbai", at(310)).is_some());
        assert!(cache.get("Delhi", at(10)).is_some());
        assert_eq!(cache.entry_count(), 3);
    }
}
