//! Cache for computed analytics results
//!
//! Values are stored as JSON so one cache holds every result type. Keys built
//! with [`bucketed_key`] change once per bucket, so a result is recomputed at
//! least once per bucket even before its TTL runs out.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::ttl_cache::TtlCache;
use crate::utils::logging;

pub struct ResultCache {
    entries: TtlCache<String, Value>,
}

impl ResultCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: TtlCache::new(ttl_secs),
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.entries.get(&key.to_string())?;
        match serde_json::from_value(value) {
            Ok(result) => Some(result),
            Err(e) => {
                logging::log_warning(&format!("Discarding unreadable cache entry {}: {}", key, e));
                None
            }
        }
    }

    pub fn put<T: Serialize>(&self, key: &str, result: &T) {
        match serde_json::to_value(result) {
            Ok(value) => self.entries.insert(key.to_string(), value),
            Err(e) => logging::log_warning(&format!("Not caching {}: {}", key, e)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `prefix:<bucket index>` where the index is `now` divided into `bucket_secs` slices
pub fn bucketed_key(prefix: &str, now: DateTime<Utc>, bucket_secs: u64) -> String {
    let bucket_secs = i64::try_from(bucket_secs.max(1)).unwrap_or(i64::MAX);
    format!("{}:{}", prefix, now.timestamp().div_euclid(bucket_secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Board {
        fids: Vec<u64>,
    }

    #[test]
    fn test_typed_round_trip() {
        let cache = ResultCache::new(300);
        let board = Board { fids: vec![3, 1] };
        cache.put("leaderboard:all", &board);

        assert_eq!(cache.get::<Board>("leaderboard:all"), Some(board));
        assert_eq!(cache.get::<Board>("leaderboard:day"), None);
        // Wrong shape is a miss, not an error
        assert_eq!(cache.get::<u64>("leaderboard:all"), None);
    }

    #[test]
    fn test_expired_results_do_not_accumulate() {
        let cache = ResultCache::new(0);
        for bucket in 0..1_000 {
            cache.put(&format!("stats:{}", bucket), &bucket);
        }
        assert!(cache.len() <= 1);
        assert_eq!(cache.get::<u64>("stats:999"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_bucketed_key_rotates_per_bucket() {
        let t = Utc.timestamp_opt(3_600 * 10 + 5, 0).unwrap();
        let same_bucket = Utc.timestamp_opt(3_600 * 10 + 3_599, 0).unwrap();
        let next_bucket = Utc.timestamp_opt(3_600 * 11, 0).unwrap();

        assert_eq!(bucketed_key("stats", t, 3_600), "stats:10");
        assert_eq!(bucketed_key("stats", same_bucket, 3_600), "stats:10");
        assert_eq!(bucketed_key("stats", next_bucket, 3_600), "stats:11");
    }
}
