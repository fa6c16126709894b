//! Thread-safe in-memory map whose entries expire after a fixed time

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

/// Ten years; keeps expiry arithmetic in range
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 3600;

struct Entry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Utc::now())
    }

    /// Value for `key` if it has not expired at `now`; an expired entry is removed
    pub fn get_at(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        {
            let cache = self.entries.read().ok()?;
            match cache.get(key) {
                Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        if let Ok(mut cache) = self.entries.write() {
            if cache.get(key).map_or(false, |entry| entry.expires_at <= now) {
                cache.remove(key);
            }
        }
        None
    }

    pub fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Utc::now());
    }

    /// Insert `value`, dropping every entry already expired at `now`
    pub fn insert_at(&self, key: K, value: V, now: DateTime<Utc>) {
        if let Ok(mut cache) = self.entries.write() {
            cache.retain(|_, entry| entry.expires_at > now);
            cache.insert(
                key,
                Entry {
                    value,
                    expires_at: now + self.ttl,
                },
            );
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.entries.write() {
            cache.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entries_expire_after_ttl() {
        let cache: TtlCache<u64, String> = TtlCache::new(60);
        let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        cache.insert_at(1, "alice".to_string(), t0);
        assert_eq!(cache.get_at(&1, t0 + Duration::seconds(59)), Some("alice".to_string()));
        assert_eq!(cache.get_at(&1, t0 + Duration::seconds(60)), None);
        assert_eq!(cache.get_at(&2, t0), None);
    }

    #[test]
    fn test_expired_entry_is_removed_on_read() {
        let cache: TtlCache<u64, String> = TtlCache::new(60);
        let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        cache.insert_at(1, "alice".to_string(), t0);
        assert_eq!(cache.get_at(&1, t0 + Duration::seconds(61)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_drops_expired_entries() {
        let cache: TtlCache<u64, u64> = TtlCache::new(60);
        let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        for fid in 0..1_000 {
            cache.insert_at(fid, fid, t0 + Duration::seconds(fid as i64 * 60));
        }
        // Each insert lands after the previous entry's expiry
        assert_eq!(cache.len(), 1);

        cache.insert_at(5_000, 1, t0 + Duration::seconds(1_000 * 60));
        cache.insert_at(5_001, 2, t0 + Duration::seconds(1_000 * 60 + 30));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_at(&5_000, t0 + Duration::seconds(1_000 * 60 + 60)), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_empties_cache() {
        let cache: TtlCache<&str, u32> = TtlCache::new(60);
        cache.insert("a", 1);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
