use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use super::error::ProfileApiError;
use crate::domain::models::{CastMetadata, ContentRef, Profile};
use crate::infrastructure::cache::TtlCache;

/// Source of user profiles and cast metadata
#[async_trait]
pub trait ProfileProvider: Send + Sync {
    /// Profiles for the given fids; unknown fids are absent from the map
    async fn profiles_by_fid(&self, fids: &[u64]) -> Result<HashMap<u64, Profile>, ProfileApiError>;

    /// Resolve a username to its fid
    async fn fid_for_username(&self, username: &str) -> Result<Option<u64>, ProfileApiError>;

    /// Cast text and media keyed by canonical content reference
    async fn cast_metadata(
        &self,
        hashes: &[ContentRef],
    ) -> Result<HashMap<String, CastMetadata>, ProfileApiError>;
}

/// Wraps a provider with a fixed-expiry cache
pub struct CachedProfileProvider {
    inner: Arc<dyn ProfileProvider>,
    profiles: TtlCache<u64, Profile>,
    usernames: TtlCache<String, u64>,
    casts: TtlCache<String, CastMetadata>,
}

impl CachedProfileProvider {
    pub fn new(inner: Arc<dyn ProfileProvider>, ttl_secs: u64) -> Self {
        Self {
            inner,
            profiles: TtlCache::new(ttl_secs),
            usernames: TtlCache::new(ttl_secs),
            casts: TtlCache::new(ttl_secs),
        }
    }
}

#[async_trait]
impl ProfileProvider for CachedProfileProvider {
    async fn profiles_by_fid(&self, fids: &[u64]) -> Result<HashMap<u64, Profile>, ProfileApiError> {
        let mut found = HashMap::new();
        let mut missing = Vec::new();
        for fid in fids {
            match self.profiles.get(fid) {
                Some(profile) => {
                    found.insert(*fid, profile);
                }
                None => missing.push(*fid),
            }
        }

        if !missing.is_empty() {
            for (fid, profile) in self.inner.profiles_by_fid(&missing).await? {
                self.profiles.insert(fid, profile.clone());
                found.insert(fid, profile);
            }
        }
        Ok(found)
    }

    async fn fid_for_username(&self, username: &str) -> Result<Option<u64>, ProfileApiError> {
        let key = username.to_lowercase();
        if let Some(fid) = self.usernames.get(&key) {
            return Ok(Some(fid));
        }
        let fid = self.inner.fid_for_username(username).await?;
        if let Some(fid) = fid {
            self.usernames.insert(key, fid);
        }
        Ok(fid)
    }

    async fn cast_metadata(
        &self,
        hashes: &[ContentRef],
    ) -> Result<HashMap<String, CastMetadata>, ProfileApiError> {
        let mut found = HashMap::new();
        let mut missing = Vec::new();
        for hash in hashes {
            match self.casts.get(&hash.to_string()) {
                Some(cast) => {
                    found.insert(hash.to_string(), cast);
                }
                None => missing.push(hash.clone()),
            }
        }

        if !missing.is_empty() {
            for (hash, cast) in self.inner.cast_metadata(&missing).await? {
                self.casts.insert(hash.clone(), cast.clone());
                found.insert(hash, cast);
            }
        }
        Ok(found)
    }
}
