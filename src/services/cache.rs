use moka::future::{Cache, CacheBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use crate::models::Profile;

/// In-process cache for store reads
///
/// Entries expire after the configured TTL and are evicted explicitly when
/// the owning user's profile or likes change. Both tiers are bounded.
#[derive(Clone)]
pub struct CacheManager {
    profiles: Cache<String, Profile>,
    matches: Cache<String, Vec<String>>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a new cache manager
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let ttl = Duration::from_secs(ttl_secs);

        Self {
            profiles: CacheBuilder::new(capacity).time_to_live(ttl).build(),
            matches: CacheBuilder::new(capacity).time_to_live(ttl).build(),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub async fn get_profile(&self, user_id: &str) -> Option<Profile> {
        let hit = self.profiles.get(user_id).await;
        tracing::trace!("Profile cache {}: {}", if hit.is_some() { "hit" } else { "miss" }, user_id);
        hit
    }

    pub async fn insert_profile(&self, profile: Profile) {
        self.profiles.insert(profile.uid.clone(), profile).await;
    }

    pub async fn invalidate_profile(&self, user_id: &str) {
        self.profiles.invalidate(user_id).await;
    }

    pub async fn get_matches(&self, user_id: &str) -> Option<Vec<String>> {
        let hit = self.matches.get(user_id).await;
        tracing::trace!("Match cache {}: {}", if hit.is_some() { "hit" } else { "miss" }, user_id);
        hit
    }

    pub async fn insert_matches(&self, user_id: &str, matches: Vec<String>) {
        self.matches.insert(user_id.to_string(), matches).await;
    }

    pub async fn invalidate_matches(&self, user_id: &str) {
        self.matches.invalidate(user_id).await;
    }

    /// Drop everything cached for a user
    pub async fn invalidate_user(&self, user_id: &str) {
        self.invalidate_profile(user_id).await;
        self.invalidate_matches(user_id).await;
        tracing::debug!("Invalidated cache entries for {}", user_id);
    }

    /// Get cache statistics
    ///
    /// Counts are approximate until pending maintenance has run.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            profiles: self.profiles.entry_count(),
            matches: self.matches.entry_count(),
            ttl_secs: self.ttl_secs,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub profiles: u64,
    pub matches: u64,
    pub ttl_secs: u64,
}
