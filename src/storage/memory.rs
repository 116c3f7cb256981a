use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tokio::time::Instant;

use crate::{
    error::{CacheError, CacheResult},
    pubg::{Leaderboard, PlayerEntry, Season},
    storage::{player_key, Cache, CacheTtl, LEADERBOARD_KEY, SEASON_KEY},
};

#[derive(Debug, Clone)]
struct CachedEntry {
    payload: String,
    expires_at: Instant,
}

type SharedEntries = Arc<Mutex<HashMap<String, CachedEntry>>>;

/// Single-process cache. Payloads are stored as JSON so reads go through the
/// same serialization as the Redis backend.
#[derive(Clone)]
pub struct MemoryCache {
    data: SharedEntries,
    ttl: CacheTtl,
}

impl MemoryCache {
    pub fn new(ttl: CacheTtl) -> MemoryCache {
        MemoryCache {
            data: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Number of live (not yet expired) keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .map(|data| data.values().filter(|e| e.expires_at > now).count())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> CacheResult<MutexGuard<'_, HashMap<String, CachedEntry>>> {
        self.data
            .lock()
            .map_err(|_| CacheError::Backend("memory cache lock poisoned".to_string()))
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> CacheResult<T> {
        // Scoped so the lock is released before deserializing
        let payload = {
            let mut data = self.lock()?;
            match data.get(key).cloned() {
                Some(entry) if entry.expires_at > Instant::now() => entry.payload,
                Some(_) => {
                    data.remove(key);
                    return Err(CacheError::Miss);
                }
                None => return Err(CacheError::Miss),
            }
        };
        Ok(serde_json::from_str(&payload)?)
    }

    // Entries are serialized before taking the lock, so a serialization
    // failure leaves the cache untouched. Expired keys are swept on every
    // write; players that left the leaderboard are never read again.
    fn write_batch(&self, entries: Vec<(String, String)>, ttl: Duration) -> CacheResult<()> {
        let now = Instant::now();
        let expires_at = now + ttl;
        let mut data = self.lock()?;
        data.retain(|_, entry| entry.expires_at > now);
        for (key, payload) in entries {
            data.insert(key, CachedEntry { payload, expires_at });
        }
        Ok(())
    }
}

fn encode<T: Serialize>(key: String, value: &T) -> CacheResult<(String, String)> {
    Ok((key, serde_json::to_string(value)?))
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get_season(&self) -> CacheResult<Season> {
        self.read(SEASON_KEY)
    }

    async fn put_season(&self, season: &Season) -> CacheResult<()> {
        let entry = encode(SEASON_KEY.to_string(), season)?;
        self.write_batch(vec![entry], self.ttl.season)
    }

    async fn get_leaderboard(&self) -> CacheResult<Leaderboard> {
        self.read(LEADERBOARD_KEY)
    }

    async fn put_leaderboard(&self, leaderboard: &Leaderboard) -> CacheResult<()> {
        let mut entries = Vec::with_capacity(leaderboard.len() + 1);
        entries.push(encode(LEADERBOARD_KEY.to_string(), leaderboard)?);
        for player in &leaderboard.players {
            entries.push(encode(player_key(&player.id), player)?);
        }
        self.write_batch(entries, self.ttl.leaderboard)
    }

    async fn get_player(&self, player_id: &str) -> CacheResult<PlayerEntry> {
        self.read(&player_key(player_id))
    }

    async fn ping(&self) -> CacheResult<()> {
        self.lock().map(|_| ())
    }
}
