//! Cache collaborator: per-key TTL storage for season, leaderboard and player
//! records.
//!
//! Keys are fixed for the season (`{pubg}:current_season`) and the whole
//! leaderboard (`{pubg}:leaderboard`); player entries live under
//! `{pubg}:player:{id}`. The shared `{pubg}` hash tag keeps every key in one
//! Redis Cluster slot, so the leaderboard batch can run as one MULTI/EXEC.
//! After that batch each key ages on its own.

pub mod memory;
pub mod redis;

use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tracing::info;

use crate::{
    config::{CacheBackendKind, Settings},
    error::{CacheResult, LeaderboardResult},
    pubg::{Leaderboard, PlayerEntry, Season},
};

pub use self::memory::MemoryCache;
pub use self::redis::RedisCache;

pub const SEASON_KEY: &str = "{pubg}:current_season";
pub const LEADERBOARD_KEY: &str = "{pubg}:leaderboard";

pub fn player_key(player_id: &str) -> String {
    format!("{{pubg}}:player:{player_id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtl {
    pub season: Duration,
    pub leaderboard: Duration,
}

impl Default for CacheTtl {
    fn default() -> Self {
        CacheTtl {
            season: Duration::from_secs(24 * 60 * 60),
            leaderboard: Duration::from_secs(10 * 60),
        }
    }
}

impl CacheTtl {
    pub fn from_settings(settings: &Settings) -> Self {
        CacheTtl {
            season: settings.season_ttl(),
            leaderboard: settings.leaderboard_ttl(),
        }
    }
}

/// Reads return `CacheError::Miss` for absent or expired keys, any other
/// error is a backend failure. Every write resets the TTL of the keys it
/// touches.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get_season(&self) -> CacheResult<Season>;

    async fn put_season(&self, season: &Season) -> CacheResult<()>;

    async fn get_leaderboard(&self) -> CacheResult<Leaderboard>;

    /// Single success or failure for the leaderboard and all its players.
    async fn put_leaderboard(&self, leaderboard: &Leaderboard) -> CacheResult<()>;

    async fn get_player(&self, player_id: &str) -> CacheResult<PlayerEntry>;

    async fn ping(&self) -> CacheResult<()>;
}

/// Build the backend selected in the settings.
pub async fn connect(settings: &Settings) -> LeaderboardResult<Arc<dyn Cache>> {
    let ttl = CacheTtl::from_settings(settings);
    let cache: Arc<dyn Cache> = match settings.cache_backend {
        CacheBackendKind::Memory => {
            info!("Using in-process memory cache.");
            Arc::new(MemoryCache::new(ttl))
        }
        CacheBackendKind::Redis => {
            info!(redis_addr = %settings.redis_addr, "Connecting to Redis cache.");
            Arc::new(RedisCache::connect(&settings.redis_url(), ttl).await?)
        }
        CacheBackendKind::RedisCluster => {
            info!(redis_addr = %settings.redis_addr, "Connecting to Redis cluster cache.");
            Arc::new(RedisCache::connect_cluster(settings.redis_cluster_nodes(), ttl).await?)
        }
    };
    Ok(cache)
}
