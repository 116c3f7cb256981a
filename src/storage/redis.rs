use async_trait::async_trait;
use redis::{
    aio::{ConnectionLike, ConnectionManager},
    cluster::ClusterClient,
    cluster_async::ClusterConnection,
    AsyncCommands,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    error::{CacheError, CacheResult},
    pubg::{Leaderboard, PlayerEntry, Season},
    storage::{player_key, Cache, CacheTtl, LEADERBOARD_KEY, SEASON_KEY},
};

/// Redis-backed cache over a single node (`ConnectionManager`) or a cluster
/// (`ClusterConnection`). Both reconnect on their own and are cloned per
/// call, so the cache can be shared across tasks without locking.
#[derive(Clone)]
pub struct RedisCache<C = ConnectionManager> {
    conn: C,
    ttl: CacheTtl,
}

impl RedisCache<ConnectionManager> {
    /// Connect to a single node and check the connection with a PING.
    pub async fn connect(url: &str, ttl: CacheTtl) -> CacheResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        let cache = RedisCache { conn, ttl };
        cache.ping().await?;
        Ok(cache)
    }
}

impl RedisCache<ClusterConnection> {
    /// Connect through the given seed nodes. Slot redirects are followed by
    /// the cluster connection.
    pub async fn connect_cluster(nodes: Vec<String>, ttl: CacheTtl) -> CacheResult<Self> {
        let client = ClusterClient::new(nodes)?;
        let conn = client.get_async_connection().await?;
        let cache = RedisCache { conn, ttl };
        cache.ping().await?;
        Ok(cache)
    }
}

impl<C> RedisCache<C>
where
    C: ConnectionLike + Clone + Send + Sync,
{
    async fn read<T: DeserializeOwned>(&self, key: &str) -> CacheResult<T> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(key).await?;
        match payload {
            Some(payload) => Ok(serde_json::from_str(&payload)?),
            None => {
                debug!(key, "redis: cache miss");
                Err(CacheError::Miss)
            }
        }
    }
}

#[async_trait]
impl<C> Cache for RedisCache<C>
where
    C: ConnectionLike + Clone + Send + Sync + 'static,
{
    async fn get_season(&self) -> CacheResult<Season> {
        self.read(SEASON_KEY).await
    }

    async fn put_season(&self, season: &Season) -> CacheResult<()> {
        let payload = serde_json::to_string(season)?;
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(SEASON_KEY, payload, self.ttl.season.as_secs())
            .await?;
        Ok(())
    }

    async fn get_leaderboard(&self) -> CacheResult<Leaderboard> {
        self.read(LEADERBOARD_KEY).await
    }

    async fn put_leaderboard(&self, leaderboard: &Leaderboard) -> CacheResult<()> {
        let ttl_secs = self.ttl.leaderboard.as_secs();

        // MULTI/EXEC: the leaderboard and all its players land together.
        // All keys share a hash tag, so on a cluster this is a single slot.
        let mut pipe = redis::pipe();
        pipe.atomic();
        pipe.set_ex(LEADERBOARD_KEY, serde_json::to_string(leaderboard)?, ttl_secs)
            .ignore();
        for player in &leaderboard.players {
            pipe.set_ex(player_key(&player.id), serde_json::to_string(player)?, ttl_secs)
                .ignore();
        }

        let mut conn = self.conn.clone();
        let _: () = pipe.query_async(&mut conn).await?;
        debug!(players = leaderboard.len(), "redis: leaderboard written");
        Ok(())
    }

    async fn get_player(&self, player_id: &str) -> CacheResult<PlayerEntry> {
        self.read(&player_key(player_id)).await
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

// These tests need a live server: REDIS_URL (e.g. redis://127.0.0.1:6379/15)
// for the single node ones, REDIS_CLUSTER_NODES (comma separated) for the
// cluster one. They return early when the variable is unset.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::pubg::{GameMode, PlayerStats};
    use std::sync::{Mutex, MutexGuard};
    use std::time::Duration;

    // The keys are fixed, so tests sharing a server must not interleave.
    static SERVER: Mutex<()> = Mutex::new(());

    fn ttl() -> CacheTtl {
        CacheTtl {
            season: Duration::from_secs(60),
            leaderboard: Duration::from_secs(60),
        }
    }

    fn board(ids: &[&str]) -> Leaderboard {
        let players = ids.iter().enumerate().map(|(idx, id)| PlayerEntry {
            id: id.to_string(),
            name: id.to_uppercase(),
            rank: idx as u32 + 1,
            stats: PlayerStats {
                games: 20,
                wins: 3,
                ..PlayerStats::default()
            },
        });
        Leaderboard::new("lb", "pc-na", "s1", GameMode::SquadFpp, players)
    }

    async fn single_node(ttl: CacheTtl) -> Option<(MutexGuard<'static, ()>, RedisCache)> {
        let url = std::env::var("REDIS_URL").ok()?;
        let guard = SERVER.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let cache = RedisCache::connect(&url, ttl).await.unwrap();

        let mut conn = cache.conn.clone();
        let keys = vec![SEASON_KEY.to_string(), LEADERBOARD_KEY.to_string()];
        let _: () = conn.del(keys).await.unwrap();
        Some((guard, cache))
    }

    #[tokio::test]
    async fn season_round_trip_and_miss() {
        let Some((_guard, cache)) = single_node(ttl()).await else {
            return;
        };
        assert!(cache.get_season().await.unwrap_err().is_miss());

        let season = Season::new("s1", true, false);
        cache.put_season(&season).await.unwrap();
        assert_eq!(cache.get_season().await.unwrap(), season);

        let mut conn = cache.conn.clone();
        let remaining: i64 = conn.ttl(SEASON_KEY).await.unwrap();
        assert!(remaining > 0 && remaining <= 60, "ttl {remaining}");
    }

    #[tokio::test]
    async fn keys_expire_after_their_ttl() {
        let short = CacheTtl {
            season: Duration::from_secs(1),
            leaderboard: Duration::from_secs(1),
        };
        let Some((_guard, cache)) = single_node(short).await else {
            return;
        };
        cache.put_season(&Season::new("s1", true, false)).await.unwrap();
        cache.put_leaderboard(&board(&["p1"])).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(cache.get_season().await.unwrap_err().is_miss());
        assert!(cache.get_leaderboard().await.unwrap_err().is_miss());
        assert!(cache.get_player("p1").await.unwrap_err().is_miss());
    }

    #[tokio::test]
    async fn leaderboard_batch_writes_every_player() {
        let Some((_guard, cache)) = single_node(ttl()).await else {
            return;
        };
        let board = board(&["p1", "p2", "p3"]);
        cache.put_leaderboard(&board).await.unwrap();

        assert_eq!(cache.get_leaderboard().await.unwrap(), board);
        for player in &board.players {
            assert_eq!(&cache.get_player(&player.id).await.unwrap(), player);
        }
        assert!(cache.get_player("p4").await.unwrap_err().is_miss());

        let mut conn = cache.conn.clone();
        let remaining: i64 = conn.ttl(player_key("p3")).await.unwrap();
        assert!(remaining > 0 && remaining <= 60, "ttl {remaining}");
    }

    #[tokio::test]
    async fn corrupt_payload_is_a_failure_not_a_miss() {
        let Some((_guard, cache)) = single_node(ttl()).await else {
            return;
        };
        let mut conn = cache.conn.clone();
        let _: () = conn.set_ex(SEASON_KEY, "{not json", 60).await.unwrap();

        match cache.get_season().await {
            Err(CacheError::Serialization(_)) => {}
            other => panic!("unexpected result {other:?}"),
        }
        assert!(cache.ping().await.is_ok());
    }

    #[tokio::test]
    async fn cluster_accepts_the_leaderboard_batch() {
        let Ok(nodes) = std::env::var("REDIS_CLUSTER_NODES") else {
            return;
        };
        let nodes = nodes.split(',').map(|node| node.trim().to_string()).collect();
        let cache = RedisCache::connect_cluster(nodes, ttl()).await.unwrap();

        let board = board(&["c1", "c2", "c3", "c4"]);
        cache.put_leaderboard(&board).await.unwrap();
        cache.put_season(&Season::new("s1", true, false)).await.unwrap();

        assert_eq!(cache.get_leaderboard().await.unwrap(), board);
        assert_eq!(cache.get_player("c4").await.unwrap().rank, 4);
        assert_eq!(cache.get_season().await.unwrap().id, "s1");
    }
}
