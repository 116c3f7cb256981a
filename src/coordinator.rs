//! Cache-aside read path.
//!
//! Reads consult the cache first and only go to the origin on a miss (or a
//! cache failure, depending on the path). Whatever the origin returns is
//! written back on a best-effort basis: when the origin answered, a failing
//! cache write never fails the request.
//!
//! Concurrent misses may each call the origin; the last cache write wins.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::{
    client::Origin,
    error::{CacheError, Error, LeaderboardResult},
    pubg::{GameMode, Leaderboard, PlayerSummary, Season},
    storage::Cache,
};

/// What a cache error other than a miss does on the leaderboard read path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeaderboardCachePolicy {
    /// Treat it as a miss and fetch from the origin.
    #[default]
    FallThrough,
    /// Fail the request without calling the origin.
    Propagate,
}

#[derive(Clone)]
pub struct LeaderboardCoordinator {
    cache: Arc<dyn Cache>,
    origin: Arc<dyn Origin>,
    game_mode: GameMode,
    cache_policy: LeaderboardCachePolicy,
}

impl LeaderboardCoordinator {
    pub fn new(
        cache: Arc<dyn Cache>,
        origin: Arc<dyn Origin>,
        game_mode: GameMode,
        cache_policy: LeaderboardCachePolicy,
    ) -> Self {
        LeaderboardCoordinator {
            cache,
            origin,
            game_mode,
            cache_policy,
        }
    }

    /// Current season, from cache when present.
    ///
    /// Any cache read error falls through to the origin.
    pub async fn current_season(&self) -> LeaderboardResult<Season> {
        match self.cache.get_season().await {
            Ok(season) => {
                debug!(season_id = %season.id, "svc: current season served from cache");
                return Ok(season);
            }
            Err(CacheError::Miss) => {
                info!("svc: current season cache miss, fetching from PUBG API");
            }
            Err(e) => {
                warn!(error = %e, "svc: current season cache read failed, fetching from PUBG API");
            }
        }

        let season = self
            .origin
            .fetch_current_season()
            .await
            .map_err(|e| Error::origin("season lookup failed", e))
            .inspect_err(|e| error!(error = %e, "svc: could not fetch current season"))?;

        match self.cache.put_season(&season).await {
            Ok(()) => info!(season_id = %season.id, "svc: current season cached"),
            Err(e) => warn!(
                season_id = %season.id,
                error = %e,
                "svc: could not cache current season, returning fetched season"
            ),
        }

        Ok(season)
    }

    /// Leaderboard of the current season for the configured game mode.
    pub async fn current_leaderboard(&self) -> LeaderboardResult<Leaderboard> {
        let season = self.current_season().await?;

        match self.cache.get_leaderboard().await {
            // A leaderboard cached for a previous season is as good as absent.
            Ok(leaderboard) if leaderboard.is_for(&season.id, self.game_mode) => {
                debug!(season_id = %season.id, "svc: leaderboard served from cache");
                return Ok(leaderboard);
            }
            Ok(leaderboard) => {
                info!(
                    cached_season_id = %leaderboard.season_id,
                    season_id = %season.id,
                    "svc: cached leaderboard is for another season, fetching from PUBG API"
                );
            }
            Err(CacheError::Miss) => {
                info!("svc: leaderboard cache miss, fetching from PUBG API");
            }
            Err(e) => match self.cache_policy {
                LeaderboardCachePolicy::Propagate => {
                    error!(error = %e, "svc: leaderboard cache read failed");
                    return Err(e.into());
                }
                LeaderboardCachePolicy::FallThrough => {
                    warn!(error = %e, "svc: leaderboard cache read failed, fetching from PUBG API");
                }
            },
        }

        let leaderboard = self.fetch_leaderboard(&season).await?;

        match self.cache.put_leaderboard(&leaderboard).await {
            Ok(()) => info!(
                season_id = %season.id,
                players = leaderboard.len(),
                "svc: leaderboard cached"
            ),
            Err(e) => warn!(
                season_id = %season.id,
                error = %e,
                "svc: could not cache leaderboard, returning fetched leaderboard"
            ),
        }

        Ok(leaderboard)
    }

    /// Rank, games and wins of a player present in the warmed cache.
    ///
    /// A miss is `PlayerNotFound`: a single player lookup never triggers an
    /// origin call.
    pub async fn player_stats(&self, player_id: &str) -> LeaderboardResult<PlayerSummary> {
        match self.cache.get_player(player_id).await {
            Ok(entry) => {
                let summary = PlayerSummary::from(&entry);
                info!(
                    player_id,
                    rank = summary.rank,
                    games_played = summary.games_played,
                    wins = summary.wins,
                    "svc: player stats served from cache"
                );
                Ok(summary)
            }
            Err(CacheError::Miss) => {
                info!(player_id, "svc: player stats not found in cache");
                Err(Error::PlayerNotFound(player_id.to_string()))
            }
            Err(e) => {
                error!(player_id, error = %e, "svc: player stats cache read failed");
                Err(e.into())
            }
        }
    }

    /// Fetch the current season and overwrite the cached one.
    pub async fn refresh_season(&self) -> LeaderboardResult<Season> {
        let season = self
            .origin
            .fetch_current_season()
            .await
            .map_err(|e| Error::origin("season refresh failed", e))?;
        self.cache.put_season(&season).await?;
        Ok(season)
    }

    /// Fetch the current season's leaderboard and overwrite the cached one.
    pub async fn refresh_leaderboard(&self) -> LeaderboardResult<Leaderboard> {
        let season = self.current_season().await?;
        let leaderboard = self.fetch_leaderboard(&season).await?;
        self.cache.put_leaderboard(&leaderboard).await?;
        Ok(leaderboard)
    }

    async fn fetch_leaderboard(&self, season: &Season) -> LeaderboardResult<Leaderboard> {
        self.origin
            .fetch_leaderboard(&season.id, self.game_mode)
            .await
            .map_err(|e| Error::origin("leaderboard lookup failed", e))
            .inspect_err(|e| {
                error!(season_id = %season.id, error = %e, "svc: could not fetch leaderboard")
            })
    }
}
