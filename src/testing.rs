//! Test doubles for the cache and origin collaborators.

use async_trait::async_trait;
use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use crate::{
    client::Origin,
    error::{CacheError, CacheResult, OriginError, OriginResult},
    pubg::{GameMode, Leaderboard, PlayerEntry, PlayerStats, Season},
    storage::{Cache, MemoryCache},
};

/// Leaderboard with p1 (rank 1, 10 games, 2 wins) and p3 (rank 2).
pub(crate) fn sample_leaderboard(season_id: &str) -> Leaderboard {
    let players = vec![
        PlayerEntry {
            id: "p3".to_string(),
            name: "runner-up".to_string(),
            rank: 2,
            stats: PlayerStats {
                games: 12,
                wins: 1,
                rank_points: 3900.0,
                ..PlayerStats::default()
            },
        },
        PlayerEntry {
            id: "p1".to_string(),
            name: "winner".to_string(),
            rank: 1,
            stats: PlayerStats {
                games: 10,
                wins: 2,
                rank_points: 4200.0,
                tier: "Master".to_string(),
                ..PlayerStats::default()
            },
        },
    ];
    Leaderboard::new("lb-1", "pc-na", season_id, GameMode::SquadFpp, players)
}

pub(crate) struct FakeOrigin {
    seasons: Mutex<Vec<Season>>,
    delay: Duration,
    pub season_calls: AtomicUsize,
    pub leaderboard_calls: AtomicUsize,
    pub fail_seasons: AtomicBool,
    pub fail_leaderboard: AtomicBool,
}

impl FakeOrigin {
    pub fn new(current_season_id: &str) -> Self {
        FakeOrigin {
            seasons: Mutex::new(vec![
                Season::new("s0", false, false),
                Season::new(current_season_id, true, false),
            ]),
            delay: Duration::ZERO,
            season_calls: AtomicUsize::new(0),
            leaderboard_calls: AtomicUsize::new(0),
            fail_seasons: AtomicBool::new(false),
            fail_leaderboard: AtomicBool::new(false),
        }
    }

    /// Every origin call sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_seasons(&self, seasons: Vec<Season>) {
        *self.seasons.lock().unwrap() = seasons;
    }

    async fn wait(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl Origin for FakeOrigin {
    async fn list_seasons(&self) -> OriginResult<Vec<Season>> {
        self.season_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        if self.fail_seasons.load(Ordering::SeqCst) {
            return Err(OriginError::Status(503));
        }
        Ok(self.seasons.lock().unwrap().clone())
    }

    async fn fetch_leaderboard(
        &self,
        season_id: &str,
        _game_mode: GameMode,
    ) -> OriginResult<Leaderboard> {
        self.leaderboard_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        if self.fail_leaderboard.load(Ordering::SeqCst) {
            return Err(OriginError::Http("connection reset".to_string()));
        }
        Ok(sample_leaderboard(season_id))
    }
}

/// Memory cache with switchable failures.
pub(crate) struct FlakyCache {
    inner: MemoryCache,
    pub fail_reads: AtomicBool,
    pub fail_leaderboard_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl FlakyCache {
    pub fn new(inner: MemoryCache) -> Self {
        FlakyCache {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_leaderboard_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    fn check_read(&self) -> CacheResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CacheError::Backend("injected read failure".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> CacheResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Backend("injected write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Cache for FlakyCache {
    async fn get_season(&self) -> CacheResult<Season> {
        self.check_read()?;
        self.inner.get_season().await
    }

    async fn put_season(&self, season: &Season) -> CacheResult<()> {
        self.check_write()?;
        self.inner.put_season(season).await
    }

    async fn get_leaderboard(&self) -> CacheResult<Leaderboard> {
        self.check_read()?;
        if self.fail_leaderboard_reads.load(Ordering::SeqCst) {
            return Err(CacheError::Backend("injected leaderboard read failure".to_string()));
        }
        self.inner.get_leaderboard().await
    }

    async fn put_leaderboard(&self, leaderboard: &Leaderboard) -> CacheResult<()> {
        self.check_write()?;
        self.inner.put_leaderboard(leaderboard).await
    }

    async fn get_player(&self, player_id: &str) -> CacheResult<PlayerEntry> {
        self.check_read()?;
        self.inner.get_player(player_id).await
    }

    async fn ping(&self) -> CacheResult<()> {
        self.check_read()?;
        self.inner.ping().await
    }
}
