pub mod pubg;

use async_trait::async_trait;

use crate::error::OriginResult;
use crate::pubg::{season, GameMode, Leaderboard, Season};

pub use pubg::PubgClient;

/// The external system of record for season and leaderboard data.
#[async_trait]
pub trait Origin: Send + Sync {
    async fn list_seasons(&self) -> OriginResult<Vec<Season>>;

    /// One request, no retry.
    async fn fetch_leaderboard(
        &self,
        season_id: &str,
        game_mode: GameMode,
    ) -> OriginResult<Leaderboard>;

    async fn fetch_current_season(&self) -> OriginResult<Season> {
        let seasons = self.list_seasons().await?;
        season::select_current(seasons)
    }
}
