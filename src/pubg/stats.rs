use serde::Serialize;

use crate::pubg::leaderboard::PlayerEntry;

/// Rank, games and wins of a single player, as exposed on `/player-stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    #[serde(rename = "playerID")]
    pub player_id: String,
    pub rank: u32,
    #[serde(rename = "gamesPlayed")]
    pub games_played: u32,
    pub wins: u32,
}

impl From<&PlayerEntry> for PlayerSummary {
    fn from(entry: &PlayerEntry) -> Self {
        PlayerSummary {
            player_id: entry.id.clone(),
            rank: entry.rank,
            games_played: entry.stats.games,
            wins: entry.stats.wins,
        }
    }
}
