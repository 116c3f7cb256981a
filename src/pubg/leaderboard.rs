use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GameMode {
    Solo,
    SoloFpp,
    Duo,
    DuoFpp,
    Squad,
    #[default]
    SquadFpp,
}

// Snapshot values as reported by the origin for one refresh cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerStats {
    pub rank_points: f64,
    pub wins: u32,
    pub games: u32,
    pub win_ratio: f64,
    pub average_damage: f64,
    pub kills: u32,
    pub kill_death_ratio: f64,
    pub kda: f64,
    pub average_rank: f64,
    pub tier: String,
    pub sub_tier: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntry {
    pub id: String,
    pub name: String,
    pub rank: u32,
    pub stats: PlayerStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub id: String,
    pub shard_id: String,
    pub season_id: String,
    pub game_mode: GameMode,
    /// Ordered by rank, best first.
    pub players: Vec<PlayerEntry>,
}

impl Leaderboard {
    pub fn new(
        id: impl Into<String>,
        shard_id: impl Into<String>,
        season_id: impl Into<String>,
        game_mode: GameMode,
        players: impl IntoIterator<Item = PlayerEntry>,
    ) -> Self {
        Leaderboard {
            id: id.into(),
            shard_id: shard_id.into(),
            season_id: season_id.into(),
            game_mode,
            players: players
                .into_iter()
                .sorted_by_key(|player| player.rank)
                .collect(),
        }
    }

    /// Whether this leaderboard was built for the given season and mode.
    pub fn is_for(&self, season_id: &str, game_mode: GameMode) -> bool {
        self.season_id == season_id && self.game_mode == game_mode
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
