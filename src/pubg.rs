pub mod leaderboard;
pub mod season;
pub mod stats;

pub use leaderboard::{GameMode, Leaderboard, PlayerEntry, PlayerStats};
pub use season::Season;
pub use stats::PlayerSummary;
