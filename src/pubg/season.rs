use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{OriginError, OriginResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub id: String,
    pub is_current: bool,
    pub is_offseason: bool,
}

impl Season {
    pub fn new(id: impl Into<String>, is_current: bool, is_offseason: bool) -> Self {
        Season {
            id: id.into(),
            is_current,
            is_offseason,
        }
    }

    /// A season ranked games are played in right now.
    pub fn is_active(&self) -> bool {
        self.is_current && !self.is_offseason
    }
}

/// Pick the active season out of the list returned by the origin.
///
/// The origin is expected to flag exactly one season as current. When it
/// flags several, the first one in origin order wins.
pub fn select_current(seasons: Vec<Season>) -> OriginResult<Season> {
    let mut active = seasons.into_iter().filter(Season::is_active);
    let current = active.next().ok_or(OriginError::NoCurrentSeason)?;

    let others = active.count();
    if others > 0 {
        warn!(
            season_id = %current.id,
            others,
            "pubg: several seasons flagged as current, keeping the first one"
        );
    }
    Ok(current)
}
