use crate::{
    client::Origin,
    config::Settings,
    error::{OriginError, OriginResult},
    pubg::{GameMode, Leaderboard, PlayerEntry, PlayerStats, Season},
};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use std::{fmt, time::Duration};
use tracing::{error, info};

const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

enum Endpoint<'a> {
    Seasons,
    Leaderboard(&'a str, GameMode),
}

impl fmt::Display for Endpoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Endpoint::Seasons => write!(f, "/seasons"),
            Endpoint::Leaderboard(season_id, game_mode) => {
                write!(f, "/leaderboards/{}/{}", season_id, game_mode)
            }
        }
    }
}

pub struct PubgClient {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl PubgClient {
    pub fn new(base_url: String, timeout: Duration, api_key: String) -> OriginResult<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_settings(settings: &Settings) -> OriginResult<Self> {
        PubgClient::new(
            settings.pubg_api_endpoint.clone(),
            settings.pubg_api_timeout(),
            settings.pubg_api_key.clone(),
        )
    }

    async fn get(&self, endpoint: &Endpoint<'_>) -> OriginResult<String> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .http_client
            .get(&url)
            .header(header::ACCEPT, JSON_API_MEDIA_TYPE)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => response
                .text()
                .await
                .map_err(|e| OriginError::Parse(e.to_string())),
            StatusCode::UNAUTHORIZED => Err(OriginError::Http(format!(
                "{}. The API key might be invalid.",
                StatusCode::UNAUTHORIZED
            ))),
            // The PUBG API allows a handful of requests per minute per key.
            StatusCode::TOO_MANY_REQUESTS => Err(OriginError::Http(format!(
                "{}. Rate limit reached.",
                StatusCode::TOO_MANY_REQUESTS
            ))),
            status => Err(OriginError::Status(status.as_u16())),
        }
    }

    fn parse_seasons(seasons: &str) -> OriginResult<Vec<Season>> {
        // Response from the PUBG seasons endpoint.
        // Structs defined here as they are only used by this function.
        use serde::Deserialize;

        #[derive(Debug, Deserialize)]
        struct SeasonsResponse {
            data: Vec<SeasonData>,
        }

        #[derive(Debug, Deserialize)]
        struct SeasonData {
            id: String,
            attributes: SeasonAttributes,
        }

        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct SeasonAttributes {
            is_current_season: bool,
            is_offseason: bool,
        }

        let parsed = serde_json::from_str::<SeasonsResponse>(seasons)
            .map_err(|e| OriginError::Parse(e.to_string()))?;

        Ok(parsed
            .data
            .into_iter()
            .map(|season| {
                Season::new(
                    season.id,
                    season.attributes.is_current_season,
                    season.attributes.is_offseason,
                )
            })
            .collect())
    }

    fn parse_leaderboard(
        leaderboard: &str,
        season_id: &str,
        game_mode: GameMode,
    ) -> OriginResult<Leaderboard> {
        // JSON:API leaderboard document. Players are listed in `included`,
        // `data.relationships` only references them by id.
        use serde::Deserialize;

        #[derive(Debug, Deserialize)]
        struct LeaderboardResponse {
            data: LeaderboardData,
            #[serde(default)]
            included: Vec<IncludedResource>,
        }

        #[derive(Debug, Deserialize)]
        struct LeaderboardData {
            id: String,
            attributes: LeaderboardAttributes,
        }

        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct LeaderboardAttributes {
            #[serde(default)]
            shard_id: String,
            season_id: Option<String>,
        }

        #[derive(Debug, Deserialize)]
        struct IncludedResource {
            #[serde(rename = "type")]
            kind: String,
            id: String,
            attributes: Option<PlayerAttributes>,
        }

        #[derive(Debug, Deserialize)]
        struct PlayerAttributes {
            #[serde(default)]
            name: String,
            rank: u32,
            #[serde(default)]
            stats: PlayerStats,
        }

        let parsed = serde_json::from_str::<LeaderboardResponse>(leaderboard)
            .map_err(|e| OriginError::Parse(e.to_string()))?;

        let players = parsed
            .included
            .into_iter()
            .filter(|resource| resource.kind == "player")
            .map(|resource| {
                let attributes = resource.attributes.ok_or_else(|| {
                    OriginError::Parse(format!("player {} has no attributes", resource.id))
                })?;
                Ok(PlayerEntry {
                    id: resource.id,
                    name: attributes.name,
                    rank: attributes.rank,
                    stats: attributes.stats,
                })
            })
            .collect::<OriginResult<Vec<PlayerEntry>>>()?;

        Ok(Leaderboard::new(
            parsed.data.id,
            parsed.data.attributes.shard_id,
            parsed
                .data
                .attributes
                .season_id
                .unwrap_or_else(|| season_id.to_string()),
            game_mode,
            players,
        ))
    }
}

#[async_trait]
impl Origin for PubgClient {
    async fn list_seasons(&self) -> OriginResult<Vec<Season>> {
        info!("pubg: fetching seasons");
        let response = self.get(&Endpoint::Seasons).await.map_err(|e| {
            error!(error = %e, "pubg: seasons request failed");
            e
        })?;
        PubgClient::parse_seasons(&response)
    }

    async fn fetch_leaderboard(
        &self,
        season_id: &str,
        game_mode: GameMode,
    ) -> OriginResult<Leaderboard> {
        info!(season_id, %game_mode, "pubg: fetching leaderboard");
        let endpoint = Endpoint::Leaderboard(season_id, game_mode);
        let response = self.get(&endpoint).await.map_err(|e| {
            error!(season_id, %game_mode, error = %e, "pubg: leaderboard request failed");
            e
        })?;
        let leaderboard = PubgClient::parse_leaderboard(&response, season_id, game_mode)?;
        info!(
            season_id,
            %game_mode,
            players = leaderboard.len(),
            "pubg: fetched leaderboard"
        );
        Ok(leaderboard)
    }
}
