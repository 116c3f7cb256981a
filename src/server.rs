use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::{
    coordinator::LeaderboardCoordinator,
    error::{Error, LeaderboardResult},
    pubg::{Leaderboard, PlayerSummary},
    storage::Cache,
};

#[derive(Clone)]
pub struct AppState {
    coordinator: LeaderboardCoordinator,
    cache: Arc<dyn Cache>,
    request_timeout: Duration,
}

impl AppState {
    pub fn new(
        coordinator: LeaderboardCoordinator,
        cache: Arc<dyn Cache>,
        request_timeout: Duration,
    ) -> Self {
        AppState {
            coordinator,
            cache,
            request_timeout,
        }
    }

    /// Run a coordinator call under the request deadline. On expiry the call
    /// is dropped, which cancels its in-flight cache and origin I/O.
    async fn with_deadline<T>(
        &self,
        call: impl Future<Output = LeaderboardResult<T>>,
    ) -> LeaderboardResult<T> {
        tokio::time::timeout(self.request_timeout, call)
            .await
            .map_err(|_| Error::Timeout)?
    }
}

const PLAYER_NOT_FOUND: &str = "Player stats not found";

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    public_message: &'static str,
}

impl ApiError {
    fn from_error(error: Error, failure: &'static str) -> Self {
        if error.is_not_found() {
            info!(error = %error, "api: {PLAYER_NOT_FOUND}");
            ApiError {
                status: StatusCode::NOT_FOUND,
                public_message: PLAYER_NOT_FOUND,
            }
        } else {
            error!(error = %error, "api: {failure}");
            ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                public_message: failure,
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.public_message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/cache-ping", get(cache_ping))
        .route("/current-season", get(current_season))
        .route("/current-leaderboard", get(current_leaderboard))
        .route("/player-stats/{player_id}", get(player_stats))
        .with_state(state)
}

pub async fn serve(port: u16, state: AppState) -> LeaderboardResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Listening for HTTP requests.");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

async fn cache_ping(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state
        .with_deadline(async { Ok(state.cache.ping().await?) })
        .await
        .map_err(|e| ApiError::from_error(e, "Failed to ping cache"))?;
    Ok(Json(json!({ "message": "pong" })))
}

async fn current_season(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let season = state
        .with_deadline(state.coordinator.current_season())
        .await
        .map_err(|e| ApiError::from_error(e, "Failed to get current season"))?;
    Ok(Json(json!({ "seasonData": season })))
}

async fn current_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Leaderboard>, ApiError> {
    let leaderboard = state
        .with_deadline(state.coordinator.current_leaderboard())
        .await
        .map_err(|e| ApiError::from_error(e, "Failed to get current leaderboard"))?;
    Ok(Json(leaderboard))
}

async fn player_stats(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<PlayerSummary>, ApiError> {
    let summary = state
        .with_deadline(state.coordinator.player_stats(&player_id))
        .await
        .map_err(|e| ApiError::from_error(e, "Failed to get player stats"))?;
    Ok(Json(summary))
}
