use pubg_leaderboard::cli::Cli;
use pubg_leaderboard::client::PubgClient;
use pubg_leaderboard::config::{LogFormat, Settings};
use pubg_leaderboard::coordinator::LeaderboardCoordinator;
use pubg_leaderboard::error::Error;
use pubg_leaderboard::scheduler::{JobProcess, Scheduler};
use pubg_leaderboard::server::{self, AppState};
use pubg_leaderboard::storage;

use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = Settings::new(&cli)?;

    let subscriber = tracing_subscriber::fmt().with_max_level(settings.get_trace_level());
    match settings.log_format {
        LogFormat::Json => subscriber.json().try_init()?,
        LogFormat::Pretty => subscriber.pretty().try_init()?,
    };

    let origin = PubgClient::from_settings(&settings)
        .map_err(|e| Error::origin("could not build PUBG client", e))?;
    let cache = storage::connect(&settings).await?;
    let coordinator = LeaderboardCoordinator::new(
        cache.clone(),
        Arc::new(origin),
        settings.game_mode,
        settings.leaderboard_cache_policy,
    );

    let sched = Scheduler::new(coordinator.clone()).await?;

    let jobs = vec![
        JobProcess::InitializeSeason, // only ran once, at startup.
        JobProcess::RefreshSeason(settings.season_refresh_interval()),
        JobProcess::RefreshLeaderboard(settings.leaderboard_refresh_interval()),
    ];
    for job in jobs {
        sched.add_job(job).await?;
    }

    info!("Starting scheduler.");
    sched.start().await?;

    info!(port = settings.app_port, "Starting HTTP server.");
    let state = AppState::new(coordinator, cache, settings.request_timeout());
    server::serve(settings.app_port, state).await?;

    Ok(())
}
