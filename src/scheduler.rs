use tokio_cron_scheduler::{Job, JobScheduler};

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use tracing::{error, info};

use crate::coordinator::LeaderboardCoordinator;
use crate::error::LeaderboardResult;

/// Background refresh loops. Each job run is spawned on its own task, so a
/// slow origin call in one loop never holds up the other one.
pub struct Scheduler {
    scheduler: JobScheduler,
    coordinator: LeaderboardCoordinator,
}

pub enum JobProcess {
    InitializeSeason,
    RefreshSeason(Duration),
    RefreshLeaderboard(Duration),
}

#[derive(Debug, Clone, Copy)]
enum Refresh {
    Season,
    Leaderboard,
}

impl fmt::Display for Refresh {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Refresh::Season => write!(f, "current season"),
            Refresh::Leaderboard => write!(f, "leaderboard"),
        }
    }
}

impl Scheduler {
    pub async fn new(coordinator: LeaderboardCoordinator) -> LeaderboardResult<Self> {
        let scheduler = JobScheduler::new().await?;
        Ok(Scheduler {
            scheduler,
            coordinator,
        })
    }

    pub async fn add_job(&self, job_process: JobProcess) -> LeaderboardResult<uuid::Uuid> {
        let job = match job_process {
            JobProcess::InitializeSeason => initialize_season_job(self.coordinator.clone())?,
            JobProcess::RefreshSeason(every) => {
                repeated_refresh_job(Refresh::Season, every, self.coordinator.clone())?
            }
            JobProcess::RefreshLeaderboard(every) => {
                repeated_refresh_job(Refresh::Leaderboard, every, self.coordinator.clone())?
            }
        };
        Ok(self.scheduler.add(job).await?)
    }

    pub async fn start(&self) -> LeaderboardResult<()> {
        Ok(self.scheduler.start().await?)
    }

    pub async fn shutdown(&mut self) -> LeaderboardResult<()> {
        Ok(self.scheduler.shutdown().await?)
    }
}

async fn run_refresh(refresh: Refresh, coordinator: &LeaderboardCoordinator) {
    let outcome = match refresh {
        Refresh::Season => coordinator
            .refresh_season()
            .await
            .map(|season| format!("season {}", season.id)),
        Refresh::Leaderboard => coordinator
            .refresh_leaderboard()
            .await
            .map(|leaderboard| format!("{} players", leaderboard.len())),
    };

    // Failures are only logged: the previous cached value stays until its
    // TTL runs out and the next run happens on schedule.
    match outcome {
        Ok(summary) => info!("Refreshed {refresh} ({summary})."),
        Err(e) => error!("Could not refresh {refresh}. {e}"),
    }
}

//////////////////
// Jobs definition
//////////////////

fn initialize_season_job(coordinator: LeaderboardCoordinator) -> LeaderboardResult<Job> {
    let job = Job::new_one_shot_async(Duration::from_secs(0), move |_uuid, _l| {
        let coordinator = coordinator.clone();
        Box::pin(async move {
            run_refresh(Refresh::Season, &coordinator).await;
        })
    })?;
    Ok(job)
}

fn repeated_refresh_job(
    refresh: Refresh,
    every: Duration,
    coordinator: LeaderboardCoordinator,
) -> LeaderboardResult<Job> {
    let job = Job::new_repeated_async(every, move |uuid, mut l| {
        let coordinator = coordinator.clone();
        Box::pin(async move {
            run_refresh(refresh, &coordinator).await;

            // Query the next execution time for this job
            let next_tick: Result<Option<DateTime<Utc>>, _> = l.next_tick_for_job(uuid).await;
            match next_tick {
                Ok(Some(ts)) => info!("Next refresh for {refresh} at {:?}", ts),
                _ => error!("Could not get next tick for {refresh} refresh job"),
            }
        })
    })?;
    Ok(job)
}
