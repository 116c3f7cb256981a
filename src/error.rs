use thiserror::Error;
use tokio_cron_scheduler::JobSchedulerError;

/// Custom Error and Result types to unify errors from all sources.
pub type LeaderboardResult<T> = Result<T, Error>;
pub type CacheResult<T> = Result<T, CacheError>;
pub type OriginResult<T> = Result<T, OriginError>;

/// Outcome of a cache read or write that did not produce a value.
///
/// `Miss` is not a failure: the key is absent or expired. Callers decide
/// whether to fall back to the origin.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache miss")]
    Miss,
    #[error("Cache backend Error: {0}")]
    Backend(String),
    #[error("Cache serialization Error: {0}")]
    Serialization(String),
}

impl CacheError {
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::Miss)
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(error: redis::RedisError) -> Self {
        CacheError::Backend(error.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        CacheError::Serialization(error.to_string())
    }
}

#[derive(Debug, Error)]
pub enum OriginError {
    #[error("HTTP Error: {0}")]
    Http(String),
    #[error("Unexpected status: {0}")]
    Status(u16),
    #[error("Parse Error: {0}")]
    Parse(String),
    #[error("No current season found")]
    NoCurrentSeason,
}

impl From<reqwest::Error> for OriginError {
    fn from(error: reqwest::Error) -> Self {
        OriginError::Http(error.to_string())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("{context}: {source}")]
    Origin {
        context: &'static str,
        #[source]
        source: OriginError,
    },
    #[error("Player {0} not found")]
    PlayerNotFound(String),
    #[error("Deadline exceeded")]
    Timeout,
    #[error("Scheduler Error: {0}")]
    Scheduler(String),
    #[error("Config Error: {0}")]
    Config(String),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn origin(context: &'static str, source: OriginError) -> Self {
        Error::Origin { context, source }
    }

    /// True when the error means "absent", as opposed to a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::PlayerNotFound(_))
    }
}

impl From<JobSchedulerError> for Error {
    fn from(error: JobSchedulerError) -> Self {
        Error::Scheduler(error.to_string())
    }
}

impl From<figment::Error> for Error {
    fn from(error: figment::Error) -> Self {
        Error::Config(error.to_string())
    }
}
