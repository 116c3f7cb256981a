use crate::{
    cli::Cli,
    coordinator::LeaderboardCachePolicy,
    error::{Error, LeaderboardResult},
    pubg::GameMode,
};
use clap::ValueEnum;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use tracing::Level;

const TRACE_LEVELS: [&str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
const LOCAL_SETTINGS_YAML_FILE: &str = ".env.local.yaml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CacheBackendKind {
    Memory,
    Redis,
    #[default]
    RedisCluster,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

// Settings are built once at startup and handed to every component that
// needs them. All settings may be configured via environment variables.
// Example: PUBG_API_KEY="xxx" would set pubg_api_key to the xxx value.
#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    #[serde(default = "default_trace_level")]
    trace_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default = "default_app_port")]
    pub app_port: u16,
    #[serde(default = "default_request_timeout_sec")]
    pub request_timeout_sec: u64,
    #[serde(default = "default_pubg_api_endpoint")]
    pub pubg_api_endpoint: String,
    pub pubg_api_key: String,
    #[serde(default = "default_pubg_api_timeout_sec")]
    pub pubg_api_timeout_sec: u64,
    #[serde(default)]
    pub game_mode: GameMode,
    #[serde(default)]
    pub cache_backend: CacheBackendKind,
    #[serde(default = "default_redis_addr")]
    pub redis_addr: String,
    pub redis_pass: Option<String>,
    #[serde(default)]
    pub redis_db: i64,
    #[serde(default = "default_season_ttl_sec")]
    pub season_ttl_sec: u64,
    #[serde(default = "default_leaderboard_ttl_sec")]
    pub leaderboard_ttl_sec: u64,
    #[serde(default = "default_season_refresh_interval_sec")]
    pub season_refresh_interval_sec: u64,
    #[serde(default = "default_leaderboard_refresh_interval_sec")]
    pub leaderboard_refresh_interval_sec: u64,
    // What a non-miss cache error on the leaderboard read path does.
    #[serde(default)]
    pub leaderboard_cache_policy: LeaderboardCachePolicy,
}

impl Settings {
    pub fn new(cli: &Cli) -> LeaderboardResult<Self> {
        let settings: Settings = Settings::figment(cli).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Redis rejects a zero expiry and a zero refresh interval would spin the
    /// scheduler, so every TTL and interval must be at least one second.
    fn validate(&self) -> LeaderboardResult<()> {
        let durations = [
            ("season_ttl_sec", self.season_ttl_sec),
            ("leaderboard_ttl_sec", self.leaderboard_ttl_sec),
            ("season_refresh_interval_sec", self.season_refresh_interval_sec),
            ("leaderboard_refresh_interval_sec", self.leaderboard_refresh_interval_sec),
        ];
        match durations.iter().find(|(_, secs)| *secs == 0) {
            Some((key, _)) => Err(Error::Config(format!("{key} must be greater than 0"))),
            None => Ok(()),
        }
    }

    /// Layers, later wins: YAML file (if present), raw environment, CLI flags.
    pub fn figment(cli: &Cli) -> Figment {
        let settings_file = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(LOCAL_SETTINGS_YAML_FILE));

        let mut figment = Figment::new();
        if settings_file.exists() {
            figment = figment.merge(Yaml::file(settings_file));
        }
        figment.merge(Env::raw()).merge(Serialized::defaults(cli))
    }

    pub fn get_trace_level(&self) -> Level {
        get_trace_level(&self.trace_level)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_sec)
    }

    pub fn pubg_api_timeout(&self) -> Duration {
        Duration::from_secs(self.pubg_api_timeout_sec)
    }

    pub fn season_ttl(&self) -> Duration {
        Duration::from_secs(self.season_ttl_sec)
    }

    pub fn leaderboard_ttl(&self) -> Duration {
        Duration::from_secs(self.leaderboard_ttl_sec)
    }

    pub fn season_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.season_refresh_interval_sec)
    }

    pub fn leaderboard_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.leaderboard_refresh_interval_sec)
    }

    pub fn redis_url(&self) -> String {
        match &self.redis_pass {
            Some(pass) if !pass.is_empty() => {
                format!("redis://:{}@{}/{}", pass, self.redis_addr, self.redis_db)
            }
            _ => format!("redis://{}/{}", self.redis_addr, self.redis_db),
        }
    }

    /// Seed node URLs for cluster mode, from a comma separated `redis_addr`.
    /// Clusters only have database 0, so `redis_db` is not used here.
    pub fn redis_cluster_nodes(&self) -> Vec<String> {
        self.redis_addr
            .split(',')
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .map(|addr| match &self.redis_pass {
                Some(pass) if !pass.is_empty() => format!("redis://:{pass}@{addr}"),
                _ => format!("redis://{addr}"),
            })
            .collect()
    }
}

fn get_trace_level(level_str: &str) -> Level {
    match level_str.to_uppercase().as_str() {
        level if level == TRACE_LEVELS[0] => Level::TRACE,
        level if level == TRACE_LEVELS[1] => Level::DEBUG,
        level if level == TRACE_LEVELS[2] => Level::INFO,
        level if level == TRACE_LEVELS[3] => Level::WARN,
        level if level == TRACE_LEVELS[4] => Level::ERROR,
        // Default trace level
        _ => Level::INFO,
    }
}

fn default_trace_level() -> String {
    "INFO".to_string()
}

fn default_app_port() -> u16 {
    8080
}

fn default_request_timeout_sec() -> u64 {
    10
}

fn default_pubg_api_endpoint() -> String {
    "https://api.pubg.com/shards/pc-na".to_string()
}

fn default_pubg_api_timeout_sec() -> u64 {
    5
}

fn default_redis_addr() -> String {
    "redis-cluster:6379".to_string()
}

fn default_season_ttl_sec() -> u64 {
    24 * 60 * 60
}

fn default_leaderboard_ttl_sec() -> u64 {
    10 * 60
}

fn default_season_refresh_interval_sec() -> u64 {
    24 * 60 * 60
}

fn default_leaderboard_refresh_interval_sec() -> u64 {
    10 * 60
}
