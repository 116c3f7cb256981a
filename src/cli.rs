use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use crate::config::CacheBackendKind;

#[derive(Debug, Default, Parser, Serialize)]
#[command(name = "pubg-leaderboard", about = "Cached facade over the PUBG leaderboard API")]
pub struct Cli {
    /// YAML settings file, read before environment variables (defaults to .env.local.yaml)
    #[arg(long)]
    #[serde(skip)]
    pub config: Option<PathBuf>,
    /// Port the HTTP server listens on
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_port: Option<u16>,
    /// TRACE, DEBUG, INFO, WARN or ERROR
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_level: Option<String>,
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_backend: Option<CacheBackendKind>,
}
