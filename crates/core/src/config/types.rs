use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Source endpoints seeded into the source store at startup.
    #[serde(default)]
    pub sources: Vec<SourceSeed>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served as the router fallback
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("satplan.db")
}

/// TLE ingestion configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestConfig {
    /// Deadline for a single source fetch in seconds (default: 30)
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Run one ingestion in the background when the server starts
    #[serde(default = "default_run_on_startup")]
    pub run_on_startup: bool,
    /// Repeat the background ingestion every N minutes (disabled when unset)
    #[serde(default)]
    pub interval_minutes: Option<u64>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout(),
            run_on_startup: default_run_on_startup(),
            interval_minutes: None,
        }
    }
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_run_on_startup() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// A TLE source declared in the config file
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SourceSeed {
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// Sanitized config for API responses (source URLs may embed credentials)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub ingest: IngestConfig,
    pub logging: LoggingConfig,
    pub sources: Vec<SanitizedSource>,
}

/// Source seed with the URL reduced to scheme and host
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSource {
    pub label: String,
    pub host: String,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            ingest: config.ingest.clone(),
            logging: config.logging.clone(),
            sources: config
                .sources
                .iter()
                .map(|s| SanitizedSource {
                    label: s.label.clone(),
                    host: url_origin(&s.url),
                })
                .collect(),
        }
    }
}

/// Strip path, query and userinfo from a URL, keeping `scheme://host[:port]`.
fn url_origin(url: &str) -> String {
    let (scheme, rest) = match url.split_once("://") {
        Some(parts) => parts,
        None => return String::new(),
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority.rsplit('@').next().unwrap_or_default();
    format!("{}://{}", scheme, host)
}
