//! Centralized configuration (environment variables + defaults).
//!
//! Variables may come from the process environment or from a `.env` file.
//! `CONFIG_PATH` names that file explicitly; otherwise a `.env` in the working
//! directory is picked up when present.

use anyhow::{anyhow, bail, Context};
use std::path::Path;
use std::time::Duration;

const DEFAULT_ADDRESS: &str = "0.0.0.0:8082";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);
const DEFAULT_HELP_API_TIMEOUT: Duration = Duration::from_secs(1);
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Deployment environment; selects the log format and level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Env {
    Local,
    Dev,
    Prod,
}

impl std::str::FromStr for Env {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Env::Local),
            "dev" => Ok(Env::Dev),
            "prod" => Ok(Env::Prod),
            other => Err(anyhow!("ENV must be one of local, dev, prod (got {other:?})")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub env: Env,
    /// Postgres connection URL.
    pub storage: String,
    pub address: String,
    /// Base URL of the external car-info service.
    pub help_api: String,
    /// Upper bound on handling a single request.
    pub timeout: Duration,
    pub help_api_timeout: Duration,
    pub db_max_connections: u32,
}

impl Config {
    /// Loads the `.env` file (if any) and reads the configuration from the environment.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var("CONFIG_PATH") {
            Ok(path) if !path.is_empty() => {
                if !Path::new(&path).exists() {
                    bail!("config file does not exist: {path}");
                }
                dotenv::from_path(&path)
                    .with_context(|| format!("failed to load config file {path}"))?;
            }
            _ => {
                dotenv::dotenv().ok();
            }
        }

        Self::from_env()
    }

    /// Reads the configuration from the process environment only.
    pub fn from_env() -> anyhow::Result<Self> {
        let env = match optional_var("ENV") {
            Some(v) => v.parse()?,
            None => Env::Local,
        };

        let timeout = match optional_var("TIMEOUT") {
            Some(v) => parse_duration(&v).context("invalid TIMEOUT")?,
            None => DEFAULT_TIMEOUT,
        };

        let help_api_timeout = match optional_var("HELP_API_TIMEOUT") {
            Some(v) => parse_duration(&v).context("invalid HELP_API_TIMEOUT")?,
            None => DEFAULT_HELP_API_TIMEOUT,
        };

        let db_max_connections = match optional_var("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .context("DB_MAX_CONNECTIONS must be a valid u32")?
                .max(1),
            None => DEFAULT_DB_MAX_CONNECTIONS,
        };

        Ok(Self {
            env,
            storage: required_var("STORAGE")?,
            address: optional_var("ADDRESS").unwrap_or_else(|| DEFAULT_ADDRESS.to_string()),
            help_api: required_var("HELP_API")?,
            timeout,
            help_api_timeout,
            db_max_connections,
        })
    }
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required_var(name: &str) -> anyhow::Result<String> {
    optional_var(name).ok_or_else(|| anyhow!("{name} must be set"))
}

/// Parses durations such as `4s`, `500ms`, `1m`, `1h` or `1m30s`.
///
/// A bare number is read as seconds.
pub fn parse_duration(input: &str) -> anyhow::Result<Duration> {
    let input = input.trim();
    if let Ok(secs) = input.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(input).with_context(|| format!("invalid duration {input:?}"))
}
