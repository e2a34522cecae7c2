//! Runtime configuration from environment variables (optionally via `.env`).

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://bps-mtt.vladars.rs:5101/api";
pub const DEFAULT_INGEST_CRON: &str = "0 0 */6 * * *";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_host: String,
    pub bind_port: u16,
    pub upstream_base_url: String,
    pub upstream_timeout: Duration,
    pub upstream_page: u32,
    pub ingest_cron: String,
    pub municipalities_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing("DATABASE_URL".to_string()))?;

        let bind_port = parse_or(&lookup, "BIND_PORT", 8080u16)?;
        let timeout_secs = parse_or(&lookup, "UPSTREAM_TIMEOUT_SECS", 15u64)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "UPSTREAM_TIMEOUT_SECS".to_string(),
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        let upstream_page = parse_or(&lookup, "UPSTREAM_PAGE", 1u32)?;

        let upstream_base_url = lookup("UPSTREAM_BASE_URL")
            .unwrap_or_else(|| DEFAULT_UPSTREAM_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            database_url,
            bind_host: lookup("BIND_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            bind_port,
            upstream_base_url,
            upstream_timeout: Duration::from_secs(timeout_secs),
            upstream_page,
            ingest_cron: lookup("INGEST_CRON").unwrap_or_else(|| DEFAULT_INGEST_CRON.to_string()),
            municipalities_file: lookup("MUNICIPALITIES_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key: key.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
