use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

/// Process configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub recap_hour: u32,
    pub poll_interval: Duration,
    pub static_dir: PathBuf,
    pub delivery_url: String,
    pub delivery_timeout: Duration,
    pub delivery_concurrency: usize,
    pub ingest_token: Option<String>,
    pub mood_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let recap_hour: u32 = parse_var("SNAPSHOT_RECAP_HOUR", 21)?;
        if recap_hour > 23 {
            bail!("SNAPSHOT_RECAP_HOUR must be between 0 and 23, got {}", recap_hour);
        }

        let poll_secs: u64 = parse_var("SNAPSHOT_POLL_SECS", 60)?;
        if poll_secs == 0 {
            bail!("SNAPSHOT_POLL_SECS must be greater than 0");
        }

        let delivery_url = std::env::var("SNAPSHOT_DELIVERY_URL")
            .context("SNAPSHOT_DELIVERY_URL must be set to the platform adapter's base URL")?;

        Ok(Self {
            db_path: PathBuf::from(var_or("SNAPSHOT_DB_PATH", "data/snapshot.db")),
            host: var_or("SNAPSHOT_HOST", "0.0.0.0"),
            port: parse_var("SNAPSHOT_PORT", 3100)?,
            recap_hour,
            poll_interval: Duration::from_secs(poll_secs),
            static_dir: PathBuf::from(var_or("SNAPSHOT_STATIC_DIR", "static")),
            delivery_url,
            delivery_timeout: Duration::from_secs(parse_var("SNAPSHOT_DELIVERY_TIMEOUT_SECS", 30)?),
            delivery_concurrency: parse_var::<usize>("SNAPSHOT_DELIVERY_CONCURRENCY", 4)?.max(1),
            ingest_token: std::env::var("SNAPSHOT_INGEST_TOKEN").ok().filter(|t| !t.is_empty()),
            mood_timeout: Duration::from_secs(parse_var("SNAPSHOT_MOOD_TIMEOUT_SECS", 60)?),
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}
