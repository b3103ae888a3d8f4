use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_MODEL_PATH: &str = "models/en_resume_sm.json";
pub const DEFAULT_INPUT_DIR: &str = "cvs";
const DEFAULT_WORKERS: usize = 4;
const DEFAULT_ENRICH_TIMEOUT_SECS: u64 = 30;

/// Scanner configuration loaded from environment variables.
/// Only the model path is mandatory in practice; everything else degrades gracefully.
#[derive(Debug, Clone)]
pub struct Config {
    pub model_path: PathBuf,
    pub job_path: Option<PathBuf>,
    pub google_api_key: Option<String>,
    pub llm_endpoint: Option<String>,
    pub enrich_timeout: Duration,
    pub workers: usize,
    pub database_url: Option<String>,
    /// Report destination; stdout when unset.
    pub report_path: Option<PathBuf>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(optional_env)
    }

    /// Builds the config from `get`, which returns `None` for unset or blank keys.
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let workers = get("ATS_WORKERS")
            .map(|v| v.parse::<usize>())
            .transpose()
            .context("ATS_WORKERS must be a positive integer")?
            .unwrap_or(DEFAULT_WORKERS);
        if workers == 0 {
            anyhow::bail!("ATS_WORKERS must be at least 1");
        }

        let timeout_secs = get("ATS_ENRICH_TIMEOUT_SECS")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("ATS_ENRICH_TIMEOUT_SECS must be a number of seconds")?
            .unwrap_or(DEFAULT_ENRICH_TIMEOUT_SECS);
        if timeout_secs == 0 {
            anyhow::bail!("ATS_ENRICH_TIMEOUT_SECS must be at least 1");
        }

        Ok(Config {
            model_path: get("ATS_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            job_path: get("ATS_JOB_PATH").map(PathBuf::from),
            google_api_key: get("GOOGLE_API_KEY"),
            llm_endpoint: get("ATS_LLM_ENDPOINT"),
            enrich_timeout: Duration::from_secs(timeout_secs),
            workers,
            database_url: get("DATABASE_URL"),
            report_path: get("ATS_REPORT_PATH").map(PathBuf::from),
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Reads an env var, treating empty values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
