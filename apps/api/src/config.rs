use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// Vendor API keys are optional: a missing key leaves the corresponding
/// client unconfigured and the affected endpoints answer with a
/// "service not configured" error instead of failing startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub vision_api_key: Option<String>,
    pub speech_api_key: Option<String>,
    pub tts_api_key: Option<String>,
    /// Remote job dataset URL. Falls back to `job_data_file`, then empty.
    pub job_data_url: Option<String>,
    pub job_data_file: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        // Per-service keys override the shared key.
        let google_key = optional_env("GOOGLE_API_KEY");

        Ok(Config {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            vision_api_key: optional_env("GOOGLE_VISION_API_KEY").or_else(|| google_key.clone()),
            speech_api_key: optional_env("GOOGLE_SPEECH_API_KEY").or_else(|| google_key.clone()),
            tts_api_key: optional_env("GOOGLE_TTS_API_KEY").or(google_key),
            job_data_url: optional_env("JOB_DATA_URL"),
            job_data_file: std::env::var("JOB_DATA_FILE")
                .unwrap_or_else(|_| "job_data.json".to_string())
                .into(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads an env var, treating empty/whitespace values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
