//! Job dataset — loaded exactly once per process lifetime with a two-tier
//! fallback (remote URL → local file → empty), then shared read-only.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;

/// Bounded timeout for the remote dataset fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// A single job posting from the static dataset. The upstream JSON uses
/// `job_name`-style keys; aliases accept both spellings. Immutable after load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(default, alias = "job_name")]
    pub name: String,
    #[serde(default, alias = "job_description")]
    pub description: String,
    #[serde(default, alias = "job_requirement")]
    pub requirement: String,
    #[serde(default, alias = "company_name")]
    pub company: String,
    #[serde(default, alias = "job_url")]
    pub url: String,
}

/// The process-lifetime job list. Written once at startup, read concurrently
/// afterwards — no lock needed because no writer exists after initialization.
#[derive(Debug, Default)]
pub struct JobDataset {
    jobs: Vec<JobPosting>,
}

impl JobDataset {
    /// Loads the dataset: remote URL first, local file second, empty last.
    /// Never errors — an empty dataset is an operational fault surfaced per
    /// request by the matcher, not a startup failure.
    pub async fn load(config: &Config) -> Self {
        if let Some(url) = &config.job_data_url {
            match fetch_remote(url).await {
                Ok(jobs) => {
                    info!("Loaded {} job postings from {url}", jobs.len());
                    return Self { jobs };
                }
                Err(e) => {
                    warn!("Remote job dataset fetch failed, falling back to local file: {e:#}")
                }
            }
        }

        match read_local(&config.job_data_file) {
            Ok(jobs) => {
                info!(
                    "Loaded {} job postings from {}",
                    jobs.len(),
                    config.job_data_file.display()
                );
                Self { jobs }
            }
            Err(e) => {
                warn!("Local job dataset unavailable, starting with an empty dataset: {e:#}");
                Self::default()
            }
        }
    }

    pub fn jobs(&self) -> &[JobPosting] {
        &self.jobs
    }
}

async fn fetch_remote(url: &str) -> Result<Vec<JobPosting>> {
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("failed to build dataset HTTP client")?;

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("dataset URL returned status {status}");
    }

    let payload: Value = response.json().await?;
    parse_postings(payload)
}

fn read_local(path: &Path) -> Result<Vec<JobPosting>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let payload: Value = serde_json::from_str(&raw)?;
    parse_postings(payload)
}

/// Accepts only a JSON array. Individual malformed entries are skipped with
/// a warning rather than poisoning the whole dataset.
fn parse_postings(payload: Value) -> Result<Vec<JobPosting>> {
    let Value::Array(items) = payload else {
        anyhow::bail!("dataset payload is not a JSON array");
    };

    let mut jobs = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<JobPosting>(item) {
            Ok(job) => jobs.push(job),
            Err(e) => warn!("Skipping malformed job posting: {e}"),
        }
    }
    Ok(jobs)
}
