mod coaching;
mod config;
mod cv;
mod errors;
mod extractor;
mod jobs;
mod llm_client;
mod media;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::cv::docwriter::DocxWriter;
use crate::jobs::dataset::JobDataset;
use crate::jobs::matcher::MatcherWeights;
use crate::llm_client::LlmClient;
use crate::media::ocr::VisionClient;
use crate::media::speech::SpeechClient;
use crate::media::tts::TtsClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareerCoach API v{}", env!("CARGO_PKG_VERSION"));

    // Missing credentials degrade to per-endpoint 503s, never startup failures.
    let llm = config.anthropic_api_key.clone().map(LlmClient::new);
    match &llm {
        Some(_) => info!("LLM client initialized (model: {})", llm_client::MODEL),
        None => warn!("ANTHROPIC_API_KEY not set — AI endpoints will answer 503"),
    }

    let vision = config.vision_api_key.clone().map(VisionClient::new);
    let speech = config.speech_api_key.clone().map(SpeechClient::new);
    let tts = config.tts_api_key.clone().map(TtsClient::new);

    // Loaded exactly once; read-only for the rest of the process lifetime.
    let jobs = Arc::new(JobDataset::load(&config).await);
    info!("Job dataset ready ({} postings)", jobs.jobs().len());

    let state = AppState {
        llm,
        jobs,
        matcher: Arc::new(MatcherWeights::default()),
        vision,
        speech,
        tts,
        doc_writer: Arc::new(DocxWriter),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
