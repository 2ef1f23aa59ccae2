pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::coaching::handlers as coaching;
use crate::cv::handlers as cv;
use crate::jobs::handlers as jobs;
use crate::media::handlers as media;
use crate::state::AppState;

/// Upload cap for CV scans and audio clips.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Coaching API
        .route("/api/evaluate", post(coaching::handle_evaluate))
        .route(
            "/api/questions/generate",
            post(coaching::handle_generate_questions),
        )
        // CV API
        .route("/api/cv/analyze", post(cv::handle_analyze_cv))
        .route("/api/cv/generate", post(cv::handle_generate_cv))
        .route("/api/cv/generate-doc", post(cv::handle_generate_cv_doc))
        // Job recommendation API
        .route("/api/jobs/recommend", post(jobs::handle_recommend_jobs))
        // Media API
        .route("/api/media/ocr", post(media::handle_ocr))
        .route("/api/media/transcribe", post(media::handle_transcribe))
        .route("/api/media/speak", post(media::handle_speak))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
