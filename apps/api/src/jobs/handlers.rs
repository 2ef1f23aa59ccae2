//! Axum route handler for the job recommendation endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::jobs::matcher::{recommend, CandidateProfile, MatchResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendJobsRequest {
    pub skills: Vec<String>,
    pub role: String,
    pub experience_years: f64,
}

#[derive(Debug, Serialize)]
pub struct RecommendJobsResponse {
    pub jobs: Vec<MatchResult>,
}

/// POST /api/jobs/recommend
///
/// Pure local computation over the startup-loaded dataset — no AI call.
/// Zero matches is a successful empty list; a missing dataset is a fault.
pub async fn handle_recommend_jobs(
    State(state): State<AppState>,
    Json(request): Json<RecommendJobsRequest>,
) -> Result<Json<RecommendJobsResponse>, AppError> {
    if !request.experience_years.is_finite() || request.experience_years < 0.0 {
        return Err(AppError::Validation(
            "experienceYears must be a non-negative number".to_string(),
        ));
    }

    let profile = CandidateProfile {
        skills: request.skills,
        role: request.role,
        experience_years: request.experience_years,
    };

    let jobs = recommend(state.jobs.jobs(), &profile, &state.matcher)
        .map_err(|_| AppError::DatasetUnavailable)?;

    Ok(Json(RecommendJobsResponse { jobs }))
}
