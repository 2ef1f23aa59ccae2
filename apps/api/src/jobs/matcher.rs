//! Rule-based job matcher — deterministic, explainable scoring of the static
//! dataset against a candidate profile. Deliberately not model-based: every
//! score is reproducible and debuggable from the weights below.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::jobs::dataset::JobPosting;

/// Scoring weights and limits. The literal values are load-bearing for the
/// scoring contract and are carried as configuration, not derived logic.
#[derive(Debug, Clone)]
pub struct MatcherWeights {
    /// Added per candidate skill found as a whole word in the job text.
    pub skill_points: i32,
    /// Added when the candidate role appears in the job name.
    pub role_in_title_points: i32,
    /// Added when the role appears in the job text but not the name.
    pub role_in_text_points: i32,
    /// Added when the candidate meets the inferred experience threshold.
    pub experience_bonus: i32,
    /// Subtracted when the candidate is below the threshold.
    pub experience_penalty: i32,
    /// Minimum raw score for a job to appear in results at all.
    pub admission_threshold: i32,
    pub max_results: usize,
    /// Cap on both the found-skills and missing-skills lists.
    pub max_listed_skills: usize,
    /// Character cap for the truncated description/requirement fields.
    pub summary_chars: usize,
    /// Reference vocabulary scanned for missing-skill suggestions, in
    /// suggestion order.
    pub reference_skills: Vec<String>,
}

/// Common technology terms suggested as missing skills.
const REFERENCE_SKILLS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "react",
    "angular",
    "vue",
    "nodejs",
    "docker",
    "kubernetes",
    "aws",
    "azure",
    "sql",
    "mongodb",
    "git",
    "typescript",
    "golang",
    "rust",
    "c++",
    "c#",
    ".net",
    "flutter",
    "swift",
];

impl Default for MatcherWeights {
    fn default() -> Self {
        Self {
            skill_points: 15,
            role_in_title_points: 30,
            role_in_text_points: 10,
            experience_bonus: 5,
            experience_penalty: 10,
            admission_threshold: 15,
            max_results: 20,
            max_listed_skills: 5,
            summary_chars: 200,
            reference_skills: REFERENCE_SKILLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Candidate profile the dataset is ranked against.
#[derive(Debug, Clone)]
pub struct CandidateProfile {
    pub skills: Vec<String>,
    pub role: String,
    pub experience_years: f64,
}

/// Display copy of a matched posting, with long fields truncated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSummary {
    pub name: String,
    pub company: String,
    pub url: String,
    pub description: String,
    pub requirement: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub job: JobSummary,
    pub match_score: i32,
    pub required_skills_found: Vec<String>,
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatchError {
    /// The dataset never loaded — an operational fault, distinct from a
    /// successful query with zero matches.
    #[error("job dataset is unavailable")]
    DatasetUnavailable,
}

/// Ranks the dataset against the candidate: score each posting, admit those
/// at or above the threshold, sort by score (stable — ties keep dataset
/// order), and return the top slice.
pub fn recommend(
    jobs: &[JobPosting],
    profile: &CandidateProfile,
    weights: &MatcherWeights,
) -> Result<Vec<MatchResult>, MatchError> {
    if jobs.is_empty() {
        return Err(MatchError::DatasetUnavailable);
    }

    let skills = normalize_skills(&profile.skills);
    let role = profile.role.trim().to_lowercase();

    let mut results: Vec<MatchResult> = jobs
        .iter()
        .filter_map(|job| score_job(job, &skills, &role, profile.experience_years, weights))
        .collect();

    results.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    results.truncate(weights.max_results);
    Ok(results)
}

fn score_job(
    job: &JobPosting,
    skills: &[String],
    role: &str,
    experience_years: f64,
    weights: &MatcherWeights,
) -> Option<MatchResult> {
    let name_lower = job.name.to_lowercase();
    let full_text = format!("{} {} {}", job.name, job.description, job.requirement).to_lowercase();

    let mut score = 0i32;

    let mut found = Vec::new();
    for skill in skills {
        if contains_whole_word(&full_text, skill) {
            score += weights.skill_points;
            found.push(skill.clone());
        }
    }

    // Title hits outrank body hits.
    if !role.is_empty() {
        if name_lower.contains(role) {
            score += weights.role_in_title_points;
        } else if full_text.contains(role) {
            score += weights.role_in_text_points;
        }
    }

    if experience_years < required_experience(&name_lower) {
        score -= weights.experience_penalty;
    } else {
        score += weights.experience_bonus;
    }

    if score < weights.admission_threshold {
        return None;
    }

    found.truncate(weights.max_listed_skills);
    let missing = missing_skills(&full_text, skills, weights);

    Some(MatchResult {
        job: JobSummary {
            name: job.name.clone(),
            company: job.company.clone(),
            url: job.url.clone(),
            description: truncate_summary(&job.description, weights.summary_chars),
            requirement: truncate_summary(&job.requirement, weights.summary_chars),
        },
        match_score: score.clamp(0, 100),
        required_skills_found: found,
        missing_skills: missing,
    })
}

/// Experience threshold inferred from seniority keywords in the job name.
fn required_experience(name_lower: &str) -> f64 {
    if name_lower.contains("senior") {
        3.0
    } else if name_lower.contains("junior") || name_lower.contains("fresher") {
        0.0
    } else if name_lower.contains("mid") {
        2.0
    } else {
        0.0
    }
}

/// Whole-word containment: `needle` must occur in `haystack` bounded by
/// non-alphanumeric characters (or the string edge) on both sides, so "java"
/// never matches inside "javascript". Both arguments must be lowercase.
/// Boundary checks are on characters, which keeps terms like "c++", "c#"
/// and ".net" matchable.
fn contains_whole_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(needle) {
        let start = from + pos;
        let end = start + needle.len();
        let left_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let right_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if left_ok && right_ok {
            return true;
        }
        from = end;
    }
    false
}

/// Trims, lowercases, drops empties, and dedups while preserving request
/// order — the found-skills list mirrors the candidate's own ordering.
fn normalize_skills(skills: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::new();
    for skill in skills {
        let skill = skill.trim().to_lowercase();
        if skill.is_empty() {
            continue;
        }
        if seen.insert(skill.clone()) {
            normalized.push(skill);
        }
    }
    normalized
}

/// Reference-vocabulary terms the candidate lacks but the job text demands,
/// in vocabulary order, capped.
fn missing_skills(
    full_text: &str,
    candidate_skills: &[String],
    weights: &MatcherWeights,
) -> Vec<String> {
    let mut missing = Vec::new();
    for tech in &weights.reference_skills {
        if missing.len() == weights.max_listed_skills {
            break;
        }
        if candidate_skills.iter().any(|s| s == tech) {
            continue;
        }
        if contains_whole_word(full_text, tech) {
            missing.push(tech.clone());
        }
    }
    missing
}

/// First `limit` characters plus an ellipsis marker. Character-based — the
/// dataset carries multibyte text.
fn truncate_summary(text: &str, limit: usize) -> String {
    let mut out: String = text.chars().take(limit).collect();
    out.push_str("...");
    out
}
