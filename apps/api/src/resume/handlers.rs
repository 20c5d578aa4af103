//! Axum route handlers for the resume analysis service.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::resume::analysis::{
    estimate_experience_years, reasons_for_job_titles, split_titles, suggest_job_titles,
    suggest_job_titles_with_reasons,
};
use crate::resume::upload::{extract_resume_text, read_upload, ResumeUpload};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ExperienceResponse {
    pub job_title: String,
    pub estimated_years: u32,
}

#[derive(Debug, Serialize)]
pub struct SuggestedTitlesResponse {
    pub suggested_job_titles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ReasonsResponse {
    pub reasons: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsWithReasonsResponse {
    pub suggestions_with_reasons: Vec<String>,
}

async fn resume_text(state: &AppState, upload: &ResumeUpload) -> Result<String, AppError> {
    extract_resume_text(state.config.resume_scratch_dir.clone(), upload.file.clone()).await
}

/// POST /estimate-experience
///
/// Multipart: `file` (PDF) and `job_title`.
pub async fn handle_estimate_experience(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExperienceResponse>, AppError> {
    let upload = read_upload(multipart?, &["job_title"], "Missing file or job_title").await?;
    let job_title = upload.field("job_title").unwrap_or_default().to_string();
    info!(
        file = %upload.file_name,
        job_title = %job_title,
        "Estimating experience"
    );

    let text = resume_text(&state, &upload).await?;
    let today = chrono::Local::now().date_naive();
    let estimated_years =
        estimate_experience_years(state.llm.as_ref(), &text, &job_title, today).await?;

    Ok(Json(ExperienceResponse {
        job_title,
        estimated_years,
    }))
}

/// POST /suggest-job-titles
pub async fn handle_suggest_job_titles(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SuggestedTitlesResponse>, AppError> {
    let upload = read_upload(multipart?, &[], "Missing file").await?;
    info!(file = %upload.file_name, "Suggesting job titles");

    let text = resume_text(&state, &upload).await?;
    let suggested_job_titles = suggest_job_titles(state.llm.as_ref(), &text).await?;

    Ok(Json(SuggestedTitlesResponse {
        suggested_job_titles,
    }))
}

/// POST /reasons-for-job-titles
///
/// Multipart: `file` (PDF) and `job_titles` (comma-separated).
pub async fn handle_reasons_for_job_titles(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ReasonsResponse>, AppError> {
    let upload = read_upload(multipart?, &["job_titles"], "Missing file or job_titles").await?;
    let job_titles = split_titles(upload.field("job_titles").unwrap_or_default());
    info!(
        file = %upload.file_name,
        titles = job_titles.len(),
        "Explaining job titles"
    );

    let text = resume_text(&state, &upload).await?;
    let reasons = reasons_for_job_titles(state.llm.as_ref(), &text, &job_titles).await?;

    Ok(Json(ReasonsResponse { reasons }))
}

/// POST /suggest-job-titles-with-reasons
pub async fn handle_suggest_job_titles_with_reasons(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SuggestionsWithReasonsResponse>, AppError> {
    let upload = read_upload(multipart?, &[], "Missing file").await?;
    info!(file = %upload.file_name, "Suggesting job titles with reasons");

    let text = resume_text(&state, &upload).await?;
    let suggestions_with_reasons =
        suggest_job_titles_with_reasons(state.llm.as_ref(), &text).await?;

    Ok(Json(SuggestionsWithReasonsResponse {
        suggestions_with_reasons,
    }))
}
