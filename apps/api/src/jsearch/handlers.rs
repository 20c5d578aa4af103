//! Axum route handlers for the salary-estimate and job-search proxies.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::jsearch::experience::ExperienceBucket;
use crate::jsearch::{SalaryEstimate, SalaryQuery};
use crate::state::AppState;

const DEFAULT_JOB_TITLE: &str = "nodejs developer";
const DEFAULT_LOCATION: &str = "new york";
const DEFAULT_LOCATION_TYPE: &str = "ANY";
const DEFAULT_JOB_QUERY: &str = "developer jobs";

#[derive(Debug, Deserialize)]
pub struct SalaryParams {
    pub job_title: Option<String>,
    pub location: Option<String>,
    pub location_type: Option<String>,
    pub years_of_experience: Option<String>,
}

impl SalaryParams {
    fn into_query(self) -> SalaryQuery {
        SalaryQuery {
            job_title: self.job_title.unwrap_or_else(|| DEFAULT_JOB_TITLE.to_string()),
            location: self.location.unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            location_type: self
                .location_type
                .unwrap_or_else(|| DEFAULT_LOCATION_TYPE.to_string()),
            years_of_experience: self
                .years_of_experience
                .as_deref()
                .map(ExperienceBucket::from_token)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SalaryResponse {
    pub job_title: String,
    pub location: String,
    pub years_of_experience: ExperienceBucket,
    #[serde(flatten)]
    pub estimate: SalaryEstimate,
}

#[derive(Debug, Deserialize)]
pub struct JobsParams {
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JobsResponse {
    /// Upstream body, unparsed.
    pub jobs: String,
}

/// GET /get-estimated-salary
pub async fn handle_estimated_salary(
    State(state): State<AppState>,
    Query(params): Query<SalaryParams>,
) -> Result<Json<SalaryResponse>, AppError> {
    let query = params.into_query();
    info!(
        job_title = %query.job_title,
        location = %query.location,
        years = query.years_of_experience.as_str(),
        "Estimating salary"
    );

    let estimate = state.jsearch.estimated_salary(&query).await?;

    Ok(Json(SalaryResponse {
        job_title: query.job_title,
        location: query.location,
        years_of_experience: query.years_of_experience,
        estimate,
    }))
}

/// GET /jobs
pub async fn handle_search_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobsParams>,
) -> Result<Json<JobsResponse>, AppError> {
    let query = params
        .query
        .filter(|q| !q.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_JOB_QUERY.to_string());
    info!(query = %query, "Searching jobs");

    let jobs = state.jsearch.search(&query).await?;
    Ok(Json(JobsResponse { jobs }))
}
