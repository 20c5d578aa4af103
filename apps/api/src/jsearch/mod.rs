//! Client for the third-party job-search / salary-estimation API.
//!
//! Every call is a single GET carrying the API-key header pair. Failures are
//! surfaced to the caller as-is; nothing is retried.

pub mod experience;
pub mod handlers;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::errors::AppError;
use experience::ExperienceBucket;

#[derive(Debug, Error)]
pub enum JSearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("Invalid JSON response from API")]
    InvalidJson,

    #[error("Failed to retrieve salary data")]
    NoData,
}

impl From<JSearchError> for AppError {
    fn from(err: JSearchError) -> Self {
        AppError::Upstream(err.to_string())
    }
}

/// Parameters forwarded to the estimated-salary endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryQuery {
    pub job_title: String,
    pub location: String,
    pub location_type: String,
    pub years_of_experience: ExperienceBucket,
}

/// Salary fields copied from the first upstream result. Values are passed
/// through untouched; a field the upstream omits comes back as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryEstimate {
    pub median_salary: Value,
    pub min_salary: Value,
    pub max_salary: Value,
    pub salary_currency: Value,
}

impl SalaryEstimate {
    fn from_record(record: &Value) -> Self {
        let field = |name: &str| record.get(name).cloned().unwrap_or(Value::Null);
        Self {
            median_salary: field("median_salary"),
            min_salary: field("min_salary"),
            max_salary: field("max_salary"),
            salary_currency: field("salary_currency"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: Option<String>,
    #[serde(default)]
    data: Vec<Value>,
}

#[derive(Clone)]
pub struct JSearchClient {
    client: Client,
    base_url: String,
    api_key: String,
    host: String,
}

impl JSearchClient {
    pub fn new(base_url: String, api_key: String, host: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            host,
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.host)
    }

    /// GET /estimated-salary, reduced to the first result's salary fields.
    pub async fn estimated_salary(
        &self,
        query: &SalaryQuery,
    ) -> Result<SalaryEstimate, JSearchError> {
        let response = self
            .get(&format!("{}/estimated-salary", self.base_url))
            .query(&[
                ("job_title", query.job_title.as_str()),
                ("location", query.location.as_str()),
                ("location_type", query.location_type.as_str()),
                ("years_of_experience", query.years_of_experience.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(JSearchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let envelope: Envelope =
            serde_json::from_slice(&body).map_err(|_| JSearchError::InvalidJson)?;

        if envelope.status.as_deref() != Some("OK") {
            debug!("Estimated-salary envelope status: {:?}", envelope.status);
            return Err(JSearchError::NoData);
        }

        let first = envelope.data.first().ok_or(JSearchError::NoData)?;
        Ok(SalaryEstimate::from_record(first))
    }

    /// GET /search with fixed paging (one page, US, any posting date).
    /// The query is forwarded verbatim apart from spaces.
    pub async fn search(&self, query: &str) -> Result<String, JSearchError> {
        let url = format!(
            "{}/search?query={}&page=1&num_pages=1&country=us&date_posted=all",
            self.base_url,
            query.replace(' ', "%20")
        );

        let response = self.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(JSearchError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}
