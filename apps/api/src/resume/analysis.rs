//! Prompt-driven resume interpretation: experience estimate, title suggestions,
//! and the reasoning behind them. Each function issues one completion request
//! and reshapes the free-form reply.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::errors::AppError;
use crate::llm_client::LanguageModel;
use crate::resume::prompts::{
    EXPERIENCE_TEMPERATURE, EXPERIENCE_YEARS_PROMPT, SUGGESTION_TEMPERATURE,
    SUGGEST_TITLES_PROMPT, SUGGEST_TITLES_WITH_REASONS_PROMPT, TITLE_REASONS_PROMPT,
};

async fn complete(
    llm: &dyn LanguageModel,
    prompt: &str,
    temperature: f32,
    task: &str,
) -> Result<String, AppError> {
    llm.complete(prompt, temperature)
        .await
        .map_err(|e| AppError::Processing(format!("Error {task}: {e}")))
}

/// Whole years of relevant experience, as judged by the model.
pub async fn estimate_experience_years(
    llm: &dyn LanguageModel,
    resume_text: &str,
    job_title: &str,
    today: NaiveDate,
) -> Result<u32, AppError> {
    let today = today.format("%B %d, %Y").to_string();
    let prompt = EXPERIENCE_YEARS_PROMPT
        .replace("{today}", &today)
        .replace("{job_title}", job_title)
        .replace("{resume_text}", resume_text);

    let reply = complete(
        llm,
        &prompt,
        EXPERIENCE_TEMPERATURE,
        "estimating experience years",
    )
    .await?;
    Ok(parse_years(&reply))
}

/// Five titles, as the model lists them.
pub async fn suggest_job_titles(
    llm: &dyn LanguageModel,
    resume_text: &str,
) -> Result<Vec<String>, AppError> {
    let prompt = SUGGEST_TITLES_PROMPT.replace("{resume_text}", resume_text);
    let reply = complete(
        llm,
        &prompt,
        SUGGESTION_TEMPERATURE,
        "generating job title suggestions",
    )
    .await?;
    Ok(split_titles(&reply))
}

pub async fn reasons_for_job_titles(
    llm: &dyn LanguageModel,
    resume_text: &str,
    job_titles: &[String],
) -> Result<Vec<String>, AppError> {
    let prompt = TITLE_REASONS_PROMPT
        .replace("{job_titles}", &job_titles.join(", "))
        .replace("{resume_text}", resume_text);
    let reply = complete(
        llm,
        &prompt,
        SUGGESTION_TEMPERATURE,
        "generating reasons for job titles",
    )
    .await?;
    Ok(split_lines(&reply))
}

pub async fn suggest_job_titles_with_reasons(
    llm: &dyn LanguageModel,
    resume_text: &str,
) -> Result<Vec<String>, AppError> {
    let prompt = SUGGEST_TITLES_WITH_REASONS_PROMPT.replace("{resume_text}", resume_text);
    let reply = complete(
        llm,
        &prompt,
        SUGGESTION_TEMPERATURE,
        "generating job titles with reasons",
    )
    .await?;
    Ok(split_lines(&reply))
}

fn first_integer() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+").expect("static pattern compiles"))
}

/// First run of digits in the reply; 0 when there is none (or it overflows).
pub fn parse_years(reply: &str) -> u32 {
    first_integer()
        .find(reply)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Comma-separated titles, trimmed.
pub fn split_titles(text: &str) -> Vec<String> {
    text.trim()
        .split(',')
        .map(|title| title.trim().to_string())
        .collect()
}

/// One string per line, no further structure.
pub fn split_lines(text: &str) -> Vec<String> {
    text.trim().split('\n').map(str::to_string).collect()
}
