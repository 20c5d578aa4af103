pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};

use crate::jsearch::handlers as jsearch;
use crate::resume::handlers as resume;
use crate::state::AppState;
use crate::users::handlers as users;

/// Largest resume upload accepted, in bytes.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .merge(user_routes())
        .merge(jsearch_routes())
        .merge(resume_routes())
        .with_state(state)
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/",
            get(users::handle_list_users).post(users::handle_create_user),
        )
        .route("/users/delete_all", delete(users::handle_delete_all_users))
        .route(
            "/users/:id",
            get(users::handle_get_user)
                .put(users::handle_update_user)
                .delete(users::handle_delete_user),
        )
        .route("/users/:id/username", get(users::handle_get_username))
        .route("/users/:id/password", get(users::handle_get_password))
        .route(
            "/users/:id/recent_searches",
            get(users::handle_get_recent_searches).post(users::handle_add_recent_search),
        )
        .route(
            "/users/:id/recent_searches/latest/med_salary",
            patch(users::handle_patch_latest_salary),
        )
        .route(
            "/users/:id/recent_searches/latest/url",
            patch(users::handle_patch_latest_url),
        )
        .route(
            "/users/:id/resume_path",
            get(users::handle_get_resume_path).put(users::handle_set_resume_path),
        )
}

fn jsearch_routes() -> Router<AppState> {
    Router::new()
        .route("/get-estimated-salary", get(jsearch::handle_estimated_salary))
        .route("/jobs", get(jsearch::handle_search_jobs))
}

fn resume_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/estimate-experience",
            post(resume::handle_estimate_experience),
        )
        .route("/suggest-job-titles", post(resume::handle_suggest_job_titles))
        .route(
            "/reasons-for-job-titles",
            post(resume::handle_reasons_for_job_titles),
        )
        .route(
            "/suggest-job-titles-with-reasons",
            post(resume::handle_suggest_job_titles_with_reasons),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
