use std::sync::Arc;

use crate::config::Config;
use crate::jsearch::JSearchClient;
use crate::llm_client::LanguageModel;
use crate::users::store::UserStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every collaborator is built in `main` and handed in, so tests can swap any of them.
#[derive(Clone)]
pub struct AppState {
    /// User profile documents. Postgres-backed, or in-memory without `DATABASE_URL`.
    pub users: Arc<dyn UserStore>,
    pub llm: Arc<dyn LanguageModel>,
    pub jsearch: JSearchClient,
    pub config: Config,
}
