mod config;
mod db;
mod errors;
mod jsearch;
mod llm_client;
mod models;
mod resume;
mod routes;
mod state;
mod users;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::jsearch::JSearchClient;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::users::store::{MemoryUserStore, PgUserStore, UserStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting job assistant API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the user store
    let users: Arc<dyn UserStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            ensure_schema(&pool).await?;
            Arc::new(PgUserStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL is not set; user profiles are kept in memory only");
            Arc::new(MemoryUserStore::new())
        }
    };

    // Initialize LLM client
    let llm = LlmClient::new(config.openai_api_key.clone(), config.openai_base_url.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize job/salary API client
    let jsearch = JSearchClient::new(
        config.jsearch_base_url.clone(),
        config.jsearch_api_key.clone(),
        config.jsearch_host.clone(),
    );
    info!("Job search client initialized ({})", config.jsearch_base_url);

    info!(
        "Resume uploads are staged in {}",
        config.resume_scratch_dir.display()
    );

    // Build app state
    let state = AppState {
        users,
        llm: Arc::new(llm),
        jsearch,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
