mod config;
mod db;
mod errors;
mod interview;
mod llm_client;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::interview::orchestrator::InterviewConfig;
use crate::llm_client::{LlmClient, QuestionGenerator};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Scout v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL is optional: without it, finished interviews are not recorded.
    let db = match &config.database_url {
        Some(url) => match create_pool(url).await {
            Ok(pool) => {
                sqlx::migrate!("./migrations").run(&pool).await?;
                Some(pool)
            }
            Err(e) => {
                warn!("database unavailable, interviews will not be persisted: {e:?}");
                None
            }
        },
        None => {
            warn!("DATABASE_URL not set, interviews will not be persisted");
            None
        }
    };

    // The generation backend is optional: without it, questions come from the
    // static bank and candidates see a one-time notice.
    let generator: Option<Arc<dyn QuestionGenerator>> = match &config.groq_api_key {
        Some(key) => {
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(Arc::new(LlmClient::new(key.clone())))
        }
        None => {
            warn!("GROQ_API_KEY not set, falling back to the static question bank");
            None
        }
    };

    let interview_config = InterviewConfig {
        max_questions: config.max_questions,
        ..InterviewConfig::default()
    };

    let state = AppState::new(db, generator, interview_config);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
