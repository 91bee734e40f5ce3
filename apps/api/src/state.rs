use std::collections::HashMap;
use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::interview::orchestrator::InterviewConfig;
use crate::interview::session::ConversationState;
use crate::llm_client::QuestionGenerator;

/// Live interview sessions keyed by id. Each session carries its own lock so
/// concurrent turns on different interviews never contend with each other.
pub type SessionMap = Arc<RwLock<HashMap<Uuid, Arc<Mutex<ConversationState>>>>>;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Persistence sink. `None` means finished interviews are not recorded.
    pub db: Option<PgPool>,
    /// Question generation backend. `None` means the static bank is used.
    pub generator: Option<Arc<dyn QuestionGenerator>>,
    pub interview_config: InterviewConfig,
    pub sessions: SessionMap,
}

impl AppState {
    pub fn new(
        db: Option<PgPool>,
        generator: Option<Arc<dyn QuestionGenerator>>,
        interview_config: InterviewConfig,
    ) -> Self {
        AppState {
            db,
            generator,
            interview_config,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}
