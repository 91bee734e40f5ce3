//! HTTP handlers for the interview endpoints.
//!
//! Each session lives behind its own mutex, so turns for one interview are
//! strictly serialized while different interviews proceed in parallel.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::orchestrator::next_turn;
use crate::interview::persistence::{
    list_interviews as list_interview_rows, load_interview, save_interview, SentimentSummary,
};
use crate::interview::phase::InterviewPhase;
use crate::interview::session::{CandidateProfile, ConversationState, DetailLevel, Message, Tone};
use crate::models::interview::{InterviewMessageRow, InterviewRow};
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Request / response types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub full_name: String,
    #[serde(default)]
    pub desired_position: String,
    #[serde(default)]
    pub years_experience: String,
    pub tech_stack: String,
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_tone")]
    pub tone: Tone,
    #[serde(default = "default_detail_level")]
    pub detail_level: DetailLevel,
    #[serde(default = "default_language")]
    pub target_language: String,
}

fn default_tone() -> Tone {
    Tone::Professional
}

fn default_detail_level() -> DetailLevel {
    DetailLevel::Concise
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct FinalizeRequest {
    pub sentiment: Option<SentimentSummary>,
}

/// The assistant's side of one turn, plus the session's observable state.
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub interview_id: Uuid,
    pub message: String,
    pub phase: InterviewPhase,
    pub questions_asked: u32,
    pub completed: bool,
    /// Whether this turn consumed a question slot.
    pub counted: bool,
    /// Whether the finished record was written to the database this turn.
    pub persisted: bool,
}

#[derive(Debug, Serialize)]
pub struct InterviewSnapshot {
    pub interview_id: Uuid,
    pub profile: CandidateProfile,
    pub messages: Vec<Message>,
    pub phase: InterviewPhase,
    pub questions_asked: u32,
    pub completed: bool,
}

/// Persisted record plus its transcript rows, as stored in the database.
#[derive(Debug, Serialize)]
pub struct PersistedInterview {
    pub interview: InterviewRow,
    pub messages: Vec<InterviewMessageRow>,
}

#[derive(Debug, Serialize)]
pub struct FinalizeResponse {
    pub interview_id: Uuid,
    pub completed: bool,
    pub persisted: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews — create a session and produce the opening turn.
pub async fn start_interview(
    State(state): State<AppState>,
    Json(req): Json<StartInterviewRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    if req.full_name.trim().is_empty() {
        return Err(AppError::Validation("full_name must not be empty".into()));
    }
    if req.tech_stack.trim().is_empty() {
        return Err(AppError::Validation("tech_stack must not be empty".into()));
    }

    let profile = CandidateProfile {
        full_name: req.full_name.trim().to_string(),
        desired_position: req.desired_position.trim().to_string(),
        years_experience: req.years_experience.trim().to_string(),
        tech_stack: req.tech_stack.trim().to_string(),
        location: req.location.trim().to_string(),
        tone: req.tone,
        detail_level: req.detail_level,
        target_language: req.target_language.trim().to_string(),
    };

    let id = Uuid::new_v4();
    let mut conversation = ConversationState::new(profile);
    let mut rng = StdRng::from_entropy();

    let outcome = next_turn(
        &mut conversation,
        None,
        state.generator.as_deref(),
        &state.interview_config,
        &mut rng,
    )
    .await;

    info!(
        "started interview {} for '{}' ({})",
        id, conversation.profile.full_name, conversation.profile.tech_stack
    );

    let response = TurnResponse {
        interview_id: id,
        message: outcome.message,
        phase: conversation.phase,
        questions_asked: conversation.questions_asked,
        completed: conversation.completed,
        counted: outcome.counted,
        persisted: false,
    };

    state
        .sessions
        .write()
        .await
        .insert(id, Arc::new(Mutex::new(conversation)));

    Ok(Json(response))
}

/// POST /api/v1/interviews/:id/messages — run one turn on a candidate reply.
pub async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::Validation("text must not be empty".into()));
    }

    let session = lookup_session(&state, id).await?;
    let mut conversation = session.lock().await;
    let was_completed = conversation.completed;
    let mut rng = StdRng::from_entropy();

    let outcome = next_turn(
        &mut conversation,
        Some(&req.text),
        state.generator.as_deref(),
        &state.interview_config,
        &mut rng,
    )
    .await;

    // Write-behind on the completion edge only; failures never fail the turn.
    let mut persisted = false;
    if conversation.completed && !was_completed {
        if let Some(pool) = &state.db {
            match save_interview(pool, id, &conversation, None).await {
                Ok(()) => persisted = true,
                Err(e) => warn!("failed to persist interview {id}: {e:?}"),
            }
        }
    }

    Ok(Json(TurnResponse {
        interview_id: id,
        message: outcome.message,
        phase: conversation.phase,
        questions_asked: conversation.questions_asked,
        completed: conversation.completed,
        counted: outcome.counted,
        persisted,
    }))
}

/// GET /api/v1/interviews/:id — current transcript and counters.
pub async fn get_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewSnapshot>, AppError> {
    let session = lookup_session(&state, id).await?;
    let conversation = session.lock().await;

    Ok(Json(InterviewSnapshot {
        interview_id: id,
        profile: conversation.profile.clone(),
        messages: conversation.messages.clone(),
        phase: conversation.phase,
        questions_asked: conversation.questions_asked,
        completed: conversation.completed,
    }))
}

/// POST /api/v1/interviews/:id/finalize — terminate the session and persist,
/// optionally attaching an externally computed sentiment summary.
pub async fn finalize_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<FinalizeRequest>,
) -> Result<Json<FinalizeResponse>, AppError> {
    let session = lookup_session(&state, id).await?;
    let mut conversation = session.lock().await;
    conversation.completed = true;

    let mut persisted = false;
    if let Some(pool) = &state.db {
        match save_interview(pool, id, &conversation, req.sentiment.as_ref()).await {
            Ok(()) => persisted = true,
            Err(e) => warn!("failed to persist interview {id}: {e:?}"),
        }
    }

    Ok(Json(FinalizeResponse {
        interview_id: id,
        completed: true,
        persisted,
    }))
}

/// GET /api/v1/interviews — persisted records, newest first. Empty when no
/// database is configured.
pub async fn list_interviews(
    State(state): State<AppState>,
) -> Result<Json<Vec<InterviewRow>>, AppError> {
    let Some(pool) = &state.db else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(list_interview_rows(pool).await?))
}

/// GET /api/v1/interviews/:id/record — the persisted record with its
/// transcript rows.
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PersistedInterview>, AppError> {
    let pool = state
        .db
        .as_ref()
        .ok_or_else(|| AppError::NotFound("no persisted records available".into()))?;

    match load_interview(pool, id).await? {
        Some((interview, messages)) => Ok(Json(PersistedInterview {
            interview,
            messages,
        })),
        None => Err(AppError::NotFound(format!(
            "interview record {id} not found"
        ))),
    }
}

async fn lookup_session(
    state: &AppState,
    id: Uuid,
) -> Result<Arc<Mutex<ConversationState>>, AppError> {
    state
        .sessions
        .read()
        .await
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("interview {id} not found")))
}
