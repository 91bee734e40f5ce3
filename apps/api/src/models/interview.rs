use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Finalized interview record, one row per session.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub full_name: String,
    pub desired_position: String,
    pub years_experience: String,
    pub tech_stack: String,
    pub location: String,
    pub tone: String,
    pub detail_level: String,
    pub target_language: String,
    pub questions_asked: i32,
    pub completed: bool,
    /// Aggregated sentiment counts supplied by an external enrichment step.
    pub sentiment_summary: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One transcript entry; `ordinal` preserves insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewMessageRow {
    pub interview_id: Uuid,
    pub ordinal: i32,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
