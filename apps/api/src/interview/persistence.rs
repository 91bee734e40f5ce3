//! Persistence sink — writes the finished interview record.
//!
//! Write-behind from the core's perspective: the interview flow never depends
//! on this succeeding. Failures are reported upward as non-fatal.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::interview::session::ConversationState;
use crate::models::interview::{InterviewMessageRow, InterviewRow};

/// Aggregated sentiment counts computed by an external enrichment step.
/// The core never computes these itself; it only stores what it is handed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub positive_count: i32,
    pub neutral_count: i32,
    pub negative_count: i32,
    pub average_sentiment: f64,
}

/// Saves the finalized record: one interview row plus one row per message.
///
/// Safe to call more than once for the same session (e.g. completion then a
/// later finalize with sentiment): the interview row is upserted and message
/// rows are insert-only on (interview_id, ordinal).
pub async fn save_interview(
    pool: &PgPool,
    id: Uuid,
    state: &ConversationState,
    sentiment: Option<&SentimentSummary>,
) -> Result<()> {
    let profile = &state.profile;
    let sentiment_value = sentiment.map(serde_json::to_value).transpose()?;

    sqlx::query(
        r#"
        INSERT INTO interviews
            (id, full_name, desired_position, years_experience, tech_stack, location,
             tone, detail_level, target_language, questions_asked, completed, sentiment_summary)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (id) DO UPDATE SET
            questions_asked = EXCLUDED.questions_asked,
            completed = EXCLUDED.completed,
            sentiment_summary = COALESCE(EXCLUDED.sentiment_summary, interviews.sentiment_summary),
            updated_at = now()
        "#,
    )
    .bind(id)
    .bind(&profile.full_name)
    .bind(&profile.desired_position)
    .bind(&profile.years_experience)
    .bind(&profile.tech_stack)
    .bind(&profile.location)
    .bind(profile.tone.as_str())
    .bind(profile.detail_level.as_str())
    .bind(&profile.target_language)
    .bind(state.questions_asked as i32)
    .bind(state.completed)
    .bind(sentiment_value)
    .execute(pool)
    .await?;

    for (ordinal, message) in state.messages.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO interview_messages (interview_id, ordinal, role, content)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (interview_id, ordinal) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(ordinal as i32)
        .bind(message.role.as_str())
        .bind(&message.content)
        .execute(pool)
        .await?;
    }

    info!(
        "saved interview {} ({} messages, {} questions)",
        id,
        state.messages.len(),
        state.questions_asked
    );
    Ok(())
}

/// Loads a persisted interview row with its transcript, newest-last.
pub async fn load_interview(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<(InterviewRow, Vec<InterviewMessageRow>)>> {
    let row = sqlx::query_as::<_, InterviewRow>("SELECT * FROM interviews WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let messages = sqlx::query_as::<_, InterviewMessageRow>(
        "SELECT * FROM interview_messages WHERE interview_id = $1 ORDER BY ordinal",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some((row, messages)))
}

/// Most recent persisted interviews, capped at 100.
pub async fn list_interviews(pool: &PgPool) -> Result<Vec<InterviewRow>> {
    let rows = sqlx::query_as::<_, InterviewRow>(
        "SELECT * FROM interviews ORDER BY created_at DESC LIMIT 100",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_summary_round_trips_as_json() {
        let summary = SentimentSummary {
            positive_count: 4,
            neutral_count: 2,
            negative_count: 1,
            average_sentiment: 0.35,
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["positive_count"], 4);
        let back: SentimentSummary = serde_json::from_value(value).unwrap();
        assert_eq!(back.negative_count, 1);
    }
}
