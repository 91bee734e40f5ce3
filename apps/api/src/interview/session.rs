//! Conversation session state — one value per interview, owned by the caller.
//!
//! The orchestrator mutates this through `next_turn` only. There is no global
//! session singleton; the HTTP layer holds the map and serializes turns with a
//! per-session mutex.

use serde::{Deserialize, Serialize};

use crate::interview::phase::InterviewPhase;

/// Tone the generated questions should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    Friendly,
    Professional,
    Formal,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Friendly => "Friendly",
            Tone::Professional => "Professional",
            Tone::Formal => "Formal",
        }
    }
}

/// How much elaboration the questions should invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailLevel {
    Concise,
    Balanced,
    InDepth,
}

impl DetailLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailLevel::Concise => "Concise",
            DetailLevel::Balanced => "Balanced",
            DetailLevel::InDepth => "In-depth",
        }
    }
}

/// Candidate profile collected at interview start. Immutable for the lifetime
/// of the session — re-submission creates a new interview, not an edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub full_name: String,
    pub desired_position: String,
    /// Free-form bucket, e.g. "3-5 years". Normalized lazily by the prompt assembler.
    pub years_experience: String,
    /// Comma-separated technology list, e.g. "python, react".
    pub tech_stack: String,
    pub location: String,
    pub tone: Tone,
    pub detail_level: DetailLevel,
    /// ISO language code for generated questions; "auto"/"en" means no constraint.
    pub target_language: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assistant,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Assistant => "assistant",
            Role::User => "user",
        }
    }
}

/// One transcript entry. Append-only; insertion order is the sole source of
/// truth for "what was said when".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Full per-interview conversation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    pub profile: CandidateProfile,
    pub messages: Vec<Message>,
    pub phase: InterviewPhase,
    /// Assistant turns that count toward the question quota — not the raw
    /// message count. Canned greetings/thanks/help do not consume a slot.
    pub questions_asked: u32,
    /// Sticks once set; never reset within a session.
    pub completed: bool,
    /// Whether the one-time "generation unavailable" notice was already sent.
    pub degraded_notice_sent: bool,
}

impl ConversationState {
    pub fn new(profile: CandidateProfile) -> Self {
        Self {
            profile,
            messages: Vec::new(),
            phase: InterviewPhase::Welcome,
            questions_asked: 0,
            completed: false,
            degraded_notice_sent: false,
        }
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message {
            role: Role::User,
            content: content.into(),
        });
    }

    /// Most recent assistant message, if any.
    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
    }

    /// Tail window of the transcript, newest-last.
    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }
}
