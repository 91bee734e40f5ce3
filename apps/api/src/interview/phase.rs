//! Phase State Machine — the current stage of the interview script.
//!
//! `next_phase` is a pure function of (current phase, latest reply): the same
//! reply against the same phase always yields the same next phase. Closing is
//! never inferred here — it is driven by the orchestrator's question ceiling.
//! `General` is likewise assigned directly by the orchestrator when the
//! classifier reports a non-technical reply.

use serde::{Deserialize, Serialize};

use crate::interview::topics::extract_topics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewPhase {
    Welcome,
    Technical,
    Behavioral,
    FollowUp,
    Closing,
    General,
}

/// Replies asking to get going force the technical phase.
const START_MARKERS: &[&str] = &["start", "begin", "interview", "questions"];

/// Soft-skill marker words that pull the interview into the behavioral phase.
const BEHAVIORAL_MARKERS: &[&str] = &[
    "team", "collaboration", "conflict", "learning", "challenge", "difficult", "mentor", "lead",
    "worked with", "helped", "solved",
];

/// Computes the next phase from the latest candidate reply.
///
/// Rules, in order: no reply → stay; start keyword → Technical; any extracted
/// topic → Technical; behavioral marker → Behavioral; already Technical →
/// FollowUp (default deepening); otherwise stay.
pub fn next_phase(current: InterviewPhase, latest_reply: Option<&str>) -> InterviewPhase {
    let reply = match latest_reply {
        Some(r) if !r.trim().is_empty() => r,
        _ => return current,
    };

    let lower = reply.to_lowercase();

    if START_MARKERS.iter().any(|m| lower.contains(m)) {
        return InterviewPhase::Technical;
    }

    if !extract_topics(reply).is_empty() {
        return InterviewPhase::Technical;
    }

    if BEHAVIORAL_MARKERS.iter().any(|m| lower.contains(m)) {
        return InterviewPhase::Behavioral;
    }

    if current == InterviewPhase::Technical {
        return InterviewPhase::FollowUp;
    }

    current
}
