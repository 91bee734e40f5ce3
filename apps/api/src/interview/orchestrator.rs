//! Conversation Orchestrator — the façade over classifier, phase machine, and
//! prompt assembler.
//!
//! Flow per turn: classify reply → advance phase → decide follow-up vs
//! new-topic → build instruction → generation call → sanitize → append.
//!
//! A turn is a deterministic state transition of `ConversationState`; turns
//! for one session must never interleave (the HTTP layer serializes them with
//! a per-session mutex). Generation faults degrade to a user-visible message
//! and never corrupt state beyond the already-appended candidate reply.

use rand::Rng;
use tracing::warn;

use crate::interview::bank::bank_question;
use crate::interview::classifier::{classify, GenericKind, ResponseKind};
use crate::interview::phase::{next_phase, InterviewPhase};
use crate::interview::prompts::{
    build_question_prompt, build_system_prompt, closing_question, exit_message, generic_response,
    help_response, welcome_message, QuestionKind,
};
use crate::interview::session::{ConversationState, Role};
use crate::llm_client::{ChatMessage, GenerationRequest, QuestionGenerator, SamplingParams};

/// Static knobs for one interview. All defaults follow the screening flow:
/// 7 questions, a 10-message generation window, a 6-message context summary.
#[derive(Debug, Clone)]
pub struct InterviewConfig {
    pub max_questions: u32,
    pub history_window: usize,
    pub context_window: usize,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            max_questions: 7,
            history_window: 10,
            context_window: 6,
        }
    }
}

/// Result of one turn. Everything else (phase, counters, completion) is read
/// off the mutated `ConversationState`.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub message: String,
    /// Whether this turn consumed a question slot.
    pub counted: bool,
}

/// Commands that immediately terminate the interview, matched exactly after
/// trim + lowercase. Checked before classification.
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "bye", "goodbye", "end", "finish"];

/// Markers that make unpunctuated generated text still read as a question.
const INTERROGATIVE_MARKERS: &[&str] = &[
    "can you", "what", "how", "why", "when", "where", "describe", "explain",
];

const DEGRADED_NOTICE: &str =
    "Note: question generation is currently unavailable, so I'll continue with questions \
     from our standard bank.";

/// Runs one turn of the interview.
///
/// `latest_reply = None` produces the opening assistant turn (greeting plus
/// first question). `generator = None` runs the interview in degraded mode
/// against the fallback question bank.
pub async fn next_turn<R: Rng + Send>(
    state: &mut ConversationState,
    latest_reply: Option<&str>,
    generator: Option<&dyn QuestionGenerator>,
    config: &InterviewConfig,
    rng: &mut R,
) -> TurnOutcome {
    if state.completed {
        // Terminated sessions only ever get a farewell; the flag never resets.
        return TurnOutcome {
            message: generic_response(GenericKind::Goodbye, rng),
            counted: false,
        };
    }

    match latest_reply {
        None => opening_turn(state, generator, config, rng).await,
        Some(reply) => reply_turn(state, reply, generator, config, rng).await,
    }
}

/// First assistant turn: experience-bucketed welcome plus the first question.
async fn opening_turn<R: Rng + Send>(
    state: &mut ConversationState,
    generator: Option<&dyn QuestionGenerator>,
    config: &InterviewConfig,
    rng: &mut R,
) -> TurnOutcome {
    let question = match generator {
        Some(g) => {
            let system = build_system_prompt(&state.profile, state.phase, None, "");
            let task = build_question_prompt(&state.profile, "", "", QuestionKind::Generic, rng);
            let request = build_request(state, config, system, task);
            match g.generate(&request).await {
                Ok(text) => sanitize_question(&text),
                Err(e) => {
                    // The interview must still start; fall back to the bank.
                    warn!("opening question generation failed, using bank: {e}");
                    bank_question(&state.profile.tech_stack, rng)
                }
            }
        }
        None => degraded_question(state, InterviewPhase::Welcome, rng),
    };

    let message = format!("{} {}", welcome_message(&state.profile, rng), question);
    state.push_assistant(&message);
    state.questions_asked += 1;
    if state.questions_asked >= config.max_questions {
        state.completed = true;
    }

    TurnOutcome {
        message,
        counted: true,
    }
}

async fn reply_turn<R: Rng + Send>(
    state: &mut ConversationState,
    reply: &str,
    generator: Option<&dyn QuestionGenerator>,
    config: &InterviewConfig,
    rng: &mut R,
) -> TurnOutcome {
    // Follow-up detection looks at the transcript before this reply lands.
    let follow_up = should_follow_up(state, reply);
    state.push_user(reply);

    if EXIT_COMMANDS.contains(&reply.trim().to_lowercase().as_str()) {
        let message = exit_message(&state.profile.full_name, rng);
        state.push_assistant(&message);
        state.completed = true;
        return TurnOutcome {
            message,
            counted: false,
        };
    }

    match classify(reply) {
        ResponseKind::Help => {
            let message = help_response(rng);
            state.push_assistant(&message);
            state.phase = InterviewPhase::General;
            TurnOutcome {
                message,
                counted: false,
            }
        }
        ResponseKind::Generic(kind) => {
            let message = generic_response(kind, rng);
            state.push_assistant(&message);
            state.phase = InterviewPhase::General;
            // A redirect displaces a real question, so it consumes a slot;
            // greetings/thanks/goodbyes do not.
            let counted = kind == GenericKind::Redirect;
            if counted {
                state.questions_asked += 1;
                if state.questions_asked >= config.max_questions {
                    state.completed = true;
                }
            }
            TurnOutcome { message, counted }
        }
        ResponseKind::Technical => {
            question_turn(state, reply, follow_up, generator, config, rng).await
        }
    }
}

/// A real question turn: phase transition, instruction build, generation,
/// sanitization, counter bookkeeping.
async fn question_turn<R: Rng + Send>(
    state: &mut ConversationState,
    reply: &str,
    follow_up: bool,
    generator: Option<&dyn QuestionGenerator>,
    config: &InterviewConfig,
    rng: &mut R,
) -> TurnOutcome {
    let new_phase = next_phase(state.phase, Some(reply));

    // The ceiling turn gets a closing question instead of the phase directive.
    let final_slot = state.questions_asked + 1 >= config.max_questions;
    let directive_phase = if final_slot {
        InterviewPhase::Closing
    } else {
        new_phase
    };

    let context = conversation_context(state, config.context_window);

    let question = match generator {
        Some(g) => {
            let system = build_system_prompt(&state.profile, directive_phase, Some(reply), &context);
            let kind = if final_slot {
                QuestionKind::Generic
            } else if follow_up {
                QuestionKind::FollowUp
            } else {
                match new_phase {
                    InterviewPhase::Behavioral => QuestionKind::Behavioral,
                    InterviewPhase::Technical | InterviewPhase::FollowUp => QuestionKind::Technical,
                    _ => QuestionKind::Generic,
                }
            };
            let task = build_question_prompt(&state.profile, reply, &context, kind, rng);
            let request = build_request(state, config, system, task);

            match g.generate(&request).await {
                Ok(text) => sanitize_question(&text),
                Err(e) => {
                    // Single user-visible message; no retry, no state change
                    // beyond the candidate reply appended above.
                    warn!("question generation failed: {e}");
                    return TurnOutcome {
                        message: format!("Unable to generate a question right now: {e}"),
                        counted: false,
                    };
                }
            }
        }
        None => degraded_question(state, directive_phase, rng),
    };

    state.push_assistant(&question);
    state.questions_asked += 1;
    state.phase = directive_phase;
    if state.questions_asked >= config.max_questions {
        state.completed = true;
    }

    TurnOutcome {
        message: question,
        counted: true,
    }
}

/// Question served when the generation service is absent. The first degraded
/// turn carries a one-time explanatory notice.
fn degraded_question<R: Rng + ?Sized>(
    state: &mut ConversationState,
    directive_phase: InterviewPhase,
    rng: &mut R,
) -> String {
    let question = if directive_phase == InterviewPhase::Closing {
        closing_question(rng)
    } else {
        bank_question(&state.profile.tech_stack, rng)
    };

    if state.degraded_notice_sent {
        question
    } else {
        state.degraded_notice_sent = true;
        warn!("generation service unavailable, serving bank question");
        format!("{DEGRADED_NOTICE} {question}")
    }
}

/// True when the previous assistant message was a question, the reply is
/// substantive (> 10 chars trimmed), and at least two prior messages exist.
fn should_follow_up(state: &ConversationState, reply: &str) -> bool {
    if state.messages.len() < 2 {
        return false;
    }
    let asked_question = state
        .last_assistant()
        .map(|m| m.content.ends_with('?'))
        .unwrap_or(false);
    asked_question && reply.trim().chars().count() > 10
}

/// Lightweight summary of the recent exchange, fed into the system prompt for
/// continuity. The candidate's latest reply is the last entry by the time
/// this runs.
fn conversation_context(state: &ConversationState, window: usize) -> String {
    let recent = state.recent(window);
    if recent.is_empty() {
        return "Starting new interview".to_string();
    }

    let mut parts = Vec::new();
    for message in recent {
        match message.role {
            Role::Assistant if message.content.ends_with('?') => {
                parts.push(format!("Interviewer asked: {}", message.content));
            }
            Role::Assistant => {}
            Role::User => {
                let excerpt: String = message.content.chars().take(100).collect();
                parts.push(format!("Candidate responded: {excerpt}..."));
            }
        }
    }

    if parts.is_empty() {
        "No recent context".to_string()
    } else {
        parts.join(" | ")
    }
}

/// Assembles the wire request: system instruction plus the capped tail of the
/// transcript (the latest candidate reply is already in the transcript); the
/// task prompt rides as the final user message.
fn build_request(
    state: &ConversationState,
    config: &InterviewConfig,
    system: String,
    task: String,
) -> GenerationRequest {
    let mut messages: Vec<ChatMessage> = state
        .recent(config.history_window)
        .iter()
        .map(|m| ChatMessage::new(m.role.as_str(), m.content.clone()))
        .collect();
    messages.push(ChatMessage::new("user", task));

    GenerationRequest {
        system,
        messages,
        params: SamplingParams::default(),
    }
}

/// Repairs generated text deterministically: trim, drop everything after the
/// first blank line, and append an elicitation clause when the remainder
/// neither ends in `?` nor contains an interrogative marker.
pub fn sanitize_question(text: &str) -> String {
    let mut cleaned = text.trim();
    if let Some(idx) = cleaned.find("\n\n") {
        cleaned = cleaned[..idx].trim();
    }

    let lower = cleaned.to_lowercase();
    let looks_like_question =
        cleaned.ends_with('?') || INTERROGATIVE_MARKERS.iter().any(|m| lower.contains(m));

    if looks_like_question {
        cleaned.to_string()
    } else {
        format!("{cleaned} Can you elaborate on that?")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::session::{CandidateProfile, DetailLevel, Tone};
    use crate::llm_client::LlmError;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct CannedGenerator(&'static str);

    #[async_trait]
    impl QuestionGenerator for CannedGenerator {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl QuestionGenerator for FailingGenerator {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 500,
                message: "upstream unavailable".to_string(),
            })
        }
    }

    fn profile() -> CandidateProfile {
        CandidateProfile {
            full_name: "Ana".to_string(),
            desired_position: "Backend Engineer".to_string(),
            years_experience: "3-5 years".to_string(),
            tech_stack: "python, react".to_string(),
            location: "Lisbon".to_string(),
            tone: Tone::Professional,
            detail_level: DetailLevel::Concise,
            target_language: "en".to_string(),
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    async fn opened_state() -> ConversationState {
        let mut state = ConversationState::new(profile());
        let config = InterviewConfig::default();
        next_turn(&mut state, None, None, &config, &mut rng()).await;
        state
    }

    #[tokio::test]
    async fn test_opening_turn_greets_and_asks_one_question() {
        let mut state = ConversationState::new(profile());
        let config = InterviewConfig::default();
        let outcome = next_turn(&mut state, None, None, &config, &mut rng()).await;

        assert!(outcome.message.contains("Ana"));
        assert!(outcome.message.contains("python, react"));
        assert!(outcome.message.ends_with('?'));
        assert!(outcome.counted);
        assert_eq!(state.questions_asked, 1);
        assert_eq!(state.phase, InterviewPhase::Welcome);
    }

    #[tokio::test]
    async fn test_thanks_gets_canned_response_without_consuming_slot() {
        let mut state = opened_state().await;
        let config = InterviewConfig::default();
        let before = state.questions_asked;

        let outcome = next_turn(&mut state, Some("Thanks!"), None, &config, &mut rng()).await;

        assert!(!outcome.counted);
        assert_eq!(state.questions_asked, before);
        assert_eq!(state.phase, InterviewPhase::General);
        let lower = outcome.message.to_lowercase();
        assert!(lower.contains("welcome") || lower.contains("pleasure"));
    }

    #[tokio::test]
    async fn test_redirect_consumes_a_question_slot() {
        let mut state = opened_state().await;
        let config = InterviewConfig::default();
        let before = state.questions_asked;

        let outcome = next_turn(&mut state, Some("ok"), None, &config, &mut rng()).await;

        assert!(outcome.counted);
        assert_eq!(state.questions_asked, before + 1);
        assert_eq!(state.phase, InterviewPhase::General);
    }

    #[tokio::test]
    async fn test_technical_reply_advances_phase_and_counter() {
        let mut state = opened_state().await;
        let config = InterviewConfig::default();

        let outcome = next_turn(
            &mut state,
            Some("I built data pipelines in python with airflow"),
            None,
            &config,
            &mut rng(),
        )
        .await;

        assert!(outcome.counted);
        assert_eq!(state.questions_asked, 2);
        assert_eq!(state.phase, InterviewPhase::Technical);
        assert_ne!(state.phase, InterviewPhase::Welcome);
    }

    #[tokio::test]
    async fn test_exit_command_completes_session() {
        let mut state = opened_state().await;
        let config = InterviewConfig::default();

        let outcome = next_turn(&mut state, Some("quit"), None, &config, &mut rng()).await;

        assert!(state.completed);
        assert!(!outcome.counted);
        assert!(outcome.message.contains("Ana"));
    }

    #[tokio::test]
    async fn test_completion_flag_never_resets() {
        let mut state = opened_state().await;
        let config = InterviewConfig::default();

        next_turn(&mut state, Some("quit"), None, &config, &mut rng()).await;
        assert!(state.completed);

        let questions_before = state.questions_asked;
        next_turn(
            &mut state,
            Some("actually let's keep going with python"),
            None,
            &config,
            &mut rng(),
        )
        .await;

        assert!(state.completed);
        assert_eq!(state.questions_asked, questions_before);
    }

    #[tokio::test]
    async fn test_question_ceiling_sets_completion() {
        let mut state = ConversationState::new(profile());
        let config = InterviewConfig {
            max_questions: 2,
            ..Default::default()
        };

        next_turn(&mut state, None, None, &config, &mut rng()).await;
        assert!(!state.completed);

        next_turn(
            &mut state,
            Some("I mostly worked with python services"),
            None,
            &config,
            &mut rng(),
        )
        .await;

        assert!(state.completed);
        assert_eq!(state.questions_asked, 2);
        assert_eq!(state.phase, InterviewPhase::Closing);
    }

    #[tokio::test]
    async fn test_counter_is_monotone_across_mixed_turns() {
        let mut state = opened_state().await;
        let config = InterviewConfig::default();
        let mut last = state.questions_asked;

        for reply in ["hello there", "Thanks!", "ok", "I shipped a django app", "quit"] {
            next_turn(&mut state, Some(reply), None, &config, &mut rng()).await;
            assert!(state.questions_asked >= last);
            assert!(state.questions_asked - last <= 1);
            last = state.questions_asked;
        }
    }

    #[tokio::test]
    async fn test_generation_failure_leaves_state_intact() {
        let mut state = opened_state().await;
        let config = InterviewConfig::default();
        let questions_before = state.questions_asked;
        let phase_before = state.phase;
        let generator = FailingGenerator;

        let outcome = next_turn(
            &mut state,
            Some("I built the billing system in python"),
            Some(&generator),
            &config,
            &mut rng(),
        )
        .await;

        assert!(outcome.message.contains("Unable to generate"));
        assert!(!outcome.counted);
        assert_eq!(state.questions_asked, questions_before);
        assert_eq!(state.phase, phase_before);
        // The candidate's own message is the only new transcript entry.
        assert_eq!(state.messages.last().unwrap().role, Role::User);
    }

    #[tokio::test]
    async fn test_generated_text_is_sanitized_end_to_end() {
        let mut state = opened_state().await;
        let config = InterviewConfig::default();
        let generator = CannedGenerator("Tell me more.\n\nI ask because the topic is broad.");

        let outcome = next_turn(
            &mut state,
            Some("I built the billing system in python"),
            Some(&generator),
            &config,
            &mut rng(),
        )
        .await;

        assert_eq!(outcome.message, "Tell me more. Can you elaborate on that?");
        assert_eq!(state.messages.last().unwrap().content, outcome.message);
    }

    #[tokio::test]
    async fn test_degraded_notice_sent_exactly_once() {
        let mut state = ConversationState::new(profile());
        let config = InterviewConfig::default();

        let first = next_turn(&mut state, None, None, &config, &mut rng()).await;
        assert!(first.message.contains("currently unavailable"));

        let second = next_turn(
            &mut state,
            Some("I worked a lot with react hooks"),
            None,
            &config,
            &mut rng(),
        )
        .await;
        assert!(!second.message.contains("currently unavailable"));
    }

    #[test]
    fn test_sanitize_truncates_and_appends_elicitation() {
        assert_eq!(
            sanitize_question("Tell me more.\n\nI ask because..."),
            "Tell me more. Can you elaborate on that?"
        );
    }

    #[test]
    fn test_sanitize_keeps_well_formed_question() {
        assert_eq!(
            sanitize_question("  What is a closure?  "),
            "What is a closure?"
        );
    }

    #[test]
    fn test_sanitize_accepts_interrogative_marker_without_question_mark() {
        assert_eq!(
            sanitize_question("Describe your deployment process."),
            "Describe your deployment process."
        );
    }

    #[test]
    fn test_should_follow_up_requires_prior_question() {
        let mut state = ConversationState::new(profile());
        assert!(!should_follow_up(&state, "a long and detailed answer"));

        state.push_assistant("Welcome!");
        state.push_user("hi");
        assert!(!should_follow_up(&state, "a long and detailed answer"));

        state.push_assistant("How do you test your code?");
        assert!(should_follow_up(&state, "a long and detailed answer"));
        assert!(!should_follow_up(&state, "short"));
    }

    #[test]
    fn test_conversation_context_labels_roles() {
        let mut state = ConversationState::new(profile());
        state.push_assistant("How do you test your code?");
        state.push_user("mostly with pytest and a lot of fixtures");

        let context = conversation_context(&state, 6);
        assert!(context.contains("Interviewer asked: How do you test your code?"));
        assert!(context.contains("Candidate responded: mostly with pytest"));
    }

    #[test]
    fn test_conversation_context_empty_transcript() {
        let state = ConversationState::new(profile());
        assert_eq!(conversation_context(&state, 6), "Starting new interview");
    }
}
