//! Prompt Assembler — builds every instruction sent to the generation service
//! and owns the canned template pools.
//!
//! All functions here are pure given their inputs (the Rng is injected so
//! tests can seed selection). No I/O, no failures — sparse inputs fall back
//! to generic templates.

use rand::Rng;

use crate::interview::classifier::GenericKind;
use crate::interview::phase::InterviewPhase;
use crate::interview::session::CandidateProfile;
use crate::interview::topics::{extract_topics, salient_topic, topics_for_prompt};

/// Uniform pick from a named template pool.
pub fn pick<'a, R: Rng + ?Sized>(pool: &[&'a str], rng: &mut R) -> &'a str {
    pool[rng.gen_range(0..pool.len())]
}

// ────────────────────────────────────────────────────────────────────────────
// Experience buckets
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceBucket {
    Entry,
    Mid,
    Senior,
}

impl ExperienceBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceBucket::Entry => "entry",
            ExperienceBucket::Mid => "mid",
            ExperienceBucket::Senior => "senior",
        }
    }
}

const ENTRY_HINTS: &[&str] = &["entry", "junior", "0-1", "0-2", "1-2"];
const SENIOR_HINTS: &[&str] = &["senior", "lead", "principal", "5-10", "5+", "6+", "7+", "8+", "9+", "10+"];

/// Normalizes the free-form years-of-experience string into a coarse bucket.
/// Anything unrecognized lands in Mid.
pub fn experience_bucket(years_experience: &str) -> ExperienceBucket {
    let lower = years_experience.to_lowercase();
    if ENTRY_HINTS.iter().any(|h| lower.contains(h)) {
        ExperienceBucket::Entry
    } else if SENIOR_HINTS.iter().any(|h| lower.contains(h)) {
        ExperienceBucket::Senior
    } else {
        ExperienceBucket::Mid
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Language handling
// ────────────────────────────────────────────────────────────────────────────

/// Code → full name for the languages the screening flow supports.
/// Unknown codes pass through as-is so the model still gets the constraint.
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("hi", "Hindi"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("zh", "Chinese"),
    ("ar", "Arabic"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
];

/// Non-negotiable language instruction, or None for the default language.
fn language_requirement(target_language: &str) -> Option<String> {
    let code = target_language.trim();
    if code.is_empty() || code.eq_ignore_ascii_case("auto") || code.eq_ignore_ascii_case("en") {
        return None;
    }
    let name = LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, n)| *n)
        .unwrap_or(code);
    Some(format!(
        "\n\nLANGUAGE REQUIREMENT: You MUST write ALL questions in {name} ({code}). \
         Never switch to English or any other language."
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Template pools
// ────────────────────────────────────────────────────────────────────────────

const WELCOME_ENTRY: &[&str] = &[
    "Welcome {name}! I'm excited to learn about your journey into {tech_stack}. Let's start with a friendly chat about your skills and aspirations.",
    "Hi {name}! Thanks for joining us today. I'd love to explore your experience with {tech_stack} and understand your career goals.",
    "Hello {name}! I'm here to chat about your {tech_stack} skills and help us get to know each other better.",
];

const WELCOME_MID: &[&str] = &[
    "Welcome {name}! With your experience in {tech_stack}, I'm looking forward to some engaging technical discussions.",
    "Hi {name}! Your background in {tech_stack} is impressive. Let's explore your expertise.",
    "Hello {name}! I'm excited to discuss your {tech_stack} experience and understand your technical approach.",
];

const WELCOME_SENIOR: &[&str] = &[
    "Welcome {name}! Your senior-level experience with {tech_stack} is exactly what we're looking for. Let's dive deep into your expertise.",
    "Hi {name}! I'm looking forward to discussing your leadership and technical skills in {tech_stack}.",
    "Hello {name}! Your senior {tech_stack} experience speaks volumes. Let's explore your technical leadership and architectural thinking.",
];

const GREETING_RESPONSES: &[&str] = &[
    "Hello! I'm here to help with your interview. How can I assist you today?",
    "Hi there! I'm ready to continue your interview. What would you like to know?",
    "Greetings! I'm here to support your interview experience. How can I help?",
];

const HELP_RESPONSES: &[&str] = &[
    "I'm an interview assistant. I can ask technical questions, behavioral questions, and guide you through the process. What would you like to know?",
    "I'm here to conduct your interview and answer questions about the process. What can I help you with?",
    "I'm your interviewer! I can ask technical questions, discuss your experience, and help you through the interview. What would you like to explore?",
];

const THANKS_RESPONSES: &[&str] = &[
    "You're welcome! I'm here to keep your interview smooth and engaging.",
    "My pleasure! Glad I could help with your interview today.",
    "You're very welcome! I'm here to support you throughout this interview.",
];

const GOODBYE_RESPONSES: &[&str] = &[
    "Thank you for the interview! I've enjoyed our conversation. Good luck with your application!",
    "It was great interviewing you today! I appreciate you taking the time to chat. Best of luck!",
    "Thanks for a great interview session! I've learned a lot about your skills and experience. Good luck!",
];

const REDIRECT_RESPONSES: &[&str] = &[
    "I understand, but let's focus on your interview! Can you tell me about a recent project you've worked on?",
    "That's interesting, but I'm here to conduct your interview. What's the most challenging technical problem you've solved recently?",
    "Let's get back to your interview! Which libraries or frameworks are you most comfortable with, and how have you used them?",
    "I'd like to focus on the interview now. What's a technical challenge you've faced recently, and how did you approach it?",
];

const CLOSING_QUESTIONS: &[&str] = &[
    "What questions do you have for me about the role or company?",
    "Is there anything about your experience or skills that we haven't covered?",
    "What are your career goals for the next few years?",
    "What are you looking for in your next role?",
    "What would make this role a great fit for you?",
    "Is there anything else you'd like me to know about you?",
    "When would you be available to start?",
];

const EXIT_MESSAGES: &[&str] = &[
    "Thank you for your time, {name}. Our recruiters will review your responses and contact you soon. Have a great day!",
    "Thanks {name}! We've captured all your responses. Our team will be in touch shortly. Good luck!",
    "Appreciate your time, {name}. We'll review your interview and get back to you soon. Take care!",
];

/// Welcome message for the very first assistant turn, bucketed by experience.
pub fn welcome_message<R: Rng + ?Sized>(profile: &CandidateProfile, rng: &mut R) -> String {
    let pool = match experience_bucket(&profile.years_experience) {
        ExperienceBucket::Entry => WELCOME_ENTRY,
        ExperienceBucket::Mid => WELCOME_MID,
        ExperienceBucket::Senior => WELCOME_SENIOR,
    };
    pick(pool, rng)
        .replace("{name}", &profile.full_name)
        .replace("{tech_stack}", &profile.tech_stack)
}

/// Canned response for a generic utterance, by sub-kind.
pub fn generic_response<R: Rng + ?Sized>(kind: GenericKind, rng: &mut R) -> String {
    let pool = match kind {
        GenericKind::Greeting => GREETING_RESPONSES,
        GenericKind::Thanks => THANKS_RESPONSES,
        GenericKind::Goodbye => GOODBYE_RESPONSES,
        GenericKind::Redirect => REDIRECT_RESPONSES,
    };
    pick(pool, rng).to_string()
}

/// Canned response for a help request.
pub fn help_response<R: Rng + ?Sized>(rng: &mut R) -> String {
    pick(HELP_RESPONSES, rng).to_string()
}

/// Wrap-up question used when the generation service is not consulted.
pub fn closing_question<R: Rng + ?Sized>(rng: &mut R) -> String {
    pick(CLOSING_QUESTIONS, rng).to_string()
}

/// Farewell sent when the candidate issues an exit command.
pub fn exit_message<R: Rng + ?Sized>(name: &str, rng: &mut R) -> String {
    pick(EXIT_MESSAGES, rng).replace("{name}", name)
}

// ────────────────────────────────────────────────────────────────────────────
// System prompt
// ────────────────────────────────────────────────────────────────────────────

/// Fixed behavioral constraints on the generated output. Appended verbatim to
/// every system prompt.
const INTERVIEWER_RULES: &str = "\
IMPORTANT RULES:
1. NEVER give explanations or reasons for your questions
2. NEVER ask multiple questions at once
3. Ask ONE clear, focused question at a time
4. Build upon what the candidate has already shared
5. Stay within the declared tech stack and the current interview phase
6. Be conversational but professional
7. Keep responses concise and direct
8. MAINTAIN CONVERSATION FLOW - don't jump to random topics";

fn phase_directive(phase: InterviewPhase) -> &'static str {
    match phase {
        InterviewPhase::Welcome => {
            "Current Phase: Welcome - Start with a friendly greeting, then ask the first technical question"
        }
        InterviewPhase::Technical => {
            "Current Phase: Technical Interview - Deepen on the technologies the candidate has mentioned"
        }
        InterviewPhase::Behavioral => {
            "Current Phase: Behavioral Interview - Probe soft skills and work situations the candidate has described"
        }
        InterviewPhase::FollowUp => {
            "Current Phase: Follow-up - Dig into the immediately preceding answer"
        }
        InterviewPhase::Closing => {
            "Current Phase: Closing - Wrap up the interview and invite final questions"
        }
        InterviewPhase::General => {
            "Current Phase: General - Answer briefly, then redirect to the interview"
        }
    }
}

/// Builds the system context for a generation call: candidate profile, tone
/// and detail preferences, language requirement, fixed output constraints,
/// topics from the latest reply, recent-conversation fragment, and the
/// phase-specific directive.
pub fn build_system_prompt(
    profile: &CandidateProfile,
    phase: InterviewPhase,
    latest_reply: Option<&str>,
    context: &str,
) -> String {
    let language = language_requirement(&profile.target_language).unwrap_or_default();

    let mut prompt = format!(
        "You are a technical interviewer conducting a screening interview with {name}, \
         applying for {position}.\n\n\
         Experience Level: {experience}\n\
         Tech Stack: {stack}\n\
         Tone: {tone}\n\
         Detail Level: {detail}{language}\n\n\
         {rules}",
        name = profile.full_name,
        position = profile.desired_position,
        experience = profile.years_experience,
        stack = profile.tech_stack,
        tone = profile.tone.as_str(),
        detail = profile.detail_level.as_str(),
        language = language,
        rules = INTERVIEWER_RULES,
    );

    if let Some(reply) = latest_reply.filter(|r| !r.trim().is_empty()) {
        let topics = extract_topics(reply);
        prompt.push_str(&format!(
            "\n\nTheir last response mentioned: {}",
            topics_for_prompt(&topics, "their experience")
        ));
        prompt.push_str("\n\nMake your next question directly reference those topics.");
    }

    if !context.is_empty() {
        prompt.push_str(&format!("\n\nConversation context: {context}"));
        prompt.push_str("\n\nEnsure your question builds on the conversation flow.");
    }

    prompt.push_str("\n\n");
    prompt.push_str(phase_directive(phase));
    prompt
}

// ────────────────────────────────────────────────────────────────────────────
// Per-turn question prompts
// ────────────────────────────────────────────────────────────────────────────

/// Template family the per-turn task prompt is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Technical,
    Behavioral,
    /// Reply-specific deepening; parameterized by the most salient topic.
    FollowUp,
    Generic,
}

const TECHNICAL_PROMPT: &str = r#"Based on the candidate's response: "{reply}"

Tech Stack: {stack}
Experience Level: {experience}
Key Topics Mentioned: {topics}

Context: {context}

Generate ONE focused technical question that builds upon their specific response, probes their practical experience, and is appropriate for their experience level. Ask a single question that naturally flows from their response."#;

const BEHAVIORAL_PROMPT: &str = r#"Based on the candidate's response: "{reply}"

Experience Level: {experience}
Key Topics Mentioned: {topics}

Context: {context}

Generate ONE behavioral question that relates to their specific experience, probes their soft skills and work approach, and encourages a concrete example with outcomes. Ask a single question that naturally flows from their response."#;

/// Follow-up family — picked uniformly, each centered on the salient topic.
const FOLLOW_UP_PROMPTS: &[&str] = &[
    r#"The candidate just said: "{reply}"

Focus topic: {topic}
Context: {context}

Generate ONE follow-up question that digs into the technical implementation details of {topic} in their answer. Ask a single focused question."#,
    r#"The candidate just said: "{reply}"

Focus topic: {topic}
Context: {context}

Generate ONE follow-up question about the hardest challenge they faced with {topic} and how they solved it. Ask a single focused question."#,
    r#"The candidate just said: "{reply}"

Focus topic: {topic}
Context: {context}

Generate ONE follow-up question exploring the decisions and trade-offs they made around {topic}. Ask a single focused question."#,
];

const GENERIC_PROMPT: &str = r#"Based on the candidate's response: "{reply}"

Context: {context}

Generate ONE question that builds upon their response and moves the interview forward naturally. Ask a single focused question."#;

/// Truncates a reply for prompt embedding, keeping the first `max` chars.
fn reply_excerpt(reply: &str, max: usize) -> String {
    if reply.chars().count() <= max {
        reply.to_string()
    } else {
        let cut: String = reply.chars().take(max).collect();
        format!("{cut}...")
    }
}

/// Builds the per-turn task prompt for the generation service.
///
/// The follow-up family increases specificity: it is anchored on the most
/// salient extracted topic rather than the general phase template.
pub fn build_question_prompt<R: Rng + ?Sized>(
    profile: &CandidateProfile,
    latest_reply: &str,
    context: &str,
    kind: QuestionKind,
    rng: &mut R,
) -> String {
    let topics = extract_topics(latest_reply);
    let excerpt = reply_excerpt(latest_reply, 200);
    let bucket = experience_bucket(&profile.years_experience);

    let template = match kind {
        QuestionKind::Technical => TECHNICAL_PROMPT.to_string(),
        QuestionKind::Behavioral => BEHAVIORAL_PROMPT.to_string(),
        QuestionKind::FollowUp => pick(FOLLOW_UP_PROMPTS, rng).to_string(),
        QuestionKind::Generic => GENERIC_PROMPT.to_string(),
    };

    let topic = salient_topic(latest_reply).unwrap_or_else(|| "their answer".to_string());

    template
        .replace("{reply}", &excerpt)
        .replace("{stack}", &profile.tech_stack)
        .replace("{experience}", bucket.as_str())
        .replace("{topics}", &topics_for_prompt(&topics, "general technical concepts"))
        .replace("{topic}", &topic)
        .replace("{context}", context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::session::{DetailLevel, Tone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn profile(language: &str, years: &str) -> CandidateProfile {
        CandidateProfile {
            full_name: "Ana".to_string(),
            desired_position: "Backend Engineer".to_string(),
            years_experience: years.to_string(),
            tech_stack: "python, react".to_string(),
            location: "Lisbon".to_string(),
            tone: Tone::Friendly,
            detail_level: DetailLevel::Balanced,
            target_language: language.to_string(),
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_experience_bucket_normalization() {
        assert_eq!(experience_bucket("0-1 years"), ExperienceBucket::Entry);
        assert_eq!(experience_bucket("3-5 years"), ExperienceBucket::Mid);
        assert_eq!(experience_bucket("10+ years"), ExperienceBucket::Senior);
        assert_eq!(experience_bucket("Lead engineer"), ExperienceBucket::Senior);
        assert_eq!(experience_bucket("whatever"), ExperienceBucket::Mid);
    }

    #[test]
    fn test_welcome_message_references_name_and_stack() {
        let msg = welcome_message(&profile("en", "3-5 years"), &mut rng());
        assert!(msg.contains("Ana"));
        assert!(msg.contains("python, react"));
    }

    #[test]
    fn test_welcome_selection_is_deterministic_with_seed() {
        let a = welcome_message(&profile("en", "3-5 years"), &mut rng());
        let b = welcome_message(&profile("en", "3-5 years"), &mut rng());
        assert_eq!(a, b);
    }

    #[test]
    fn test_system_prompt_includes_profile_and_rules() {
        let prompt = build_system_prompt(
            &profile("en", "3-5 years"),
            InterviewPhase::Technical,
            None,
            "",
        );
        assert!(prompt.contains("Ana"));
        assert!(prompt.contains("Backend Engineer"));
        assert!(prompt.contains("python, react"));
        assert!(prompt.contains("IMPORTANT RULES"));
        assert!(prompt.contains("Technical Interview"));
    }

    #[test]
    fn test_system_prompt_default_language_has_no_requirement() {
        let prompt = build_system_prompt(
            &profile("en", "3-5 years"),
            InterviewPhase::Technical,
            None,
            "",
        );
        assert!(!prompt.contains("LANGUAGE REQUIREMENT"));
    }

    #[test]
    fn test_system_prompt_known_language_code_resolved() {
        let prompt = build_system_prompt(
            &profile("es", "3-5 years"),
            InterviewPhase::Technical,
            None,
            "",
        );
        assert!(prompt.contains("LANGUAGE REQUIREMENT"));
        assert!(prompt.contains("Spanish (es)"));
    }

    #[test]
    fn test_system_prompt_unknown_language_code_passes_through() {
        let prompt = build_system_prompt(
            &profile("xx", "3-5 years"),
            InterviewPhase::Technical,
            None,
            "",
        );
        assert!(prompt.contains("xx (xx)"));
    }

    #[test]
    fn test_system_prompt_appends_reply_topics() {
        let prompt = build_system_prompt(
            &profile("en", "3-5 years"),
            InterviewPhase::Technical,
            Some("we shipped it with docker"),
            "",
        );
        assert!(prompt.contains("docker"));
        assert!(prompt.contains("directly reference"));
    }

    #[test]
    fn test_follow_up_prompt_anchored_on_salient_topic() {
        let prompt = build_question_prompt(
            &profile("en", "3-5 years"),
            "we migrated the kubernetes cluster last spring",
            "some context",
            QuestionKind::FollowUp,
            &mut rng(),
        );
        assert!(prompt.contains("kubernetes"));
        assert!(prompt.contains("some context"));
    }

    #[test]
    fn test_follow_up_prompt_sparse_reply_falls_back() {
        let prompt = build_question_prompt(
            &profile("en", "3-5 years"),
            "it went smoothly overall and everyone agreed",
            "",
            QuestionKind::FollowUp,
            &mut rng(),
        );
        assert!(prompt.contains("their answer"));
    }

    #[test]
    fn test_long_reply_is_truncated_in_prompt() {
        let long_reply = "a".repeat(500);
        let prompt = build_question_prompt(
            &profile("en", "3-5 years"),
            &long_reply,
            "",
            QuestionKind::Technical,
            &mut rng(),
        );
        assert!(prompt.contains(&format!("{}...", "a".repeat(200))));
    }

    #[test]
    fn test_exit_message_substitutes_name() {
        let msg = exit_message("Ana", &mut rng());
        assert!(msg.contains("Ana"));
        assert!(!msg.contains("{name}"));
    }

    #[test]
    fn test_closing_question_ends_with_question_mark() {
        assert!(closing_question(&mut rng()).ends_with('?'));
    }
}
