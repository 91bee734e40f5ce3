//! Response Classifier — decides whether a reply is a real interview answer,
//! a generic/off-topic utterance, or a request for help.
//!
//! This is a priority-ordered rule list, NOT independent boolean checks: the
//! first matching rule wins, so a short "hi" is always a greeting even when it
//! also contains an off-topic word. The rule order below is a frozen contract
//! covered by tests — do not reorder without updating them.

/// Sub-type of a generic (non-interview) utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericKind {
    Greeting,
    Thanks,
    Goodbye,
    /// Off-topic or filler replies that displace a real question.
    Redirect,
}

/// Classification result for one candidate reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// A substantive answer — feeds the phase machine and prompt assembler.
    Technical,
    /// A question about the process; answered from the help pool.
    Help,
    Generic(GenericKind),
}

// Rule word lists, named so the evaluation order is auditable.
const GREETING_MARKERS: &[&str] = &["hello", "hi", "hey"];
const HELP_MARKERS: &[&str] = &["help", "what", "how"];
const THANKS_MARKERS: &[&str] = &["thanks", "thank you"];
const GOODBYE_MARKERS: &[&str] = &["goodbye", "bye", "see you"];

/// Everyday-life nouns that signal the candidate has drifted off topic.
const OFF_TOPIC_WORDS: &[&str] = &[
    "apple", "banana", "food", "weather", "sports", "movie", "music", "game", "car", "house",
    "pet", "family", "friend", "school", "college", "university",
];

/// Filler tokens matched exactly (after trim + lowercase).
const FILLER_TOKENS: &[&str] = &[
    "okay", "ok", "yes", "no", "maybe", "sure", "fine", "good", "bad",
];

fn contains_any(haystack: &str, words: &[&str]) -> bool {
    words.iter().any(|w| haystack.contains(w))
}

/// Classifies one reply. Rules fire in order; anything that survives them all
/// is treated as a technical answer — ambiguity favors continuing the
/// interview over failing it.
pub fn classify(text: &str) -> ResponseKind {
    let trimmed = text.trim();

    // Rule 1: too short to carry an answer
    if trimmed.chars().count() <= 3 {
        return ResponseKind::Generic(GenericKind::Redirect);
    }

    let lower = trimmed.to_lowercase();

    // Rule 2: greeting
    if contains_any(&lower, GREETING_MARKERS) {
        return ResponseKind::Generic(GenericKind::Greeting);
    }
    // Rule 3: help request
    if contains_any(&lower, HELP_MARKERS) {
        return ResponseKind::Help;
    }
    // Rule 4: thanks
    if contains_any(&lower, THANKS_MARKERS) {
        return ResponseKind::Generic(GenericKind::Thanks);
    }
    // Rule 5: goodbye
    if contains_any(&lower, GOODBYE_MARKERS) {
        return ResponseKind::Generic(GenericKind::Goodbye);
    }
    // Rule 6: off-topic everyday nouns
    if contains_any(&lower, OFF_TOPIC_WORDS) {
        return ResponseKind::Generic(GenericKind::Redirect);
    }
    // Rule 7: bare filler tokens
    if FILLER_TOKENS.contains(&lower.as_str()) {
        return ResponseKind::Generic(GenericKind::Redirect);
    }

    // Rule 8: interview-domain keywords or no match at all
    ResponseKind::Technical
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_reply_is_redirect() {
        assert_eq!(classify("ok"), ResponseKind::Generic(GenericKind::Redirect));
        assert_eq!(classify("  no "), ResponseKind::Generic(GenericKind::Redirect));
        assert_eq!(classify("idk"), ResponseKind::Generic(GenericKind::Redirect));
    }

    #[test]
    fn test_greeting_detected() {
        assert_eq!(
            classify("hello there"),
            ResponseKind::Generic(GenericKind::Greeting)
        );
    }

    #[test]
    fn test_rule_order_greeting_beats_off_topic() {
        // Contains both a greeting marker and an off-topic word; rule 2 fires first.
        assert_eq!(
            classify("hi, nice weather today"),
            ResponseKind::Generic(GenericKind::Greeting)
        );
    }

    #[test]
    fn test_help_request() {
        assert_eq!(classify("what should I do next"), ResponseKind::Help);
    }

    #[test]
    fn test_thanks_detected() {
        assert_eq!(
            classify("Thanks!"),
            ResponseKind::Generic(GenericKind::Thanks)
        );
    }

    #[test]
    fn test_goodbye_detected() {
        assert_eq!(
            classify("alright, see you later"),
            ResponseKind::Generic(GenericKind::Goodbye)
        );
    }

    #[test]
    fn test_off_topic_noun_redirects() {
        assert_eq!(
            classify("my pet just ran across the keyboard"),
            ResponseKind::Generic(GenericKind::Redirect)
        );
    }

    #[test]
    fn test_filler_token_exact_match_redirects() {
        assert_eq!(
            classify("sure"),
            ResponseKind::Generic(GenericKind::Redirect)
        );
    }

    #[test]
    fn test_maybe_falls_through_to_filler_rule() {
        // No earlier marker matches ("maybe" does not contain "bye"), so the
        // exact-match filler rule fires.
        assert_eq!(
            classify("maybe"),
            ResponseKind::Generic(GenericKind::Redirect)
        );
    }

    #[test]
    fn test_substantive_answer_is_technical() {
        assert_eq!(
            classify("I built the ingestion service in python with celery workers"),
            ResponseKind::Technical
        );
    }

    #[test]
    fn test_unmatched_reply_defaults_to_technical() {
        assert_eq!(classify("yes it was tough"), ResponseKind::Technical);
    }
}
