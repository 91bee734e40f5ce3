//! Topic Extractor — pulls coarse technical keywords out of free reply text.
//!
//! Substring scan over a static vocabulary plus category marker words.
//! No LLM calls — this runs on every turn and must never fail.

use std::collections::BTreeSet;

/// Technology vocabulary scanned as lowercase substrings.
const TECHNICAL_TERMS: &[&str] = &[
    // Programming languages
    "python", "javascript", "typescript", "java", "c++", "c#", "go", "rust", "php", "ruby",
    "swift", "kotlin",
    // Frameworks and libraries
    "react", "angular", "vue", "node", "django", "flask", "express", "spring", "laravel",
    "rails",
    // Databases
    "mysql", "postgresql", "mongodb", "redis", "elasticsearch", "dynamodb", "sqlite",
    // Cloud and infrastructure
    "aws", "azure", "gcp", "docker", "kubernetes", "terraform", "jenkins", "gitlab", "github",
    // Concepts and methodologies
    "api", "rest", "graphql", "microservices", "serverless", "ci/cd", "agile", "scrum", "tdd",
    // Tools
    "git", "jira", "confluence", "figma",
];

/// Category tags emitted when any of the marker words appears.
const CATEGORY_MARKERS: &[(&str, &[&str])] = &[
    ("database", &["database", "db", "sql", "nosql"]),
    ("frontend", &["frontend", "front-end", "ui", "ux"]),
    ("backend", &["backend", "back-end", "server", "api"]),
    ("testing", &["testing", "unit test", "integration test"]),
    ("devops", &["deployment", "devops", "infrastructure"]),
];

/// Extracts lowercase topic strings from a reply.
///
/// Empty or non-technical input yields an empty set. Duplicates collapse via
/// the set; no ordering is guaranteed beyond `BTreeSet` iteration order.
pub fn extract_topics(text: &str) -> BTreeSet<String> {
    let mut topics = BTreeSet::new();
    if text.is_empty() {
        return topics;
    }

    let lower = text.to_lowercase();

    for term in TECHNICAL_TERMS {
        if lower.contains(term) {
            topics.insert((*term).to_string());
        }
    }

    for (tag, markers) in CATEGORY_MARKERS {
        if markers.iter().any(|m| lower.contains(m)) {
            topics.insert((*tag).to_string());
        }
    }

    topics
}

/// The earliest-mentioned vocabulary term in the reply.
///
/// Used to parameterize follow-up templates: the first technology a candidate
/// names is treated as the one they consider most salient.
pub fn salient_topic(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    TECHNICAL_TERMS
        .iter()
        .filter_map(|term| lower.find(term).map(|pos| (pos, *term)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, term)| term.to_string())
}

/// Renders a topic set for prompt interpolation; `fallback` covers sparse replies.
pub fn topics_for_prompt(topics: &BTreeSet<String>, fallback: &str) -> String {
    if topics.is_empty() {
        fallback.to_string()
    } else {
        topics.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}
