//! Fallback question bank — canned questions keyed by technology, consulted
//! only when the generation service is unavailable or not invoked.

use rand::Rng;

use crate::interview::prompts::pick;

const PYTHON: &[&str] = &[
    "Can you explain the difference between lists and tuples in Python?",
    "How would you handle exceptions in Python?",
    "What are decorators and how do you use them?",
    "Can you explain the concept of generators in Python?",
    "What's the difference between shallow and deep copying?",
];

const JAVASCRIPT: &[&str] = &[
    "What's the difference between var, let, and const?",
    "How does hoisting work in JavaScript?",
    "How do closures work in JavaScript?",
    "What are promises and how do you use them?",
    "How do you handle asynchronous operations with async/await?",
];

const JAVA: &[&str] = &[
    "What's the difference between HashMap and HashTable?",
    "Can you explain the concept of polymorphism in Java?",
    "How does garbage collection work in Java?",
    "What are the differences between abstract classes and interfaces?",
];

const REACT: &[&str] = &[
    "What are hooks in React and how do you use them?",
    "What's the difference between state and props?",
    "How does the virtual DOM work?",
    "What are controlled and uncontrolled components?",
];

const DJANGO: &[&str] = &[
    "What is the Django ORM and how does it work?",
    "Can you walk me through Django's MVT architecture?",
    "How do you handle database migrations in Django?",
    "What are Django middleware and how do you use them?",
];

const NODE: &[&str] = &[
    "What is the event loop in Node.js?",
    "How do you handle asynchronous operations in Node.js?",
    "What are streams in Node.js?",
    "How do you handle errors in Node.js?",
];

const SQL: &[&str] = &[
    "What's the difference between INNER JOIN and LEFT JOIN?",
    "How do you optimize a slow SQL query?",
    "Can you explain the concept of database normalization?",
    "What are indexes and when would you use them?",
];

const AWS: &[&str] = &[
    "What are the main AWS services you've worked with?",
    "How do you handle security in AWS?",
    "What's the difference between EC2 and Lambda?",
    "How do you monitor applications in AWS?",
];

const DOCKER: &[&str] = &[
    "What is Docker and how does it work?",
    "What's the difference between Docker and virtual machines?",
    "What are Docker volumes and when would you use them?",
    "What is Docker Compose and how do you use it?",
];

const KUBERNETES: &[&str] = &[
    "What is Kubernetes and what are its main components?",
    "What's the difference between a Pod and a Deployment?",
    "What are Services in Kubernetes?",
    "How do you scale applications in Kubernetes?",
];

/// Technology keyword → question pool. Matched against the profile's
/// comma-separated tech stack, lowercased. Every pooled question must end
/// with '?': degraded turns serve these strings without sanitization.
const QUESTION_BANK: &[(&str, &[&str])] = &[
    ("python", PYTHON),
    ("javascript", JAVASCRIPT),
    ("java", JAVA),
    ("react", REACT),
    ("django", DJANGO),
    ("node.js", NODE),
    ("node", NODE),
    ("sql", SQL),
    ("aws", AWS),
    ("docker", DOCKER),
    ("kubernetes", KUBERNETES),
];

/// Generic fallback list used when no stack entry matches the bank.
const GENERAL_QUESTIONS: &[&str] = &[
    "Can you describe a challenging project you've worked on?",
    "How do you approach debugging complex issues?",
    "What's your experience with version control systems?",
    "How do you stay updated with technology trends?",
    "Can you describe a time when you had to learn a new technology quickly?",
    "What's your process for code review?",
    "How do you ensure code quality in your projects?",
];

/// Picks a canned question for the candidate's tech stack, falling back to
/// the general pool when nothing in the stack is covered by the bank.
pub fn bank_question<R: Rng + ?Sized>(tech_stack: &str, rng: &mut R) -> String {
    for tech in tech_stack.split(',') {
        let tech = tech.trim().to_lowercase();
        if let Some((_, pool)) = QUESTION_BANK.iter().find(|(key, _)| *key == tech) {
            return pick(pool, rng).to_string();
        }
    }
    pick(GENERAL_QUESTIONS, rng).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_matches_first_known_stack_entry() {
        let mut rng = StdRng::seed_from_u64(1);
        let q = bank_question("python, react", &mut rng);
        assert!(PYTHON.contains(&q.as_str()));
    }

    #[test]
    fn test_skips_unknown_entries() {
        let mut rng = StdRng::seed_from_u64(1);
        let q = bank_question("cobol, docker", &mut rng);
        assert!(DOCKER.contains(&q.as_str()));
    }

    #[test]
    fn test_unmatched_stack_falls_back_to_general() {
        let mut rng = StdRng::seed_from_u64(1);
        let q = bank_question("cobol, fortran", &mut rng);
        assert!(GENERAL_QUESTIONS.contains(&q.as_str()));
    }

    #[test]
    fn test_stack_matching_is_case_insensitive() {
        let mut rng = StdRng::seed_from_u64(1);
        let q = bank_question("Python", &mut rng);
        assert!(PYTHON.contains(&q.as_str()));
    }

    #[test]
    fn test_every_bank_question_ends_with_question_mark() {
        for (_, pool) in QUESTION_BANK {
            for q in *pool {
                assert!(q.ends_with('?'), "bank question missing '?': {q}");
            }
        }
        for q in GENERAL_QUESTIONS {
            assert!(q.ends_with('?'));
        }
    }
}
