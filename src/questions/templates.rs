//! Deterministic, template-based question generation.
//!
//! Used whenever the language model is unreachable or returns nothing usable.
//! The same inputs always produce the same questions.

use regex::Regex;
use std::sync::OnceLock;

const MAX_KEYWORDS: usize = 8;

const STOP_WORDS: &[&str] = &[
    "the", "and", "with", "from", "this", "that", "have", "will", "your", "about", "using",
    "experience", "skills", "team", "work", "role", "responsibilities", "ability", "strong",
    "knowledge", "prior", "must", "should", "high", "level", "for", "collaborate",
    "understanding", "tools", "software", "across", "years", "such", "including", "support",
    "business", "drive", "create", "range", "excellent", "communication", "solve", "build",
    "focus", "design", "deliver", "manage", "ensure",
];

const DEFAULT_KEYWORDS: &[&str] = &[
    "problem solving",
    "stakeholder communication",
    "continuous improvement",
];

const KEYWORD_TEMPLATES: &[&str] = &[
    "Can you walk me through a recent project where you applied {keyword}?",
    "How do you stay current with best practices around {keyword}?",
    "Describe a complex challenge involving {keyword} and how you solved it.",
    "How would you leverage {keyword} to deliver value as a {role}?",
    "Tell me about a time you led a team while focusing on {keyword}.",
    "What metrics do you track to measure success when working with {keyword}?",
    "How do you mentor teammates who are newer to {keyword}?",
];

const ROLE_TEMPLATES: &[&str] = &[
    "What excites you most about contributing as a {role}?",
    "How do you prioritize competing deadlines in a fast-paced environment?",
    "Describe how you ensure communication stays clear across cross-functional partners.",
    "Walk me through your approach to planning the first 90 days in this {role} role.",
    "How do you evaluate whether a solution truly solved the original problem?",
];

const FILLER_TEMPLATE: &str = "What best practices have you developed around {keyword}?";

fn token_pattern() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"[a-z][a-z0-9+\-#]*").unwrap())
}

/// Lowercased, stop-word-free keywords in first-seen order (at most 8)
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut keywords: Vec<String> = Vec::new();

    for token in token_pattern().find_iter(&lowered).map(|m| m.as_str()) {
        if token.len() < 3 || STOP_WORDS.contains(&token) {
            continue;
        }
        if !keywords.iter().any(|k| k == token) {
            keywords.push(token.to_string());
        }
        if keywords.len() >= MAX_KEYWORDS {
            break;
        }
    }

    keywords
}

/// Every template sentence is phrased as a question
fn as_question(text: String) -> String {
    if text.ends_with('?') {
        text
    } else {
        format!("{}?", text.trim_end_matches('.'))
    }
}

fn fill(template: &str, keyword: &str, role: &str) -> String {
    as_question(
        template
            .replace("{keyword}", keyword)
            .replace("{role}", role),
    )
}

/// Build exactly `num_questions` questions from the job text.
///
/// Keywords come from `job_description`, else `job_role`, else a fixed
/// default list.
pub fn generate_locally(
    job_description: Option<&str>,
    job_role: Option<&str>,
    num_questions: usize,
) -> Vec<String> {
    let role = job_role.unwrap_or("this role");

    let mut keywords = job_description.map(extract_keywords).unwrap_or_default();
    if keywords.is_empty() {
        if let Some(job_role) = job_role {
            keywords = extract_keywords(job_role);
        }
    }
    if keywords.is_empty() {
        keywords = DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect();
    }

    let mut questions: Vec<String> = Vec::with_capacity(num_questions);

    for template in KEYWORD_TEMPLATES {
        if questions.len() >= num_questions {
            break;
        }
        let keyword = &keywords[questions.len() % keywords.len()];
        questions.push(fill(template, keyword, role));
    }

    for template in ROLE_TEMPLATES {
        if questions.len() >= num_questions {
            break;
        }
        questions.push(fill(template, "", role));
    }

    while questions.len() < num_questions {
        let keyword = &keywords[questions.len() % keywords.len()];
        questions.push(fill(FILLER_TEMPLATE, keyword, role));
    }

    questions.truncate(num_questions);
    questions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_skip_stop_words_and_duplicates() {
        let keywords = extract_keywords(
            "Strong experience with Rust and Kubernetes. Rust services, gRPC, CI/CD pipelines.",
        );
        assert_eq!(
            keywords,
            vec!["rust", "kubernetes", "services", "grpc", "pipelines"]
        );
    }

    #[test]
    fn keywords_are_capped_at_eight() {
        let keywords = extract_keywords(
            "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo",
        );
        assert_eq!(keywords.len(), 8);
        assert_eq!(keywords[7], "hotel");
    }

    #[test]
    fn keywords_keep_symbols() {
        let keywords = extract_keywords("C++ and C# developers, node-js");
        assert_eq!(keywords, vec!["c++", "developers", "node-js"]);
    }

    #[test]
    fn cycles_keywords_through_templates() {
        let questions = generate_locally(Some("rust kubernetes"), Some("Backend Engineer"), 3);
        assert_eq!(
            questions,
            vec![
                "Can you walk me through a recent project where you applied rust?",
                "How do you stay current with best practices around kubernetes?",
                "Describe a complex challenge involving rust and how you solved it?",
            ]
        );
    }

    #[test]
    fn uses_default_keywords_without_job_text() {
        let questions = generate_locally(None, None, 1);
        assert_eq!(
            questions,
            vec!["Can you walk me through a recent project where you applied problem solving?"]
        );
    }

    #[test]
    fn falls_back_to_role_keywords() {
        let questions = generate_locally(Some("the and with"), Some("Data Scientist"), 1);
        assert_eq!(
            questions,
            vec!["Can you walk me through a recent project where you applied data?"]
        );
    }

    #[test]
    fn fills_with_role_templates_then_filler() {
        let questions = generate_locally(Some("python"), Some("Analyst"), 14);
        assert_eq!(questions.len(), 14);
        assert_eq!(
            questions[7],
            "What excites you most about contributing as a Analyst?"
        );
        assert_eq!(
            questions[12],
            "What best practices have you developed around python?"
        );
        assert!(questions.iter().all(|q| q.ends_with('?')));
    }

    #[test]
    fn is_deterministic() {
        let a = generate_locally(Some("golang postgres redis"), Some("SRE"), 10);
        let b = generate_locally(Some("golang postgres redis"), Some("SRE"), 10);
        assert_eq!(a, b);
    }
}
