//! Turns free-form model output into a clean list of questions.

use regex::Regex;
use std::sync::OnceLock;

/// Lines starting with these (lowercased) are commentary, not questions
const META_PREFIXES: &[&str] = &[
    "**",
    "why it",
    "what you",
    "ideal answer",
    "good answer",
    "red flags",
    "difficulty:",
];

const MIN_CHARS: usize = 10;
const MIN_WORDS: usize = 5;

struct Patterns {
    leading_stars: Regex,
    numbering: Regex,
    bullet: Regex,
    bold_label: Regex,
    question_split: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        leading_stars: Regex::new(r"^\*+\s*").unwrap(),
        numbering: Regex::new(r"^\d+[).\-]\s*").unwrap(),
        bullet: Regex::new(r"^[\-*]\s*").unwrap(),
        bold_label: Regex::new(r"^\*\*.*?\*\*:?\s*").unwrap(),
        question_split: Regex::new(r"\?\s*").unwrap(),
    })
}

/// Remove markdown emphasis, numbering and bullet prefixes
fn strip_prefixes(text: &str) -> String {
    let p = patterns();
    let cleaned = p.leading_stars.replace(text, "");
    let cleaned = p.numbering.replace(&cleaned, "");
    let cleaned = p.bold_label.replace(&cleaned, "");
    let cleaned = p.bullet.replace(&cleaned, "");
    cleaned.trim().to_string()
}

fn ensure_question_mark(text: &str) -> String {
    if text.ends_with('?') {
        text.to_string()
    } else {
        format!("{}?", text.trim_end_matches('.'))
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Extract up to `max_questions` questions from `content`.
///
/// Line-oriented first; if that yields fewer than requested, the raw text is
/// also split on `?` and the chunks are appended (without duplicates).
pub fn extract_questions(content: &str, max_questions: usize) -> Vec<String> {
    let p = patterns();
    let mut questions: Vec<String> = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let lowered = line.to_lowercase();
        if META_PREFIXES.iter().any(|prefix| lowered.starts_with(prefix)) {
            continue;
        }

        let cleaned = strip_prefixes(line);
        if cleaned.chars().count() < MIN_CHARS {
            continue;
        }

        let cleaned = ensure_question_mark(&cleaned);
        if word_count(&cleaned) >= MIN_WORDS {
            questions.push(cleaned);
        }
    }

    if questions.len() < max_questions {
        let chunks = p
            .question_split
            .split(content)
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty());

        for chunk in chunks.take(max_questions) {
            if chunk.chars().count() <= MIN_CHARS || word_count(chunk) < MIN_WORDS {
                continue;
            }
            let flattened = chunk.split_whitespace().collect::<Vec<_>>().join(" ");
            let question = ensure_question_mark(&strip_prefixes(&flattened));
            if !questions.contains(&question) {
                questions.push(question);
            }
        }
    }

    questions.truncate(max_questions);
    questions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_numbering_and_bullets() {
        let text = "1. Tell me about your experience with Rust services?\n\
                    - How do you approach debugging production incidents?\n\
                    * Describe a time you improved system reliability.";
        let questions = extract_questions(text, 5);
        assert_eq!(
            questions,
            vec![
                "Tell me about your experience with Rust services?",
                "How do you approach debugging production incidents?",
                "Describe a time you improved system reliability?",
            ]
        );
    }

    #[test]
    fn drops_meta_commentary_and_short_lines() {
        let text = "**Question 1**\n\
                    Why it matters: shows ownership\n\
                    Ideal answer: mentions tests\n\
                    Too short?\n\
                    How do you keep your team aligned during a migration?";
        let questions = extract_questions(text, 1);
        assert_eq!(
            questions,
            vec!["How do you keep your team aligned during a migration?"]
        );
    }

    #[test]
    fn falls_back_to_question_mark_split() {
        let text = "How do you design resilient APIs? What trade-offs do you weigh when caching data? ok";
        let questions = extract_questions(text, 3);
        // The whole line becomes one question first, then the split adds the parts
        assert_eq!(questions.len(), 3);
        assert!(questions.contains(&"How do you design resilient APIs?".to_string()));
        assert!(questions
            .contains(&"What trade-offs do you weigh when caching data?".to_string()));
        assert!(questions.iter().all(|q| q.ends_with('?')));
    }

    #[test]
    fn respects_max_questions() {
        let text = (0..10)
            .map(|i| format!("Question number {} is about your favourite project?", i))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(extract_questions(&text, 4).len(), 4);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(extract_questions("", 3).is_empty());
        assert!(extract_questions("   \n\n", 3).is_empty());
    }
}
