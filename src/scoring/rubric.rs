//! The evaluation rubric sent to the model and the parser for its answer.
//!
//! The prompt's example format and the parser's marker strings live side by
//! side here; change both together.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const CLARITY_MARKER: &str = "Clarity & Structure:";
pub const GRAMMAR_MARKER: &str = "Grammar & Vocabulary:";
pub const CONCISENESS_MARKER: &str = "Conciseness";
pub const PROFESSIONALISM_MARKER: &str = "Professionalism:";
pub const CONFIDENCE_MARKER: &str = "Confidence:";
pub const ENGAGEMENT_MARKER: &str = "Engagement:";
pub const LINGUISTIC_AVG_MARKER: &str = "Linguistic Avg:";
pub const BEHAVIORAL_AVG_MARKER: &str = "Behavioral Avg:";
pub const FINAL_SCORE_MARKER: &str = "Final Score:";
pub const SUMMARY_MARKER: &str = "Summary:";
pub const STRENGTHS_MARKER: &str = "Strengths:";
pub const IMPROVEMENTS_MARKER: &str = "Areas for improvement:";

pub const DEFAULT_SUMMARY: &str = "Evaluation completed. Review detailed scores above.";

const LINGUISTIC_WEIGHT: f64 = 0.5;
const BEHAVIORAL_WEIGHT: f64 = 0.5;

const PROMPT_TEMPLATE: &str = "You are an HR evaluation assistant. Your task is to analyze an interview transcript and provide scores on a rubric. Evaluate both linguistic and behavioral dimensions. Give each category a score out of 10 and include a short justification. Provide a final weighted score out of 10.

Rubric:
1. Linguistic Competence (50%)
- Clarity & Structure (0-10): Are responses well-structured, clear, and easy to follow?
- Grammar & Vocabulary (0-10): Is the candidate's language professional, correct, and varied?
- Conciseness & Relevance (0-10): Does the candidate avoid filler words and stay on point?
Overall Linguistic Score = Average of the three above.

2. Behavioral Competence (50%)
- Professionalism (0-10): Politeness, tone, and ability to maintain professionalism.
- Confidence & Delivery (0-10): Does the candidate project confidence and self-assurance?
- Engagement & Adaptability (0-10): Does the candidate answer thoughtfully, adapt to questions, and show enthusiasm?
Overall Behavioral Score = Average of the three above.

Scoring:
Final Score (out of 10) = (Linguistic Score x 0.5) + (Behavioral Score x 0.5).

Provide category breakdowns, a summary paragraph, the key strengths and the areas for improvement.

Example Output Format:
Linguistic:
Clarity & Structure: 8/10 - Clear answers but sometimes meandering.
Grammar & Vocabulary: 9/10 - Strong command of language.
Conciseness: 7/10 - Could reduce filler words.
Linguistic Avg: 8.0/10

Behavioral:
Professionalism: 9/10 - Polite and respectful tone.
Confidence: 7/10 - Slight hesitation noted in complex answers.
Engagement: 8/10 - Good adaptability and enthusiasm.
Behavioral Avg: 8.0/10

Final Score: 8.0/10

Summary: Candidate communicates clearly with strong professionalism. Needs to reduce filler words and maintain steadier confidence in technical discussions.
Strengths: Clear structure, professional tone.
Areas for improvement: Fewer filler words, steadier delivery.

QUESTION: {question}

TRANSCRIPT TO EVALUATE:
{transcript}

EVALUATION:";

/// Render the evaluation prompt for one answer
pub fn evaluation_prompt(question: &str, transcript: &str) -> String {
    PROMPT_TEMPLATE
        .replace("{question}", question)
        .replace("{transcript}", transcript)
}

/// Per-criterion scores (0–10) extracted from an evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RubricScores {
    pub clarity_structure: f64,
    pub grammar_vocabulary: f64,
    pub conciseness_relevance: f64,
    pub professionalism: f64,
    pub confidence_delivery: f64,
    pub engagement_adaptability: f64,
    pub linguistic_avg: f64,
    pub behavioral_avg: f64,
    pub final_score: f64,
}

/// Everything recoverable from the model's free text
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub scores: RubricScores,
    pub summary: String,
    pub strengths: Option<String>,
    pub improvements: Option<String>,
}

struct Patterns {
    out_of_ten: Regex,
    bare_number: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        out_of_ten: Regex::new(r"(\d+(?:\.\d+)?)\s*/\s*10").unwrap(),
        bare_number: Regex::new(r"\d+(?:\.\d+)?").unwrap(),
    })
}

/// Score on a line like `Clarity & Structure: 8/10 - ...`.
///
/// Prefers an `N/10` pattern, else the first bare number if it lies in 0–10.
pub fn extract_score(line: &str) -> Option<f64> {
    let p = patterns();

    if let Some(caps) = p.out_of_ten.captures(line) {
        return caps[1].parse().ok();
    }

    p.bare_number
        .find(line)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|score| (0.0..=10.0).contains(score))
}

fn labelled_value<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let line = line.trim_start_matches(|c: char| c == '*' || c == '-' || c.is_whitespace());
    let head = line.get(..marker.len())?;
    if head.eq_ignore_ascii_case(marker) {
        Some(line[marker.len()..].trim_start_matches('*').trim())
    } else {
        None
    }
}

fn mean(values: [Option<f64>; 3]) -> f64 {
    values.iter().map(|v| v.unwrap_or(0.0)).sum::<f64>() / 3.0
}

/// Parse a rubric evaluation. Never fails: missing fields default to zero,
/// missing averages are recomputed from their sub-scores and a missing final
/// score from the weighted averages.
pub fn parse_evaluation(text: &str) -> Evaluation {
    let mut clarity = None;
    let mut grammar = None;
    let mut conciseness = None;
    let mut professionalism = None;
    let mut confidence = None;
    let mut engagement = None;
    let mut linguistic_avg = None;
    let mut behavioral_avg = None;
    let mut final_score = None;
    let mut strengths = None;
    let mut improvements = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.contains(SUMMARY_MARKER) {
            continue;
        }
        if let Some(value) = labelled_value(line, STRENGTHS_MARKER) {
            strengths = Some(value.to_string()).filter(|v| !v.is_empty());
            continue;
        }
        if let Some(value) = labelled_value(line, IMPROVEMENTS_MARKER) {
            improvements = Some(value.to_string()).filter(|v| !v.is_empty());
            continue;
        }

        let slot = if line.contains(CLARITY_MARKER) {
            &mut clarity
        } else if line.contains(GRAMMAR_MARKER) {
            &mut grammar
        } else if line.contains(CONCISENESS_MARKER) {
            &mut conciseness
        } else if line.contains(PROFESSIONALISM_MARKER) {
            &mut professionalism
        } else if line.contains(CONFIDENCE_MARKER) {
            &mut confidence
        } else if line.contains(ENGAGEMENT_MARKER) {
            &mut engagement
        } else if line.contains(LINGUISTIC_AVG_MARKER) {
            &mut linguistic_avg
        } else if line.contains(BEHAVIORAL_AVG_MARKER) {
            &mut behavioral_avg
        } else if line.contains(FINAL_SCORE_MARKER) {
            &mut final_score
        } else {
            continue;
        };
        *slot = extract_score(line);
    }

    let linguistic_avg = linguistic_avg.unwrap_or_else(|| mean([clarity, grammar, conciseness]));
    let behavioral_avg =
        behavioral_avg.unwrap_or_else(|| mean([professionalism, confidence, engagement]));
    let final_score = final_score.unwrap_or(
        linguistic_avg * LINGUISTIC_WEIGHT + behavioral_avg * BEHAVIORAL_WEIGHT,
    );

    Evaluation {
        scores: RubricScores {
            clarity_structure: clarity.unwrap_or(0.0),
            grammar_vocabulary: grammar.unwrap_or(0.0),
            conciseness_relevance: conciseness.unwrap_or(0.0),
            professionalism: professionalism.unwrap_or(0.0),
            confidence_delivery: confidence.unwrap_or(0.0),
            engagement_adaptability: engagement.unwrap_or(0.0),
            linguistic_avg,
            behavioral_avg,
            final_score,
        },
        summary: extract_summary(text),
        strengths,
        improvements,
    }
}

/// Last `Summary:` line, else the last long line that is not a score line
pub fn extract_summary(text: &str) -> String {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let explicit = lines
        .iter()
        .rev()
        .find(|l| l.contains(SUMMARY_MARKER))
        .map(|l| l.replace(SUMMARY_MARKER, "").trim().to_string())
        .filter(|s| !s.is_empty());
    if let Some(summary) = explicit {
        return summary;
    }

    lines
        .iter()
        .rev()
        .find(|l| {
            let lowered = l.to_lowercase();
            l.chars().count() > 50
                && !["score", "avg", "/"].iter().any(|k| lowered.contains(k))
        })
        .map(|l| l.to_string())
        .unwrap_or_else(|| DEFAULT_SUMMARY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "Linguistic:
Clarity & Structure: 8/10 - Clear answers.
Grammar & Vocabulary: 9/10 - Strong command of language.
Conciseness: 7/10 - Could reduce filler words.
Linguistic Avg: 8.0/10

Behavioral:
Professionalism: 9/10 - Polite.
Confidence: 6.5/10 - Some hesitation.
Engagement: 8/10 - Enthusiastic.
Behavioral Avg: 7.8/10

Final Score: 7.9/10

Summary: Clear communicator who should work on steadier delivery.
Strengths: Structure and tone.
Areas for improvement: Confidence under pressure.";

    #[test]
    fn parses_complete_evaluation() {
        let eval = parse_evaluation(FULL);
        assert_eq!(eval.scores.clarity_structure, 8.0);
        assert_eq!(eval.scores.grammar_vocabulary, 9.0);
        assert_eq!(eval.scores.conciseness_relevance, 7.0);
        assert_eq!(eval.scores.confidence_delivery, 6.5);
        assert_eq!(eval.scores.linguistic_avg, 8.0);
        assert_eq!(eval.scores.behavioral_avg, 7.8);
        assert_eq!(eval.scores.final_score, 7.9);
        assert_eq!(
            eval.summary,
            "Clear communicator who should work on steadier delivery."
        );
        assert_eq!(eval.strengths.as_deref(), Some("Structure and tone."));
        assert_eq!(eval.improvements.as_deref(), Some("Confidence under pressure."));
    }

    #[test]
    fn recomputes_missing_averages_and_final() {
        let text = "Clarity & Structure: 6/10
Grammar & Vocabulary: 9/10
Conciseness: 9/10
Professionalism: 4/10
Confidence: 6/10
Engagement: 8/10";
        let scores = parse_evaluation(text).scores;
        assert_eq!(scores.linguistic_avg, 8.0);
        assert_eq!(scores.behavioral_avg, 6.0);
        assert_eq!(scores.final_score, 7.0);
    }

    #[test]
    fn bare_numbers_are_accepted_in_range() {
        assert_eq!(extract_score("Professionalism: 7 - polite"), Some(7.0));
        assert_eq!(extract_score("Professionalism: 42 points"), None);
        assert_eq!(extract_score("Final Score: 8.5 / 10"), Some(8.5));
        assert_eq!(extract_score("Confidence: unclear"), None);
    }

    #[test]
    fn garbage_yields_zero_scores_and_default_summary() {
        let eval = parse_evaluation("I cannot evaluate this.");
        assert_eq!(eval.scores, RubricScores::default());
        assert_eq!(eval.summary, DEFAULT_SUMMARY);
        assert_eq!(eval.strengths, None);
    }

    #[test]
    fn summary_falls_back_to_last_long_line() {
        let text = "Final Score: 7/10
The candidate gave a thoughtful answer with concrete examples from past work.
ok";
        assert_eq!(
            extract_summary(text),
            "The candidate gave a thoughtful answer with concrete examples from past work."
        );
    }

    #[test]
    fn prompt_embeds_question_and_transcript() {
        let prompt = evaluation_prompt("Why Rust?", "Because of ownership.");
        assert!(prompt.contains("QUESTION: Why Rust?"));
        assert!(prompt.contains("TRANSCRIPT TO EVALUATE:\nBecause of ownership."));
        assert!(prompt.contains(FINAL_SCORE_MARKER));
    }
}
