//! Response scoring: rubric prompt, marker parser and word-count fallback.

pub mod heuristic;
pub mod rubric;
mod scorer;

pub use rubric::RubricScores;
pub use scorer::{
    fallback_score, ResponseScorer, ScoreResult, ScoreSource, ScoringConfig, ScoringHealth,
    ScoringPolicy,
};
