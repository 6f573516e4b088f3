//! Interview question generation
//!
//! - [`QuestionGenerator`] asks the language model for questions
//! - [`templates`] is the deterministic fallback engine
//! - [`parse`] cleans free-form model output into questions

mod generator;
pub mod parse;
pub mod templates;

pub use generator::{
    infer_job_description, EditQuestionRequest, EditedQuestion, GeneratedQuestions,
    GenerationRequest, QuestionGenerator, DEFAULT_QUESTION_COUNT, MAX_QUESTIONS,
};

use serde::{Deserialize, Serialize};

/// Provenance of a question set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionSource {
    Ollama,
    Fallback,
    Client,
}
