use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::heuristic;
use super::rubric::{self, RubricScores};
use crate::config::LlmConfig;
use crate::error::{InterviewError, Result};
use crate::llm::{CompletionGateway, CompletionInput, CompletionOptions, CompletionRequest};
use crate::session::{NO_RESPONSE_TRANSCRIPT, SKIPPED_TRANSCRIPT};

const SCORING_TEMPERATURE: f32 = 0.3;
const SCORING_MAX_TOKENS: u32 = 1000;
const MIN_STRICT_TRANSCRIPT_CHARS: usize = 10;

/// Who produced a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    Ollama,
    Fallback,
}

/// Evaluation of one (question, transcript) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// 1–10, one decimal
    pub score: f64,
    pub feedback: String,
    pub strengths: String,
    pub areas_for_improvement: String,
    /// Rubric breakdown when the model answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<RubricScores>,
    pub source: ScoreSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// Call-site rules for scoring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringPolicy {
    /// Score blank transcripts as "[No response provided]" instead of rejecting them
    pub allow_empty_transcript: bool,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub standalone_timeout: Duration,
    pub inline_timeout: Duration,
    pub health_timeout: Duration,
}

impl From<&LlmConfig> for ScoringConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            standalone_timeout: config.scoring_timeout(),
            inline_timeout: config.inline_scoring_timeout(),
            health_timeout: config.health_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoringHealth {
    pub status: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScoringHealth {
    pub fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Scores interview answers with the rubric prompt, falling back to a
/// word-count heuristic when the model is unavailable
pub struct ResponseScorer {
    gateway: Arc<dyn CompletionGateway>,
    config: ScoringConfig,
}

impl ResponseScorer {
    pub fn new(gateway: Arc<dyn CompletionGateway>, config: ScoringConfig) -> Self {
        Self { gateway, config }
    }

    /// Strict rules of the standalone scoring endpoint
    pub fn standalone_policy(&self) -> ScoringPolicy {
        ScoringPolicy {
            allow_empty_transcript: false,
            timeout: self.config.standalone_timeout,
        }
    }

    /// Permissive rules used while building session results
    pub fn inline_policy(&self) -> ScoringPolicy {
        ScoringPolicy {
            allow_empty_transcript: true,
            timeout: self.config.inline_timeout,
        }
    }

    pub async fn score(
        &self,
        question: &str,
        transcript: &str,
        policy: &ScoringPolicy,
    ) -> Result<ScoreResult> {
        let transcript = prepare_transcript(transcript, policy)?;

        info!(
            "Scoring response: question_length={}, transcript_length={}",
            question.len(),
            transcript.len()
        );

        let request = CompletionRequest {
            input: CompletionInput::Prompt(rubric::evaluation_prompt(question, &transcript)),
            options: CompletionOptions {
                model: None,
                temperature: SCORING_TEMPERATURE,
                max_tokens: SCORING_MAX_TOKENS,
                timeout: policy.timeout,
            },
        };

        let result = match self.gateway.complete(request).await {
            Ok(text) => {
                let evaluation = rubric::parse_evaluation(&text);
                ScoreResult {
                    score: round_one_decimal(evaluation.scores.final_score.clamp(1.0, 10.0)),
                    feedback: evaluation.summary,
                    strengths: evaluation
                        .strengths
                        .unwrap_or_else(|| heuristic::default_strengths().to_string()),
                    areas_for_improvement: evaluation
                        .improvements
                        .unwrap_or_else(|| heuristic::default_improvements().to_string()),
                    breakdown: Some(evaluation.scores),
                    source: ScoreSource::Ollama,
                    fallback_reason: None,
                }
            }
            Err(e) => {
                warn!("Scoring model unavailable, using word-count heuristic: {}", e);
                fallback_score(&transcript, e.to_string())
            }
        };

        info!("Scoring completed: score={:.1} ({:?})", result.score, result.source);
        Ok(result)
    }

    /// Probe the model with a one-token prompt
    pub async fn health(&self) -> ScoringHealth {
        let model = self.gateway.default_model().to_string();
        let request = CompletionRequest {
            input: CompletionInput::Prompt("Test".to_string()),
            options: CompletionOptions {
                model: None,
                temperature: SCORING_TEMPERATURE,
                max_tokens: 1,
                timeout: self.config.health_timeout,
            },
        };

        match self.gateway.complete(request).await {
            Ok(_) => ScoringHealth {
                status: "healthy".to_string(),
                model,
                error: None,
            },
            Err(e) => ScoringHealth {
                status: "unhealthy".to_string(),
                model,
                error: Some(e.to_string()),
            },
        }
    }
}

fn prepare_transcript(transcript: &str, policy: &ScoringPolicy) -> Result<String> {
    let trimmed = transcript.trim();

    if policy.allow_empty_transcript {
        return Ok(match trimmed {
            "" => NO_RESPONSE_TRANSCRIPT.to_string(),
            "SKIPPED" => SKIPPED_TRANSCRIPT.to_string(),
            _ => transcript.to_string(),
        });
    }

    if trimmed.is_empty() {
        return Err(InterviewError::invalid_input("Transcript cannot be empty"));
    }
    if transcript.chars().count() < MIN_STRICT_TRANSCRIPT_CHARS {
        return Err(InterviewError::invalid_input(
            "Transcript too short for meaningful evaluation",
        ));
    }

    Ok(transcript.to_string())
}

/// Deterministic score from the answer's word count
pub fn fallback_score(transcript: &str, reason: impl Into<String>) -> ScoreResult {
    let band = heuristic::band_for(transcript.split_whitespace().count());

    ScoreResult {
        score: band.score,
        feedback: band.feedback.to_string(),
        strengths: heuristic::default_strengths().to_string(),
        areas_for_improvement: heuristic::default_improvements().to_string(),
        breakdown: None,
        source: ScoreSource::Fallback,
        fallback_reason: Some(reason.into()),
    }
}
