use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::parse::extract_questions;
use super::templates::generate_locally;
use super::QuestionSource;
use crate::error::{InterviewError, Result};
use crate::llm::{
    ChatMessage, CompletionGateway, CompletionInput, CompletionOptions, CompletionRequest,
};

/// Hard cap on questions per request
pub const MAX_QUESTIONS: usize = 20;
pub const DEFAULT_QUESTION_COUNT: usize = 5;

const GENERATION_TOKEN_CAP: u32 = 500;
const EDIT_TOKEN_CAP: u32 = 200;

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

/// Input for [`QuestionGenerator::generate`]
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub job_role: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub num_questions: Option<i64>,
}

impl GenerationRequest {
    /// Request built from job details only
    pub fn for_job(
        job_role: Option<String>,
        job_description: Option<String>,
        num_questions: i64,
    ) -> Self {
        Self {
            messages: None,
            prompt: None,
            model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            job_role,
            job_description,
            num_questions: Some(num_questions),
        }
    }

    /// Chat messages derived from `messages` or `prompt`
    pub fn formatted_messages(&self) -> Vec<ChatMessage> {
        if let Some(messages) = self.messages.as_ref().filter(|m| !m.is_empty()) {
            return messages.clone();
        }
        match non_blank(self.prompt.as_deref()) {
            Some(prompt) => vec![ChatMessage::user(prompt)],
            None => Vec::new(),
        }
    }

    /// Requested count, clamped to [`MAX_QUESTIONS`]
    pub fn desired_question_count(&self) -> Result<usize> {
        match self.num_questions {
            None => Ok(DEFAULT_QUESTION_COUNT),
            Some(n) if n <= 0 => Err(InterviewError::invalid_input(
                "Number of questions must be greater than zero",
            )),
            Some(n) => Ok((n as usize).min(MAX_QUESTIONS)),
        }
    }
}

/// Output of [`QuestionGenerator::generate`]
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedQuestions {
    pub questions: Vec<String>,
    pub source: QuestionSource,
    pub model: String,
    pub content: String,
    /// Raw model output, or the job text on the fallback path
    pub raw: String,
    pub timestamp: DateTime<Utc>,
    pub used_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditQuestionRequest {
    pub original_question: String,
    pub edit_instruction: String,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub job_role: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditedQuestion {
    pub edited_question: String,
    pub original_question: String,
    pub model: String,
    pub timestamp: DateTime<Utc>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Pull a job description out of a free-form prompt and chat messages.
///
/// Text after a "job description" marker wins (cut before any "Provide only"
/// instruction); otherwise the whole combined text is used.
pub fn infer_job_description(prompt: Option<&str>, messages: &[ChatMessage]) -> Option<String> {
    let mut blocks: Vec<&str> = Vec::new();
    if let Some(prompt) = prompt {
        blocks.push(prompt);
    }
    blocks.extend(messages.iter().map(|m| m.content.as_str()));

    let combined = blocks.join("\n");
    if combined.trim().is_empty() {
        return None;
    }

    const MARKER: &str = "job description";
    let lowered = combined.to_ascii_lowercase();
    if let Some(idx) = lowered.find(MARKER) {
        let snippet = &combined[idx + MARKER.len()..];
        let snippet = snippet.split("Provide only").next().unwrap_or_default();
        let snippet = snippet.trim_matches(|c: char| c == ' ' || c == ':' || c == '\n');
        if !snippet.is_empty() {
            return Some(snippet.to_string());
        }
    }

    Some(combined.trim().to_string())
}

fn generation_prompt(num_questions: usize, job_role: Option<&str>, job_description: Option<&str>) -> String {
    format!(
        "Generate exactly {num_questions} professional interview questions for this job.\n\
         \n\
         Job Role: {role}\n\
         Job Description: {description}\n\
         \n\
         Requirements:\n\
         - Return ONLY the questions\n\
         - One question per line\n\
         - No numbering, bullets, or explanations\n\
         - Each question must end with a question mark\n\
         - Focus on skills and experience relevant to the role\n\
         \n\
         Questions:",
        role = job_role.unwrap_or("Not specified"),
        description = job_description.unwrap_or("General position"),
    )
}

fn edit_prompt(request: &EditQuestionRequest) -> String {
    let mut context = String::new();
    if let Some(role) = non_blank(request.job_role.as_deref()) {
        context.push_str(&format!("The job role is: {}. ", role));
    }
    if let Some(description) = non_blank(request.job_description.as_deref()) {
        context.push_str(&format!("The job description is: {}. ", description));
    }

    format!(
        "{context}You are an expert at refining interview questions. \
         Your task is to edit the following interview question based on the instruction provided. \
         Return only the single, edited question, without any preamble or explanation.\n\n\
         Original Question: \"{original}\"\n\
         Instruction: \"{instruction}\"\n\n\
         Edited Question:",
        original = request.original_question.trim(),
        instruction = request.edit_instruction.trim(),
    )
}

/// Produces interview questions from a language model, with a deterministic
/// template fallback
pub struct QuestionGenerator {
    gateway: Arc<dyn CompletionGateway>,
    timeout: Duration,
}

impl QuestionGenerator {
    pub fn new(gateway: Arc<dyn CompletionGateway>, timeout: Duration) -> Self {
        Self { gateway, timeout }
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedQuestions> {
        let num_questions = request.desired_question_count()?;
        let messages = request.formatted_messages();
        let job_role = non_blank(request.job_role.as_deref()).map(str::to_string);
        let job_description = non_blank(request.job_description.as_deref())
            .map(str::to_string)
            .or_else(|| infer_job_description(request.prompt.as_deref(), &messages));

        if job_description.is_none() && job_role.is_none() && messages.is_empty() {
            return Err(InterviewError::invalid_input(
                "Either messages/prompt or job_description/job_role must be provided",
            ));
        }

        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.gateway.default_model().to_string());

        let prompt = generation_prompt(num_questions, job_role.as_deref(), job_description.as_deref());
        let completion = CompletionRequest {
            input: CompletionInput::Chat(vec![ChatMessage::user(prompt)]),
            options: CompletionOptions {
                model: Some(model.clone()),
                temperature: request.temperature,
                max_tokens: request.max_tokens.min(GENERATION_TOKEN_CAP),
                timeout: self.timeout,
            },
        };

        let reason = match self.gateway.complete(completion).await {
            Ok(content) => {
                let mut questions = extract_questions(&content, num_questions);
                if !questions.is_empty() {
                    if questions.len() < num_questions {
                        info!(
                            "Model returned {} of {} questions, topping up from templates",
                            questions.len(),
                            num_questions
                        );
                        top_up(
                            &mut questions,
                            job_description.as_deref(),
                            job_role.as_deref(),
                            num_questions,
                        );
                    }
                    info!("Generated {} questions with {}", questions.len(), model);
                    return Ok(GeneratedQuestions {
                        content: questions.join("\n"),
                        questions,
                        source: QuestionSource::Ollama,
                        model,
                        raw: content,
                        timestamp: Utc::now(),
                        used_fallback: false,
                        fallback_reason: None,
                    });
                }
                "LLM returned no parseable questions".to_string()
            }
            Err(e) => e.to_string(),
        };

        if job_description.is_none() && job_role.is_none() {
            return Err(InterviewError::invalid_input(format!(
                "Job description or job role is required to generate questions ({})",
                reason
            )));
        }

        warn!("Falling back to rule-based questions: {}", reason);
        let questions = generate_locally(job_description.as_deref(), job_role.as_deref(), num_questions);

        Ok(GeneratedQuestions {
            content: questions.join("\n"),
            questions,
            source: QuestionSource::Fallback,
            model,
            raw: job_description.or(job_role).unwrap_or_default(),
            timestamp: Utc::now(),
            used_fallback: true,
            fallback_reason: Some(reason),
        })
    }

    /// Rewrite one question following an instruction.
    ///
    /// There is no template equivalent, so gateway failures are returned.
    pub async fn edit_question(&self, request: &EditQuestionRequest) -> Result<EditedQuestion> {
        if request.original_question.trim().is_empty() || request.edit_instruction.trim().is_empty() {
            return Err(InterviewError::invalid_input(
                "Original question and edit instruction are required.",
            ));
        }

        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.gateway.default_model().to_string());

        let completion = CompletionRequest {
            input: CompletionInput::Chat(vec![ChatMessage::user(edit_prompt(request))]),
            options: CompletionOptions {
                model: Some(model.clone()),
                temperature: request.temperature,
                max_tokens: EDIT_TOKEN_CAP,
                timeout: self.timeout,
            },
        };

        let content = self.gateway.complete(completion).await.map_err(|e| {
            warn!("Question edit failed: {}", e);
            InterviewError::upstream(format!("Failed to edit question: {}", e))
        })?;

        let first_line = content.lines().next().unwrap_or_default().trim();
        let edited = first_line
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(first_line)
            .trim();

        if edited.is_empty() {
            return Err(InterviewError::upstream("LLM returned an empty response."));
        }

        Ok(EditedQuestion {
            edited_question: edited.to_string(),
            original_question: request.original_question.clone(),
            model,
            timestamp: Utc::now(),
        })
    }
}

/// Fill `questions` up to `target` with template questions, skipping ones
/// already present where possible
fn top_up(
    questions: &mut Vec<String>,
    job_description: Option<&str>,
    job_role: Option<&str>,
    target: usize,
) {
    let pool = generate_locally(job_description, job_role, target);

    for candidate in &pool {
        if questions.len() >= target {
            return;
        }
        if !questions.contains(candidate) {
            questions.push(candidate.clone());
        }
    }

    for candidate in pool.iter().cycle() {
        if questions.len() >= target {
            break;
        }
        questions.push(candidate.clone());
    }
}
