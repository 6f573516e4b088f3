use chrono::Utc;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::records::{InterviewTemplate, ResultFilter};
use super::types::{
    InterviewResult, ScoredResponse, Session, SessionStatus, Transcript, NO_RESPONSE_TRANSCRIPT,
    TRANSCRIPT_NOT_FOUND,
};
use crate::error::{InterviewError, Result};
use crate::questions::{GenerationRequest, QuestionGenerator, QuestionSource};
use crate::scoring::{fallback_score, ResponseScorer};
use crate::store::{InterviewStore, ResultStore, SessionStore, Store};

/// Sessions sample questions a little more freely than the `/generate` default
const SESSION_TEMPERATURE: f32 = 0.8;
const DEFAULT_SESSION_QUESTIONS: i64 = 3;

fn default_num_questions() -> i64 {
    DEFAULT_SESSION_QUESTIONS
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct StartInterview {
    #[serde(default)]
    pub candidate_name: Option<String>,
    #[serde(default)]
    pub job_role: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default = "default_num_questions")]
    pub num_questions: i64,
    /// Client-supplied questions, used verbatim when any are non-blank
    #[serde(default)]
    pub questions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartedInterview {
    pub session_id: String,
    pub questions: Vec<String>,
    pub question_source: QuestionSource,
    pub used_fallback: bool,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartFromInterview {
    #[serde(default)]
    pub candidate_id: Option<String>,
    #[serde(default)]
    pub candidate_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    pub transcript: String,
    pub transcript_id: String,
    pub session_status: SessionStatus,
    pub next_question_index: usize,
    pub message: String,
}

// ============================================================================
// SessionManager
// ============================================================================

/// Owns the interview state machine: creation, response recording,
/// completion and result aggregation
pub struct SessionManager {
    store: Arc<dyn Store>,
    generator: Arc<QuestionGenerator>,
    scorer: Arc<ResponseScorer>,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn Store>,
        generator: Arc<QuestionGenerator>,
        scorer: Arc<ResponseScorer>,
    ) -> Self {
        Self {
            store,
            generator,
            scorer,
        }
    }

    pub async fn start_interview(&self, request: StartInterview) -> Result<StartedInterview> {
        let session = self.create_session(request, None, None).await?;
        Ok(started(session))
    }

    /// Start a session from a stored interview template
    pub async fn start_from_interview(
        &self,
        interview_id: &str,
        request: StartFromInterview,
    ) -> Result<StartedInterview> {
        let interview: InterviewTemplate = self
            .store
            .get_interview(interview_id)
            .await?
            .ok_or_else(|| InterviewError::not_found("Interview", interview_id))?;

        if !interview.active {
            return Err(InterviewError::failed_precondition("Interview is not active"));
        }

        if let Some(candidate_id) = request.candidate_id.as_deref() {
            let filter = ResultFilter {
                interview_id: Some(interview_id.to_string()),
                candidate_id: Some(candidate_id.to_string()),
            };
            let already_done = self.store.list_results().await?.iter().any(|r| filter.matches(r));
            if already_done {
                return Err(InterviewError::failed_precondition(
                    "Interview already completed.",
                ));
            }
        }

        let config = interview.config;
        let supplied = config.questions.as_ref().map(Vec::len).unwrap_or(0) as i64;
        let num_questions = config
            .num_questions
            .filter(|n| *n > 0)
            .or_else(|| (supplied > 0).then_some(supplied))
            .unwrap_or(DEFAULT_SESSION_QUESTIONS);

        let start = StartInterview {
            candidate_name: request.candidate_name.or_else(|| request.candidate_id.clone()),
            job_role: config.job_role.or_else(|| Some(interview.title.clone())),
            job_description: config.job_description.or(interview.description),
            num_questions,
            questions: config.questions,
        };

        info!("Starting session for interview {}", interview.id);
        let session = self
            .create_session(start, Some(interview.id), request.candidate_id)
            .await?;
        Ok(started(session))
    }

    async fn create_session(
        &self,
        request: StartInterview,
        interview_id: Option<String>,
        candidate_id: Option<String>,
    ) -> Result<Session> {
        let (questions, question_source, used_fallback) = match request.questions {
            Some(supplied) if !supplied.is_empty() => {
                let cleaned: Vec<String> = supplied
                    .iter()
                    .map(|q| q.trim())
                    .filter(|q| !q.is_empty())
                    .map(str::to_string)
                    .collect();
                if cleaned.is_empty() {
                    return Err(InterviewError::invalid_input(
                        "Provided questions were empty after cleaning",
                    ));
                }
                (cleaned, QuestionSource::Client, false)
            }
            _ => {
                let mut generation = GenerationRequest::for_job(
                    request.job_role.clone(),
                    request.job_description.clone(),
                    request.num_questions,
                );
                generation.temperature = SESSION_TEMPERATURE;
                generation.prompt = Some(session_prompt(
                    request.num_questions,
                    request.job_role.as_deref(),
                ));

                let generated = self.generator.generate(&generation).await?;
                (generated.questions, generated.source, generated.used_fallback)
            }
        };

        if questions.is_empty() {
            return Err(InterviewError::invalid_input(
                "No interview questions were generated",
            ));
        }

        let now = Utc::now();
        let session = Session {
            id: String::new(),
            candidate_name: request.candidate_name,
            job_role: request.job_role,
            job_description: request.job_description,
            questions,
            current_question: 0,
            responses: Default::default(),
            status: SessionStatus::Active,
            question_source,
            used_fallback,
            interview_id,
            candidate_id,
            created_at: now,
            updated_at: now,
        };

        let session = self.store.create_session(session).await?;
        info!(
            "Interview session {} started with {} questions ({:?})",
            session.id,
            session.questions.len(),
            session.question_source
        );
        Ok(session)
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Session> {
        self.store
            .get_session(session_id)
            .await?
            .ok_or_else(|| InterviewError::not_found("Session", session_id))
    }

    /// Store the transcription of an uploaded answer for a session question
    pub async fn record_transcript(
        &self,
        session_id: &str,
        question_index: usize,
        text: String,
        audio_filename: Option<String>,
    ) -> Result<Transcript> {
        let session = self.get_session(session_id).await?;
        check_index(&session, question_index)?;

        let mut transcript = Transcript::new(session_id, question_index, text);
        transcript.audio_filename = audio_filename;
        self.store.put_transcript(transcript.clone()).await?;
        Ok(transcript)
    }

    pub async fn submit_response(
        &self,
        session_id: &str,
        question_index: usize,
        transcript_id: Option<String>,
    ) -> Result<SubmitOutcome> {
        let session = self.get_session(session_id).await?;
        if session.is_completed() {
            return Err(already_completed());
        }
        check_index(&session, question_index)?;

        let transcript_id = transcript_id.filter(|id| !id.trim().is_empty());
        let skipped = transcript_id.is_none();
        let transcript = match transcript_id {
            None => Transcript::skipped(session_id, question_index),
            Some(id) => {
                let transcript = self
                    .store
                    .get_transcript(&id)
                    .await?
                    .ok_or_else(|| {
                        InterviewError::invalid_input(format!("Transcript {} not found", id))
                    })?;
                if transcript.session_id != session_id {
                    return Err(InterviewError::invalid_input(format!(
                        "Transcript {} belongs to another session",
                        id
                    )));
                }
                transcript
            }
        };

        let linked_id = transcript.id.clone();
        let updated = self
            .store
            .update_session(
                session_id,
                Box::new(move |session: &mut Session| {
                    if session.is_completed() {
                        return Err(already_completed());
                    }
                    session.record_response(question_index, linked_id);
                    Ok(())
                }),
            )
            .await?;

        // Only persisted once the response is linked to an active session
        if skipped {
            self.store.put_transcript(transcript.clone()).await?;
            info!(
                "Question {} of session {} skipped",
                question_index, session_id
            );
        }

        if updated.is_completed() {
            info!("Interview session {} completed", session_id);
        }

        Ok(SubmitOutcome {
            transcript: transcript.text,
            transcript_id: transcript.id,
            session_status: updated.status,
            next_question_index: updated.current_question,
            message: "Response submitted successfully".to_string(),
        })
    }

    /// Score every question of a completed session.
    ///
    /// Questions are scored concurrently; the output stays in question order.
    pub async fn get_results(&self, session_id: &str) -> Result<InterviewResult> {
        let session = self.get_session(session_id).await?;
        if !session.is_completed() {
            return Err(InterviewError::failed_precondition(format!(
                "Interview not yet completed. Status: active, Questions: {}, Current question: {}",
                session.questions.len(),
                session.current_question
            )));
        }

        let policy = self.scorer.inline_policy();
        let scoring = session
            .questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let session = &session;
                async move {
                    let (transcript_id, transcript) = self.resolve_transcript(session, index).await;
                    let evaluation = match self.scorer.score(question, &transcript, &policy).await
                    {
                        Ok(evaluation) => evaluation,
                        Err(e) => fallback_score(&transcript, e.to_string()),
                    };
                    ScoredResponse {
                        question_index: index,
                        question: question.clone(),
                        transcript_id,
                        transcript,
                        evaluation,
                    }
                }
            });
        let responses = join_all(scoring).await;

        let average_score = if responses.is_empty() {
            0.0
        } else {
            let total: f64 = responses.iter().map(|r| r.evaluation.score).sum();
            (total / responses.len() as f64 * 10.0).round() / 10.0
        };

        let result = InterviewResult {
            session_id: session.id.clone(),
            candidate_name: session.candidate_name.clone(),
            job_role: session.job_role.clone(),
            total_questions: session.questions.len(),
            completed_responses: responses.iter().filter(|r| r.transcript_id.is_some()).count(),
            average_score,
            summary: format!(
                "Interview completed with average score of {:.1}/10",
                average_score
            ),
            responses,
        };

        if let Err(e) = self
            .store
            .upsert_result(
                result.clone(),
                session.interview_id.clone(),
                session.candidate_id.clone(),
            )
            .await
        {
            warn!("Failed to cache results for session {}: {}", session.id, e);
        }

        Ok(result)
    }

    async fn resolve_transcript(&self, session: &Session, index: usize) -> (Option<String>, String) {
        let Some(response) = session.responses.get(&index) else {
            return (None, NO_RESPONSE_TRANSCRIPT.to_string());
        };

        let text = match self.store.get_transcript(&response.transcript_id).await {
            Ok(Some(transcript)) => transcript.text,
            Ok(None) => TRANSCRIPT_NOT_FOUND.to_string(),
            Err(e) => {
                warn!("Failed to load transcript {}: {}", response.transcript_id, e);
                TRANSCRIPT_NOT_FOUND.to_string()
            }
        };
        (Some(response.transcript_id.clone()), text)
    }
}

fn started(session: Session) -> StartedInterview {
    StartedInterview {
        session_id: session.id,
        questions: session.questions,
        question_source: session.question_source,
        used_fallback: session.used_fallback,
        message: "Interview session started successfully".to_string(),
    }
}

/// Also serves as the job text when a session names no role or description
fn session_prompt(num_questions: i64, job_role: Option<&str>) -> String {
    let role = job_role
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or("software developer");
    format!(
        "Generate {} professional interview questions for a {} position. \
         Return only the questions, one per line, without numbering.",
        num_questions, role
    )
}

fn already_completed() -> InterviewError {
    InterviewError::failed_precondition("Interview session is already completed")
}

fn check_index(session: &Session, question_index: usize) -> Result<()> {
    if question_index >= session.questions.len() {
        return Err(InterviewError::invalid_input(format!(
            "Question index {} out of range (session has {} questions)",
            question_index,
            session.questions.len()
        )));
    }
    Ok(())
}
