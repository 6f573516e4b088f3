use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::questions::QuestionSource;
use crate::scoring::ScoreResult;

pub const SKIPPED_TRANSCRIPT: &str = "[Question was skipped by the candidate]";
pub const NO_RESPONSE_TRANSCRIPT: &str = "[No response provided]";
pub const TRANSCRIPT_NOT_FOUND: &str = "[Transcript not found]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

/// Link from a question to the transcript that answered it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub transcript_id: String,
    pub submitted_at: DateTime<Utc>,
}

/// One candidate's interview attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub candidate_name: Option<String>,
    pub job_role: Option<String>,
    pub job_description: Option<String>,

    /// Fixed at creation
    pub questions: Vec<String>,

    /// Index of the next unanswered question; never decreases
    pub current_question: usize,

    /// Keyed by question index; a retry overwrites the previous entry
    #[serde(default)]
    pub responses: BTreeMap<usize, ResponseRecord>,

    pub status: SessionStatus,
    pub question_source: QuestionSource,
    #[serde(default)]
    pub used_fallback: bool,

    /// Set when the session was started from an interview template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    /// Upsert the response for `question_index` and advance progress.
    ///
    /// Returns `true` if this call moved the session to `completed`.
    pub fn record_response(&mut self, question_index: usize, transcript_id: String) -> bool {
        let now = Utc::now();
        self.responses.insert(
            question_index,
            ResponseRecord {
                transcript_id,
                submitted_at: now,
            },
        );
        self.current_question = self.current_question.max(question_index + 1);
        self.updated_at = now;

        if !self.is_completed() && self.current_question >= self.questions.len() {
            self.status = SessionStatus::Completed;
            return true;
        }
        false
    }
}

/// Stored text of one audio answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub id: String,
    pub session_id: String,
    pub question_index: usize,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_filename: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transcript {
    /// Id is derived from the session, question and creation time so retries
    /// never collide
    pub fn new(session_id: &str, question_index: usize, text: impl Into<String>) -> Self {
        let created_at = Utc::now();
        Self {
            id: format!(
                "{}_{}_{}",
                session_id,
                question_index,
                created_at.timestamp_micros()
            ),
            session_id: session_id.to_string(),
            question_index,
            text: text.into(),
            audio_filename: None,
            created_at,
        }
    }

    pub fn skipped(session_id: &str, question_index: usize) -> Self {
        let mut transcript = Self::new(session_id, question_index, SKIPPED_TRANSCRIPT);
        transcript.audio_filename = Some("skipped".to_string());
        transcript
    }
}

/// Scored answer inside an [`InterviewResult`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResponse {
    pub question_index: usize,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_id: Option<String>,
    pub transcript: String,
    #[serde(flatten)]
    pub evaluation: ScoreResult,
}

/// Aggregate outcome of a completed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewResult {
    pub session_id: String,
    pub candidate_name: Option<String>,
    pub job_role: Option<String>,
    pub total_questions: usize,
    pub completed_responses: usize,
    pub average_score: f64,
    /// Ordered by question index
    pub responses: Vec<ScoredResponse>,
    pub summary: String,
}
