use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::InterviewResult;
use crate::error::{InterviewError, Result};

/// Question settings an admin attaches to an interview
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewConfig {
    #[serde(default)]
    pub job_role: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub num_questions: Option<i64>,
    #[serde(default)]
    pub questions: Option<Vec<String>>,
}

/// Reusable interview definition candidates start sessions from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewTemplate {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub config: InterviewConfig,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewInterview {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub config: InterviewConfig,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl InterviewTemplate {
    pub fn new(request: NewInterview) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: request.title,
            description: request.description,
            config: request.config,
            active: request.active,
            created_at: Utc::now(),
        }
    }
}

/// Partial edit of an interview; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterviewUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub config: Option<InterviewConfig>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl InterviewUpdate {
    pub fn apply(self, interview: &mut InterviewTemplate) -> Result<()> {
        if let Some(title) = self.title {
            if title.trim().is_empty() {
                return Err(InterviewError::invalid_input("Interview title is required"));
            }
            interview.title = title;
        }
        if let Some(description) = self.description {
            interview.description = Some(description);
        }
        if let Some(config) = self.config {
            interview.config = config;
        }
        if let Some(active) = self.active {
            interview.active = active;
        }
        Ok(())
    }
}

/// Admin review state of a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Cached [`InterviewResult`] plus review metadata, keyed by session id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: String,
    pub session_id: String,
    #[serde(default)]
    pub interview_id: Option<String>,
    #[serde(default)]
    pub candidate_id: Option<String>,
    pub result: InterviewResult,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResultRecord {
    pub fn new(
        result: InterviewResult,
        interview_id: Option<String>,
        candidate_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: result.session_id.clone(),
            interview_id,
            candidate_id,
            result,
            status: ReviewStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the cached result, keeping identity and review state
    pub fn refresh(&mut self, result: InterviewResult) {
        self.result = result;
        self.updated_at = Utc::now();
    }
}

/// Narrows a result listing; unset fields match everything
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultFilter {
    #[serde(default)]
    pub interview_id: Option<String>,
    #[serde(default)]
    pub candidate_id: Option<String>,
}

impl ResultFilter {
    pub fn matches(&self, record: &ResultRecord) -> bool {
        let wanted = |filter: &Option<String>, value: &Option<String>| {
            filter.is_none() || filter == value
        };
        wanted(&self.interview_id, &record.interview_id)
            && wanted(&self.candidate_id, &record.candidate_id)
    }
}
