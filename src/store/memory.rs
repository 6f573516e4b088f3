use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{InterviewStore, KeyLocks, ResultStore, SessionStore, SessionUpdate};
use crate::error::{InterviewError, Result};
use crate::session::{
    InterviewResult, InterviewTemplate, InterviewUpdate, ResultRecord, ReviewStatus, Session,
    Transcript,
};

/// In-process store; contents are lost on restart
#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, Session>>,
    transcripts: RwLock<HashMap<String, Transcript>>,
    interviews: RwLock<HashMap<String, InterviewTemplate>>,
    results: RwLock<HashMap<String, ResultRecord>>,
    session_locks: KeyLocks,
    interview_locks: KeyLocks,
    result_locks: KeyLocks,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, mut session: Session) -> Result<Session> {
        session.id = uuid::Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }

    async fn update_session(&self, session_id: &str, update: SessionUpdate) -> Result<Session> {
        let _guard = self.session_locks.lock(session_id).await;

        let mut session = self
            .get_session(session_id)
            .await?
            .ok_or_else(|| InterviewError::not_found("Session", session_id))?;
        update(&mut session)?;

        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id.to_string(), session.clone());
        Ok(session)
    }

    async fn put_transcript(&self, transcript: Transcript) -> Result<()> {
        let mut transcripts = self.transcripts.write().await;
        transcripts.insert(transcript.id.clone(), transcript);
        Ok(())
    }

    async fn get_transcript(&self, transcript_id: &str) -> Result<Option<Transcript>> {
        let transcripts = self.transcripts.read().await;
        Ok(transcripts.get(transcript_id).cloned())
    }
}

#[async_trait]
impl InterviewStore for MemoryStore {
    async fn create_interview(&self, interview: InterviewTemplate) -> Result<()> {
        let mut interviews = self.interviews.write().await;
        interviews.insert(interview.id.clone(), interview);
        Ok(())
    }

    async fn get_interview(&self, interview_id: &str) -> Result<Option<InterviewTemplate>> {
        let interviews = self.interviews.read().await;
        Ok(interviews.get(interview_id).cloned())
    }

    async fn list_interviews(&self) -> Result<Vec<InterviewTemplate>> {
        let interviews = self.interviews.read().await;
        let mut list: Vec<_> = interviews.values().cloned().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(list)
    }

    async fn update_interview(
        &self,
        interview_id: &str,
        update: InterviewUpdate,
    ) -> Result<InterviewTemplate> {
        let _guard = self.interview_locks.lock(interview_id).await;

        let mut interviews = self.interviews.write().await;
        let stored = interviews
            .get(interview_id)
            .ok_or_else(|| InterviewError::not_found("Interview", interview_id))?;
        let mut interview = stored.clone();
        update.apply(&mut interview)?;
        interviews.insert(interview_id.to_string(), interview.clone());
        Ok(interview)
    }

    async fn delete_interview(&self, interview_id: &str) -> Result<()> {
        let _guard = self.interview_locks.lock(interview_id).await;

        let mut interviews = self.interviews.write().await;
        interviews
            .remove(interview_id)
            .map(|_| ())
            .ok_or_else(|| InterviewError::not_found("Interview", interview_id))
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn upsert_result(
        &self,
        result: InterviewResult,
        interview_id: Option<String>,
        candidate_id: Option<String>,
    ) -> Result<ResultRecord> {
        let session_id = result.session_id.clone();
        let _guard = self.result_locks.lock(&session_id).await;

        let mut results = self.results.write().await;
        let record = match results.get_mut(&session_id) {
            Some(existing) => {
                existing.refresh(result);
                existing.clone()
            }
            None => {
                let record = ResultRecord::new(result, interview_id, candidate_id);
                results.insert(session_id, record.clone());
                record
            }
        };
        Ok(record)
    }

    async fn get_result(&self, session_id: &str) -> Result<Option<ResultRecord>> {
        let results = self.results.read().await;
        Ok(results.get(session_id).cloned())
    }

    async fn list_results(&self) -> Result<Vec<ResultRecord>> {
        let results = self.results.read().await;
        let mut list: Vec<_> = results.values().cloned().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(list)
    }

    async fn set_result_status(
        &self,
        session_id: &str,
        status: ReviewStatus,
    ) -> Result<ResultRecord> {
        let _guard = self.result_locks.lock(session_id).await;

        let mut results = self.results.write().await;
        let record = results
            .get_mut(session_id)
            .ok_or_else(|| InterviewError::not_found("Result", session_id))?;
        record.status = status;
        record.updated_at = chrono::Utc::now();
        Ok(record.clone())
    }

    async fn delete_result(&self, session_id: &str) -> Result<()> {
        let _guard = self.result_locks.lock(session_id).await;

        let mut results = self.results.write().await;
        results
            .remove(session_id)
            .map(|_| ())
            .ok_or_else(|| InterviewError::not_found("Result", session_id))
    }
}
