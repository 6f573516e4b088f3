use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::{InterviewStore, KeyLocks, ResultStore, SessionStore, SessionUpdate};
use crate::error::{InterviewError, Result};
use crate::session::{
    InterviewResult, InterviewTemplate, InterviewUpdate, ResultRecord, ReviewStatus, Session,
    Transcript,
};

const SESSIONS: &str = "sessions";
const TRANSCRIPTS: &str = "transcripts";
const INTERVIEWS: &str = "interviews";
const RESULTS: &str = "results";

/// Stores each record as `<root>/<kind>/<id>.json`
pub struct JsonFileStore {
    root: PathBuf,
    session_locks: KeyLocks,
    interview_locks: KeyLocks,
    result_locks: KeyLocks,
}

/// Ids become file names, so anything that could escape the directory is
/// treated as unknown
fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(|c: char| matches!(c, '/' | '\\' | '\0'))
}

impl JsonFileStore {
    /// Open (and create if needed) a store rooted at `root`
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        for kind in [SESSIONS, TRANSCRIPTS, INTERVIEWS, RESULTS] {
            tokio::fs::create_dir_all(root.join(kind)).await?;
        }
        info!("JSON file store ready at {}", root.display());

        Ok(Self {
            root,
            session_locks: KeyLocks::default(),
            interview_locks: KeyLocks::default(),
            result_locks: KeyLocks::default(),
        })
    }

    fn path(&self, kind: &str, id: &str) -> Option<PathBuf> {
        is_safe_id(id).then(|| self.root.join(kind).join(format!("{}.json", id)))
    }

    async fn read<T: DeserializeOwned + Send>(&self, kind: &str, id: &str) -> Result<Option<T>> {
        let Some(path) = self.path(kind, id) else {
            return Ok(None);
        };

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write via a temp file and rename so readers never see partial JSON
    async fn write<T: Serialize + Sync>(&self, kind: &str, id: &str, value: &T) -> Result<()> {
        let path = self
            .path(kind, id)
            .ok_or_else(|| InterviewError::invalid_input(format!("Invalid id: {}", id)))?;
        let tmp = path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Remove a record; unknown and unsafe ids are `NotFound` for `entity`
    async fn remove(&self, kind: &str, entity: &'static str, id: &str) -> Result<()> {
        let path = self
            .path(kind, id)
            .ok_or_else(|| InterviewError::not_found(entity, id))?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted {} {}", entity.to_lowercase(), id);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(InterviewError::not_found(entity, id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list<T: DeserializeOwned + Send>(&self, kind: &str) -> Result<Vec<T>> {
        let mut entries = tokio::fs::read_dir(self.root.join(kind)).await?;
        let mut items = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = tokio::fs::read(&path)
                .await
                .map_err(InterviewError::from)
                .and_then(|bytes| serde_json::from_slice::<T>(&bytes).map_err(Into::into));
            match parsed {
                Ok(item) => items.push(item),
                Err(e) => warn!("Skipping unreadable record {}: {}", path.display(), e),
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl SessionStore for JsonFileStore {
    async fn create_session(&self, mut session: Session) -> Result<Session> {
        session.id = uuid::Uuid::new_v4().to_string();
        self.write(SESSIONS, &session.id, &session).await?;
        info!("Created session {}", session.id);
        Ok(session)
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        self.read(SESSIONS, session_id).await
    }

    async fn update_session(&self, session_id: &str, update: SessionUpdate) -> Result<Session> {
        let _guard = self.session_locks.lock(session_id).await;

        let mut session: Session = self
            .read(SESSIONS, session_id)
            .await?
            .ok_or_else(|| InterviewError::not_found("Session", session_id))?;
        update(&mut session)?;

        self.write(SESSIONS, session_id, &session).await?;
        Ok(session)
    }

    async fn put_transcript(&self, transcript: Transcript) -> Result<()> {
        self.write(TRANSCRIPTS, &transcript.id, &transcript).await?;
        info!("Stored transcript {}", transcript.id);
        Ok(())
    }

    async fn get_transcript(&self, transcript_id: &str) -> Result<Option<Transcript>> {
        self.read(TRANSCRIPTS, transcript_id).await
    }
}

#[async_trait]
impl InterviewStore for JsonFileStore {
    async fn create_interview(&self, interview: InterviewTemplate) -> Result<()> {
        self.write(INTERVIEWS, &interview.id, &interview).await
    }

    async fn get_interview(&self, interview_id: &str) -> Result<Option<InterviewTemplate>> {
        self.read(INTERVIEWS, interview_id).await
    }

    async fn list_interviews(&self) -> Result<Vec<InterviewTemplate>> {
        let mut list: Vec<InterviewTemplate> = self.list(INTERVIEWS).await?;
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(list)
    }

    async fn update_interview(
        &self,
        interview_id: &str,
        update: InterviewUpdate,
    ) -> Result<InterviewTemplate> {
        let _guard = self.interview_locks.lock(interview_id).await;

        let mut interview: InterviewTemplate = self
            .read(INTERVIEWS, interview_id)
            .await?
            .ok_or_else(|| InterviewError::not_found("Interview", interview_id))?;
        update.apply(&mut interview)?;

        self.write(INTERVIEWS, interview_id, &interview).await?;
        Ok(interview)
    }

    async fn delete_interview(&self, interview_id: &str) -> Result<()> {
        let _guard = self.interview_locks.lock(interview_id).await;
        self.remove(INTERVIEWS, "Interview", interview_id).await
    }
}

#[async_trait]
impl ResultStore for JsonFileStore {
    async fn upsert_result(
        &self,
        result: InterviewResult,
        interview_id: Option<String>,
        candidate_id: Option<String>,
    ) -> Result<ResultRecord> {
        let session_id = result.session_id.clone();
        let _guard = self.result_locks.lock(&session_id).await;

        let record = match self.read::<ResultRecord>(RESULTS, &session_id).await? {
            Some(mut existing) => {
                existing.refresh(result);
                existing
            }
            None => ResultRecord::new(result, interview_id, candidate_id),
        };

        self.write(RESULTS, &session_id, &record).await?;
        Ok(record)
    }

    async fn get_result(&self, session_id: &str) -> Result<Option<ResultRecord>> {
        self.read(RESULTS, session_id).await
    }

    async fn list_results(&self) -> Result<Vec<ResultRecord>> {
        let mut list: Vec<ResultRecord> = self.list(RESULTS).await?;
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(list)
    }

    async fn set_result_status(
        &self,
        session_id: &str,
        status: ReviewStatus,
    ) -> Result<ResultRecord> {
        let _guard = self.result_locks.lock(session_id).await;

        let mut record: ResultRecord = self
            .read(RESULTS, session_id)
            .await?
            .ok_or_else(|| InterviewError::not_found("Result", session_id))?;
        record.status = status;
        record.updated_at = chrono::Utc::now();

        self.write(RESULTS, session_id, &record).await?;
        Ok(record)
    }

    async fn delete_result(&self, session_id: &str) -> Result<()> {
        let _guard = self.result_locks.lock(session_id).await;
        self.remove(RESULTS, "Result", session_id).await
    }
}
