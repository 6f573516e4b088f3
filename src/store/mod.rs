//! Persistence interfaces for sessions, transcripts, interviews and results.
//!
//! Two backends: [`MemoryStore`] (tests, ephemeral deployments) and
//! [`JsonFileStore`] (one JSON document per record). Both serialize
//! read-modify-write per key with [`KeyLocks`].

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OwnedMutexGuard;

use crate::error::Result;
use crate::session::{
    InterviewResult, InterviewTemplate, InterviewUpdate, ResultRecord, ReviewStatus, Session,
    Transcript,
};

/// Mutation applied atomically to one session; returning `Err` discards it
pub type SessionUpdate = Box<dyn FnOnce(&mut Session) -> Result<()> + Send>;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session under a freshly generated id (any id on
    /// `session` is replaced) and return the stored record
    async fn create_session(&self, session: Session) -> Result<Session>;

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>>;

    /// Apply `update` to the stored session while holding its key lock.
    /// Fails with `NotFound` for unknown ids.
    async fn update_session(&self, session_id: &str, update: SessionUpdate) -> Result<Session>;

    async fn put_transcript(&self, transcript: Transcript) -> Result<()>;

    async fn get_transcript(&self, transcript_id: &str) -> Result<Option<Transcript>>;
}

#[async_trait]
pub trait InterviewStore: Send + Sync {
    async fn create_interview(&self, interview: InterviewTemplate) -> Result<()>;

    async fn get_interview(&self, interview_id: &str) -> Result<Option<InterviewTemplate>>;

    async fn list_interviews(&self) -> Result<Vec<InterviewTemplate>>;

    /// Apply `update` under the interview's key lock. Fails with `NotFound`
    /// for unknown ids; an `Err` from the update leaves the record untouched.
    async fn update_interview(
        &self,
        interview_id: &str,
        update: InterviewUpdate,
    ) -> Result<InterviewTemplate>;

    async fn delete_interview(&self, interview_id: &str) -> Result<()>;
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Insert or refresh the cached result for `result.session_id`.
    /// An existing record keeps its id, creation time and review status.
    async fn upsert_result(
        &self,
        result: InterviewResult,
        interview_id: Option<String>,
        candidate_id: Option<String>,
    ) -> Result<ResultRecord>;

    async fn get_result(&self, session_id: &str) -> Result<Option<ResultRecord>>;

    async fn list_results(&self) -> Result<Vec<ResultRecord>>;

    async fn set_result_status(&self, session_id: &str, status: ReviewStatus)
        -> Result<ResultRecord>;

    async fn delete_result(&self, session_id: &str) -> Result<()>;
}

/// Everything the service persists
pub trait Store: SessionStore + InterviewStore + ResultStore {}

impl<T: SessionStore + InterviewStore + ResultStore> Store for T {}

/// Per-key async locks. An entry lives only while someone holds or waits
/// on it, so the map stays bounded by the number of contended keys.
#[derive(Default)]
pub struct KeyLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl KeyLocks {
    pub async fn lock(&self, key: &str) -> KeyGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(key.to_string()).or_default())
        };
        KeyGuard {
            locks: self,
            key: key.to_string(),
            guard: Some(lock.lock_owned().await),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Held lock for one key; releasing the last holder drops the map entry
pub struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut locks = self.locks.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Clones are only taken under the map lock, so a count of 1 means
        // nobody else holds or waits on this key
        if locks
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.key);
        }
    }
}
