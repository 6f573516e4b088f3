//! Interview session management
//!
//! This module provides the `SessionManager` state machine that:
//! - Creates sessions from job details, client questions or stored interviews
//! - Records answers (retries overwrite, progress never moves backwards)
//! - Completes a session once every question has been answered or skipped
//! - Scores completed sessions into an `InterviewResult`

mod manager;
mod records;
mod types;

pub use manager::{
    SessionManager, StartFromInterview, StartInterview, StartedInterview, SubmitOutcome,
};
pub use records::{
    InterviewConfig, InterviewTemplate, InterviewUpdate, NewInterview, ResultFilter, ResultRecord,
    ReviewStatus,
};
pub use types::{
    InterviewResult, ResponseRecord, ScoredResponse, Session, SessionStatus, Transcript,
    NO_RESPONSE_TRANSCRIPT, SKIPPED_TRANSCRIPT, TRANSCRIPT_NOT_FOUND,
};
