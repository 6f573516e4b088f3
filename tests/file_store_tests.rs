// Integration tests for the JSON file store
//
// Records are written under a temporary directory and read back through a
// fresh store to make sure nothing lives only in memory.

use anyhow::Result;
use chrono::Utc;
use interview_agent::error::InterviewError;
use interview_agent::questions::QuestionSource;
use interview_agent::session::{
    InterviewConfig, InterviewResult, InterviewTemplate, InterviewUpdate, NewInterview,
    ReviewStatus, Session, SessionStatus, Transcript,
};
use interview_agent::store::{InterviewStore, JsonFileStore, ResultStore, SessionStore};
use tempfile::TempDir;

fn new_session(questions: usize) -> Session {
    let now = Utc::now();
    Session {
        id: String::new(),
        candidate_name: Some("Ada".to_string()),
        job_role: Some("Engineer".to_string()),
        job_description: None,
        questions: (0..questions).map(|i| format!("Question {}?", i)).collect(),
        current_question: 0,
        responses: Default::default(),
        status: SessionStatus::Active,
        question_source: QuestionSource::Client,
        used_fallback: false,
        interview_id: None,
        candidate_id: None,
        created_at: now,
        updated_at: now,
    }
}

fn empty_result(session_id: &str) -> InterviewResult {
    InterviewResult {
        session_id: session_id.to_string(),
        candidate_name: None,
        job_role: None,
        total_questions: 0,
        completed_responses: 0,
        average_score: 0.0,
        responses: Vec::new(),
        summary: "Interview completed with average score of 0.0/10".to_string(),
    }
}

#[tokio::test]
async fn test_sessions_survive_reopen() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let created = {
        let store = JsonFileStore::open(temp_dir.path()).await?;
        let created = store.create_session(new_session(2)).await?;
        assert!(!created.id.is_empty());

        store
            .update_session(
                &created.id,
                Box::new(|session: &mut Session| -> interview_agent::Result<()> {
                    session.record_response(0, "t0".to_string());
                    Ok(())
                }),
            )
            .await?;
        created
    };

    let reopened = JsonFileStore::open(temp_dir.path()).await?;
    let session = reopened
        .get_session(&created.id)
        .await?
        .expect("session persisted");
    assert_eq!(session.current_question, 1);
    assert_eq!(session.responses[&0].transcript_id, "t0");

    assert!(temp_dir
        .path()
        .join("sessions")
        .join(format!("{}.json", created.id))
        .exists());
    Ok(())
}

#[tokio::test]
async fn test_failed_update_is_not_written() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = JsonFileStore::open(temp_dir.path()).await?;
    let created = store.create_session(new_session(1)).await?;

    let err = store
        .update_session(
            &created.id,
            Box::new(|session: &mut Session| -> interview_agent::Result<()> {
                session.current_question = 99;
                Err(InterviewError::failed_precondition("nope"))
            }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, InterviewError::FailedPrecondition(_)));

    let session = store.get_session(&created.id).await?.expect("still there");
    assert_eq!(session.current_question, 0);
    Ok(())
}

#[tokio::test]
async fn test_unknown_and_unsafe_ids() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = JsonFileStore::open(temp_dir.path()).await?;

    assert!(store.get_session("missing").await?.is_none());
    assert!(store.get_transcript("../../etc/passwd").await?.is_none());

    let err = store
        .update_session(
            "missing",
            Box::new(|_: &mut Session| -> interview_agent::Result<()> { Ok(()) }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, InterviewError::NotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn test_transcripts_round_trip() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = JsonFileStore::open(temp_dir.path()).await?;

    let mut transcript = Transcript::new("s1", 0, "I profile before optimizing.");
    transcript.audio_filename = Some("answer.webm".to_string());
    store.put_transcript(transcript.clone()).await?;

    let loaded = store
        .get_transcript(&transcript.id)
        .await?
        .expect("transcript persisted");
    assert_eq!(loaded, transcript);
    Ok(())
}

#[tokio::test]
async fn test_interviews_are_listed_oldest_first() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = JsonFileStore::open(temp_dir.path()).await?;

    let first = InterviewTemplate::new(NewInterview {
        title: "First".to_string(),
        description: None,
        config: InterviewConfig::default(),
        active: true,
    });
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = InterviewTemplate::new(NewInterview {
        title: "Second".to_string(),
        description: None,
        config: InterviewConfig::default(),
        active: true,
    });
    store.create_interview(second.clone()).await?;
    store.create_interview(first.clone()).await?;

    // Stray files in the directory are skipped
    tokio::fs::write(temp_dir.path().join("interviews").join("junk.json"), b"{").await?;

    let titles: Vec<String> = store
        .list_interviews()
        .await?
        .into_iter()
        .map(|i| i.title)
        .collect();
    assert_eq!(titles, vec!["First", "Second"]);
    Ok(())
}

#[tokio::test]
async fn test_result_upsert_keeps_review_state() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = JsonFileStore::open(temp_dir.path()).await?;

    let record = store
        .upsert_result(empty_result("s1"), Some("iv-1".to_string()), None)
        .await?;
    assert_eq!(record.status, ReviewStatus::Pending);

    store.set_result_status("s1", ReviewStatus::Accepted).await?;

    let mut refreshed = empty_result("s1");
    refreshed.average_score = 6.5;
    let updated = store.upsert_result(refreshed, None, None).await?;
    assert_eq!(updated.id, record.id);
    assert_eq!(updated.status, ReviewStatus::Accepted);
    assert_eq!(updated.interview_id.as_deref(), Some("iv-1"));
    assert_eq!(updated.result.average_score, 6.5);

    assert_eq!(store.list_results().await?.len(), 1);

    let err = store
        .set_result_status("missing", ReviewStatus::Rejected)
        .await
        .unwrap_err();
    assert!(matches!(err, InterviewError::NotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn test_interview_update_and_delete() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = JsonFileStore::open(temp_dir.path()).await?;

    let interview = InterviewTemplate::new(NewInterview {
        title: "Data Screen".to_string(),
        description: None,
        config: InterviewConfig::default(),
        active: true,
    });
    store.create_interview(interview.clone()).await?;

    let updated = store
        .update_interview(
            &interview.id,
            InterviewUpdate {
                description: Some("SQL and dbt".to_string()),
                active: Some(false),
                ..InterviewUpdate::default()
            },
        )
        .await?;
    assert!(!updated.active);
    assert_eq!(updated.title, "Data Screen");

    // The edit is on disk, not just in the returned value
    let reopened = JsonFileStore::open(temp_dir.path()).await?;
    let loaded = reopened
        .get_interview(&interview.id)
        .await?
        .expect("interview persisted");
    assert_eq!(loaded, updated);

    // A rejected edit leaves the record alone
    let err = reopened
        .update_interview(
            &interview.id,
            InterviewUpdate {
                title: Some("".to_string()),
                active: Some(true),
                ..InterviewUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, InterviewError::InvalidInput(_)));
    assert_eq!(reopened.get_interview(&interview.id).await?, Some(updated));

    let err = reopened
        .update_interview("missing", InterviewUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, InterviewError::NotFound { .. }));

    reopened.delete_interview(&interview.id).await?;
    assert!(reopened.get_interview(&interview.id).await?.is_none());
    let err = reopened.delete_interview(&interview.id).await.unwrap_err();
    assert!(matches!(err, InterviewError::NotFound { .. }));
    let err = reopened.delete_interview("../interviews").await.unwrap_err();
    assert!(matches!(err, InterviewError::NotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn test_result_delete() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = JsonFileStore::open(temp_dir.path()).await?;

    store.upsert_result(empty_result("s1"), None, None).await?;
    store.upsert_result(empty_result("s2"), None, None).await?;

    store.delete_result("s1").await?;
    assert!(store.get_result("s1").await?.is_none());
    let remaining: Vec<String> = store
        .list_results()
        .await?
        .into_iter()
        .map(|r| r.session_id)
        .collect();
    assert_eq!(remaining, vec!["s2"]);

    let err = store.delete_result("s1").await.unwrap_err();
    assert!(matches!(err, InterviewError::NotFound { .. }));
    Ok(())
}
