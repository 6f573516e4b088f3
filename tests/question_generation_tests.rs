// Integration tests for question generation
//
// These tests drive QuestionGenerator against scripted completion gateways
// and check the fallback rules end to end.

mod common;

use anyhow::Result;
use common::{generator, ScriptedGateway, MODEL};
use interview_agent::error::InterviewError;
use interview_agent::llm::{CompletionError, CompletionInput};
use interview_agent::questions::{EditQuestionRequest, GenerationRequest, QuestionSource};

const THREE_QUESTIONS: &str = "Here are your questions:
1. Can you describe your experience designing distributed systems?
2. **Question 2:** How do you approach debugging a production outage?
- What is your process for reviewing code from teammates?";

fn rust_job(n: i64) -> GenerationRequest {
    GenerationRequest::for_job(
        Some("Backend Engineer".to_string()),
        Some("Rust services, PostgreSQL, Kubernetes and observability".to_string()),
        n,
    )
}

#[tokio::test]
async fn test_model_questions_are_cleaned() -> Result<()> {
    let gateway = ScriptedGateway::replying(THREE_QUESTIONS);
    let generated = generator(gateway.clone()).generate(&rust_job(3)).await?;

    assert_eq!(generated.source, QuestionSource::Ollama);
    assert!(!generated.used_fallback);
    assert_eq!(generated.model, MODEL);
    assert_eq!(
        generated.questions,
        vec![
            "Can you describe your experience designing distributed systems?",
            "How do you approach debugging a production outage?",
            "What is your process for reviewing code from teammates?",
        ]
    );
    assert_eq!(generated.raw, THREE_QUESTIONS);
    Ok(())
}

#[tokio::test]
async fn test_generation_request_shape() -> Result<()> {
    let gateway = ScriptedGateway::replying(THREE_QUESTIONS);
    let mut request = rust_job(3);
    request.max_tokens = 4000;
    generator(gateway.clone()).generate(&request).await?;

    let requests = gateway.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].options.max_tokens, 500);
    assert_eq!(requests[0].options.temperature, 0.7);
    match &requests[0].input {
        CompletionInput::Chat(messages) => {
            assert_eq!(messages.len(), 1);
            assert!(messages[0].content.contains("Generate exactly 3"));
            assert!(messages[0].content.contains("Backend Engineer"));
        }
        other => panic!("expected a chat request, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_short_model_output_is_topped_up() -> Result<()> {
    let gateway = ScriptedGateway::replying(THREE_QUESTIONS);
    let generated = generator(gateway).generate(&rust_job(6)).await?;

    assert_eq!(generated.source, QuestionSource::Ollama);
    assert_eq!(generated.questions.len(), 6);
    assert!(generated.questions.iter().all(|q| q.ends_with('?')));
    assert_eq!(
        generated.questions[0],
        "Can you describe your experience designing distributed systems?"
    );
    Ok(())
}

#[tokio::test]
async fn test_unreachable_model_uses_templates() -> Result<()> {
    let gateway = ScriptedGateway::failing();
    let generated = generator(gateway).generate(&rust_job(5)).await?;

    assert_eq!(generated.source, QuestionSource::Fallback);
    assert!(generated.used_fallback);
    assert!(generated
        .fallback_reason
        .as_deref()
        .is_some_and(|r| r.contains("connection refused")));
    assert_eq!(generated.questions.len(), 5);
    assert_eq!(
        generated.questions[0],
        "Can you walk me through a recent project where you applied rust?"
    );
    Ok(())
}

#[tokio::test]
async fn test_fallback_is_deterministic() -> Result<()> {
    let first = generator(ScriptedGateway::failing())
        .generate(&rust_job(12))
        .await?;
    let second = generator(ScriptedGateway::failing())
        .generate(&rust_job(12))
        .await?;
    assert_eq!(first.questions, second.questions);
    Ok(())
}

#[tokio::test]
async fn test_unparseable_output_falls_back() -> Result<()> {
    let gateway = ScriptedGateway::replying("Sure! Happy to help.");
    let generated = generator(gateway).generate(&rust_job(4)).await?;

    assert_eq!(generated.source, QuestionSource::Fallback);
    assert_eq!(generated.questions.len(), 4);
    Ok(())
}

#[tokio::test]
async fn test_timeout_falls_back() -> Result<()> {
    let gateway = ScriptedGateway::new(|_| Err(CompletionError::Timeout));
    let generated = generator(gateway).generate(&rust_job(2)).await?;

    assert!(generated.used_fallback);
    assert_eq!(generated.fallback_reason.as_deref(), Some("LLM request timed out"));
    Ok(())
}

#[tokio::test]
async fn test_question_count_is_clamped_to_twenty() -> Result<()> {
    for gateway in [ScriptedGateway::replying(THREE_QUESTIONS), ScriptedGateway::failing()] {
        let generated = generator(gateway).generate(&rust_job(50)).await?;
        assert_eq!(generated.questions.len(), 20);
        assert!(generated.questions.iter().all(|q| q.ends_with('?')));
    }
    Ok(())
}

#[tokio::test]
async fn test_non_positive_count_is_rejected() {
    let gateway = ScriptedGateway::replying(THREE_QUESTIONS);
    let err = generator(gateway.clone())
        .generate(&rust_job(0))
        .await
        .unwrap_err();

    assert!(matches!(err, InterviewError::InvalidInput(_)));
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn test_request_without_any_input_is_rejected() {
    let gateway = ScriptedGateway::replying(THREE_QUESTIONS);
    let request = GenerationRequest::for_job(None, None, 3);
    let err = generator(gateway).generate(&request).await.unwrap_err();
    assert!(matches!(err, InterviewError::InvalidInput(_)));
}

#[tokio::test]
async fn test_prompt_only_request_cannot_fall_back_without_job_text() {
    let request: GenerationRequest =
        serde_json::from_str(r#"{"prompt": "   ", "messages": [{"role": "user", "content": " "}]}"#)
            .unwrap();
    let err = generator(ScriptedGateway::failing())
        .generate(&request)
        .await
        .unwrap_err();
    assert!(matches!(err, InterviewError::InvalidInput(_)));
}

#[tokio::test]
async fn test_prompt_description_feeds_fallback() -> Result<()> {
    let request: GenerationRequest = serde_json::from_str(
        r#"{"prompt": "Job Description: Kotlin Android developer. Provide only questions.", "num_questions": 2}"#,
    )?;
    let generated = generator(ScriptedGateway::failing()).generate(&request).await?;

    assert_eq!(generated.source, QuestionSource::Fallback);
    assert_eq!(
        generated.questions[0],
        "Can you walk me through a recent project where you applied kotlin?"
    );
    Ok(())
}

#[tokio::test]
async fn test_edit_question_takes_first_line() -> Result<()> {
    let gateway = ScriptedGateway::replying(
        "\"How do you debug a production outage under time pressure?\"\nHope this helps!",
    );
    let request = EditQuestionRequest {
        original_question: "How do you debug outages?".to_string(),
        edit_instruction: "Mention time pressure".to_string(),
        job_description: None,
        job_role: Some("SRE".to_string()),
        model: None,
        temperature: 0.7,
    };

    let edited = generator(gateway.clone()).edit_question(&request).await?;
    assert_eq!(
        edited.edited_question,
        "How do you debug a production outage under time pressure?"
    );
    assert_eq!(edited.original_question, "How do you debug outages?");
    assert_eq!(gateway.requests()[0].options.max_tokens, 200);
    Ok(())
}

#[tokio::test]
async fn test_edit_question_surfaces_upstream_failure() {
    let request = EditQuestionRequest {
        original_question: "How do you debug outages?".to_string(),
        edit_instruction: "Make it harder".to_string(),
        job_description: None,
        job_role: None,
        model: None,
        temperature: 0.7,
    };
    let err = generator(ScriptedGateway::failing())
        .edit_question(&request)
        .await
        .unwrap_err();
    assert!(matches!(err, InterviewError::UpstreamUnavailable(_)));
}
