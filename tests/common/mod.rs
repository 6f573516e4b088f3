// Shared test doubles for the interview-agent integration tests

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use interview_agent::config::LlmConfig;
use interview_agent::llm::{CompletionError, CompletionGateway, CompletionInput, CompletionRequest};
use interview_agent::questions::QuestionGenerator;
use interview_agent::scoring::{ResponseScorer, ScoringConfig};
use interview_agent::session::SessionManager;
use interview_agent::speech::{AudioUpload, SynthesisGateway, TranscriptionGateway};
use interview_agent::store::{MemoryStore, Store};
use interview_agent::AppState;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const MODEL: &str = "test-model";

/// A well-formed rubric answer with a final score of 7.5
pub const RUBRIC_REPLY: &str = "Linguistic:
Clarity & Structure: 8/10 - Clear.
Grammar & Vocabulary: 8/10 - Correct.
Conciseness: 8/10 - On point.
Linguistic Avg: 8.0/10

Behavioral:
Professionalism: 7/10 - Polite.
Confidence: 7/10 - Steady.
Engagement: 7/10 - Engaged.
Behavioral Avg: 7.0/10

Final Score: 7.5/10
Strengths: Concrete examples.
Areas for improvement: Shorter openings.
Summary: Solid answer that stays on the question.";

type Responder = dyn Fn(&CompletionRequest) -> Result<String, CompletionError> + Send + Sync;

/// Completion gateway answering from a closure and recording every request
pub struct ScriptedGateway {
    responder: Box<Responder>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGateway {
    pub fn new(
        responder: impl Fn(&CompletionRequest) -> Result<String, CompletionError>
            + Send
            + Sync
            + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Same reply to every call
    pub fn replying(text: &'static str) -> Arc<Self> {
        Self::new(move |_| Ok(text.to_string()))
    }

    /// Every call fails as if the server were down
    pub fn failing() -> Arc<Self> {
        Self::new(|_| Err(CompletionError::Request("connection refused".to_string())))
    }

    /// Chat calls (question generation) get `questions`, prompt calls
    /// (scoring) get `scoring`
    pub fn split(questions: &'static str, scoring: &'static str) -> Arc<Self> {
        Self::new(move |request| match request.input {
            CompletionInput::Chat(_) => Ok(questions.to_string()),
            CompletionInput::Prompt(_) => Ok(scoring.to_string()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let reply = (self.responder)(&request);
        self.requests.lock().unwrap().push(request);
        reply
    }

    fn default_model(&self) -> &str {
        MODEL
    }
}

pub struct StubTranscriber {
    pub text: Option<&'static str>,
}

#[async_trait]
impl TranscriptionGateway for StubTranscriber {
    async fn transcribe(&self, _audio: AudioUpload) -> Result<String> {
        match self.text {
            Some(text) => Ok(text.to_string()),
            None => bail!("whisper offline"),
        }
    }
}

pub struct StubSynthesizer {
    pub bytes: usize,
}

#[async_trait]
impl SynthesisGateway for StubSynthesizer {
    async fn synthesize(&self, _text: &str, _voice: &str) -> Result<Vec<u8>> {
        Ok(vec![0u8; self.bytes])
    }
}

pub fn llm_config() -> LlmConfig {
    LlmConfig {
        generation_timeout_secs: 1,
        scoring_timeout_secs: 1,
        inline_scoring_timeout_secs: 1,
        health_timeout_secs: 1,
        ..LlmConfig::default()
    }
}

pub fn generator(gateway: Arc<ScriptedGateway>) -> QuestionGenerator {
    QuestionGenerator::new(gateway, Duration::from_secs(1))
}

pub fn scorer(gateway: Arc<ScriptedGateway>) -> ResponseScorer {
    ResponseScorer::new(gateway, ScoringConfig::from(&llm_config()))
}

pub fn manager(gateway: Arc<ScriptedGateway>) -> (SessionManager, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let shared: Arc<dyn Store> = store.clone();
    let manager = SessionManager::new(
        shared,
        Arc::new(generator(gateway.clone())),
        Arc::new(scorer(gateway)),
    );
    (manager, store)
}

pub fn app_state(gateway: Arc<ScriptedGateway>) -> AppState {
    app_state_with(gateway, Some("I led the migration to Rust."), 2048)
}

pub fn app_state_with(
    gateway: Arc<ScriptedGateway>,
    transcript: Option<&'static str>,
    synthesized_bytes: usize,
) -> AppState {
    AppState::new(
        Arc::new(MemoryStore::new()),
        gateway,
        &llm_config(),
        Arc::new(StubTranscriber { text: transcript }),
        Arc::new(StubSynthesizer {
            bytes: synthesized_bytes,
        }),
        "en_US-lessac-high",
    )
}

/// `n` space-separated words
pub fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}
