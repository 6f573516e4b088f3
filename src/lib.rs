pub mod config;
pub mod error;
pub mod http;
pub mod llm;
pub mod questions;
pub mod scoring;
pub mod session;
pub mod speech;
pub mod store;

pub use config::Config;
pub use error::{InterviewError, Result};
pub use http::{create_router, AppState};
pub use llm::{CompletionGateway, OllamaClient};
pub use questions::{GenerationRequest, QuestionGenerator, QuestionSource};
pub use scoring::{ResponseScorer, ScoreResult, ScoringPolicy};
pub use session::{InterviewResult, Session, SessionManager, SessionStatus, Transcript};
pub use speech::{SynthesisGateway, TranscriptionGateway};
pub use store::{JsonFileStore, MemoryStore, Store};
