use crate::config::LlmConfig;
use crate::llm::CompletionGateway;
use crate::questions::QuestionGenerator;
use crate::scoring::{ResponseScorer, ScoringConfig};
use crate::session::SessionManager;
use crate::speech::{SynthesisGateway, TranscriptionGateway};
use crate::store::Store;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub generator: Arc<QuestionGenerator>,
    pub scorer: Arc<ResponseScorer>,
    pub store: Arc<dyn Store>,
    pub transcriber: Arc<dyn TranscriptionGateway>,
    pub synthesizer: Arc<dyn SynthesisGateway>,

    /// Voice used by `/synthesize` when the request names none
    pub default_voice: String,
}

impl AppState {
    /// Wire the generator, scorer and session manager around one completion
    /// gateway and one store
    pub fn new(
        store: Arc<dyn Store>,
        completion: Arc<dyn CompletionGateway>,
        llm: &LlmConfig,
        transcriber: Arc<dyn TranscriptionGateway>,
        synthesizer: Arc<dyn SynthesisGateway>,
        default_voice: impl Into<String>,
    ) -> Self {
        let generator = Arc::new(QuestionGenerator::new(
            Arc::clone(&completion),
            llm.generation_timeout(),
        ));
        let scorer = Arc::new(ResponseScorer::new(completion, ScoringConfig::from(llm)));
        let sessions = Arc::new(SessionManager::new(
            Arc::clone(&store),
            Arc::clone(&generator),
            Arc::clone(&scorer),
        ));

        Self {
            sessions,
            generator,
            scorer,
            store,
            transcriber,
            synthesizer,
            default_voice: default_voice.into(),
        }
    }
}
