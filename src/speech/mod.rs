//! Speech collaborators: transcription (STT) and synthesis (TTS).
//!
//! The engines run out of process; the core only sees these traits.

mod http;

pub use http::{HttpSynthesisGateway, HttpTranscriptionGateway};

use anyhow::Result;

/// Sentinel stored when the transcription engine fails
pub const TRANSCRIPTION_FAILED: &str = "[Transcription failed]";

/// An uploaded audio answer
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

#[async_trait::async_trait]
pub trait TranscriptionGateway: Send + Sync {
    /// Convert an audio blob to text
    async fn transcribe(&self, audio: AudioUpload) -> Result<String>;
}

#[async_trait::async_trait]
pub trait SynthesisGateway: Send + Sync {
    /// Convert text to WAV bytes using `voice`
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>>;
}
