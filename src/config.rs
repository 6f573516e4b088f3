use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub llm: LlmConfig,
    pub speech: SpeechConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Connection details for the locally hosted language model (Ollama)
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    /// Question generation and editing
    pub generation_timeout_secs: u64,
    /// Standalone scoring endpoint
    pub scoring_timeout_secs: u64,
    /// Per-question scoring while building session results
    pub inline_scoring_timeout_secs: u64,
    pub health_timeout_secs: u64,
}

impl LlmConfig {
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn scoring_timeout(&self) -> Duration {
        Duration::from_secs(self.scoring_timeout_secs)
    }

    pub fn inline_scoring_timeout(&self) -> Duration {
        Duration::from_secs(self.inline_scoring_timeout_secs)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "gemma3:27b".to_string(),
            generation_timeout_secs: 60,
            scoring_timeout_secs: 180,
            inline_scoring_timeout_secs: 60,
            health_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    /// OpenAI-compatible `/v1/audio/transcriptions` endpoint
    pub transcription_url: String,
    /// TTS sidecar accepting `{text, voice}` and returning WAV bytes
    pub synthesis_url: String,
    pub default_voice: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_path: String,
}

impl Config {
    /// Load configuration: built-in defaults, then the (optional) file at
    /// `path`, then `INTERVIEW_AGENT__SECTION__KEY` environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        let defaults = LlmConfig::default();

        let settings = config::Config::builder()
            .set_default("service.name", "interview-agent")?
            .set_default("service.http.bind", "0.0.0.0")?
            .set_default("service.http.port", 8001)?
            .set_default("llm.base_url", defaults.base_url)?
            .set_default("llm.model", defaults.model)?
            .set_default("llm.generation_timeout_secs", defaults.generation_timeout_secs)?
            .set_default("llm.scoring_timeout_secs", defaults.scoring_timeout_secs)?
            .set_default(
                "llm.inline_scoring_timeout_secs",
                defaults.inline_scoring_timeout_secs,
            )?
            .set_default("llm.health_timeout_secs", defaults.health_timeout_secs)?
            .set_default(
                "speech.transcription_url",
                "http://127.0.0.1:9000/v1/audio/transcriptions",
            )?
            .set_default("speech.synthesis_url", "http://127.0.0.1:9001/synthesize")?
            .set_default("speech.default_voice", "en_US-lessac-high")?
            .set_default("speech.timeout_secs", 120)?
            .set_default("storage.backend", "file")?
            .set_default("storage.data_path", "./data")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("INTERVIEW_AGENT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = Config::load("/nonexistent/interview-agent").unwrap();
        assert_eq!(cfg.service.http.port, 8001);
        assert_eq!(cfg.llm.model, "gemma3:27b");
        assert_eq!(cfg.llm.scoring_timeout(), Duration::from_secs(180));
        assert_eq!(cfg.llm.inline_scoring_timeout(), Duration::from_secs(60));
        assert_eq!(cfg.storage.backend, StorageBackend::File);
    }
}
