use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use super::{AudioUpload, SynthesisGateway, TranscriptionGateway};
use crate::config::SpeechConfig;

/// Posts audio to an OpenAI-compatible `/v1/audio/transcriptions` endpoint
pub struct HttpTranscriptionGateway {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl HttpTranscriptionGateway {
    pub fn from_config(config: &SpeechConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build transcription client")?;

        Ok(Self {
            client,
            url: config.transcription_url.clone(),
        })
    }
}

#[async_trait::async_trait]
impl TranscriptionGateway for HttpTranscriptionGateway {
    async fn transcribe(&self, audio: AudioUpload) -> Result<String> {
        let size = audio.bytes.len();
        let mut part = reqwest::multipart::Part::bytes(audio.bytes)
            .file_name(audio.filename.unwrap_or_else(|| "audio.tmp".to_string()));
        if let Some(content_type) = audio.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .context("Invalid audio content type")?;
        }

        let form = reqwest::multipart::Form::new()
            .text("response_format", "json")
            .part("file", part);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .context("Failed to reach transcription service")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Transcription service returned {}", status);
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .context("Failed to parse transcription response")?;

        info!("Transcribed {} bytes of audio into {} characters", size, parsed.text.len());
        Ok(parsed.text.trim().to_string())
    }
}

/// Posts `{text, voice}` to a TTS sidecar that answers with WAV bytes
pub struct HttpSynthesisGateway {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    voice: &'a str,
}

impl HttpSynthesisGateway {
    pub fn from_config(config: &SpeechConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build synthesis client")?;

        Ok(Self {
            client,
            url: config.synthesis_url.clone(),
        })
    }
}

#[async_trait::async_trait]
impl SynthesisGateway for HttpSynthesisGateway {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(&self.url)
            .json(&SynthesisRequest { text, voice })
            .send()
            .await
            .context("Failed to reach synthesis service")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Synthesis service returned {}", status);
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read synthesized audio")?;

        Ok(bytes.to_vec())
    }
}
