//! Speech synthesis and transcription capabilities.

use crate::{
    CapabilityStatus,
    audio::{AudioClip, DEFAULT_SAMPLE_RATE},
    generator::probe,
};
use anyhow::{Context, Result, bail};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        AudioInput, CreateSpeechRequestArgs, CreateTranscriptionRequestArgs, SpeechModel,
        SpeechResponseFormat, Voice,
    },
};
use async_trait::async_trait;
use tracing::debug;

/// Turns interviewer text into audio.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesizes `text` and returns a WAV file.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;

    fn name(&self) -> String;

    async fn status(&self) -> CapabilityStatus;
}

/// Turns a candidate's recording into text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    async fn transcribe(&self, clip: &AudioClip) -> Result<String>;

    fn name(&self) -> String;

    async fn status(&self) -> CapabilityStatus;
}

/// Maps a configured voice name onto the API's voice set.
pub fn parse_voice(name: &str) -> Result<Voice> {
    Ok(match name.to_ascii_lowercase().as_str() {
        "alloy" => Voice::Alloy,
        "echo" => Voice::Echo,
        "fable" => Voice::Fable,
        "onyx" => Voice::Onyx,
        "nova" => Voice::Nova,
        "shimmer" => Voice::Shimmer,
        other => bail!("Unsupported voice: '{other}'"),
    })
}

fn parse_speech_model(name: &str) -> SpeechModel {
    match name {
        "tts-1" => SpeechModel::Tts1,
        "tts-1-hd" => SpeechModel::Tts1Hd,
        other => SpeechModel::Other(other.to_string()),
    }
}

/// A `SpeechSynthesizer` backed by an OpenAI-compatible speech endpoint.
pub struct OpenAISpeechSynthesizer {
    client: Client<OpenAIConfig>,
    model: String,
    voice: Voice,
}

impl OpenAISpeechSynthesizer {
    pub fn new(config: OpenAIConfig, model: String, voice: Voice) -> Self {
        Self {
            client: Client::with_config(config),
            model,
            voice,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAISpeechSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let request = CreateSpeechRequestArgs::default()
            .input(text)
            .model(parse_speech_model(&self.model))
            .voice(self.voice.clone())
            .response_format(SpeechResponseFormat::Wav)
            .build()?;

        let response = self
            .client
            .audio()
            .speech(request)
            .await
            .context("Speech synthesis request failed")?;
        debug!(bytes = response.bytes.len(), "Synthesized speech");
        Ok(response.bytes.to_vec())
    }

    fn name(&self) -> String {
        self.model.clone()
    }

    async fn status(&self) -> CapabilityStatus {
        probe(&self.client).await
    }
}

/// A `SpeechTranscriber` backed by an OpenAI-compatible transcription endpoint.
pub struct OpenAISpeechTranscriber {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAISpeechTranscriber {
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

#[async_trait]
impl SpeechTranscriber for OpenAISpeechTranscriber {
    async fn transcribe(&self, clip: &AudioClip) -> Result<String> {
        let wav = clip.to_wav().context("Failed to encode audio as WAV")?;
        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8("answer.wav".to_string(), wav))
            .model(&self.model)
            .build()?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .context("Transcription request failed")?;
        debug!(
            duration_ms = clip.duration_ms(),
            chars = response.text.len(),
            "Transcribed candidate audio"
        );
        Ok(response.text.trim().to_string())
    }

    fn name(&self) -> String {
        self.model.clone()
    }

    async fn status(&self) -> CapabilityStatus {
        probe(&self.client).await
    }
}

/// Returns a short silent WAV instead of real speech.
pub struct PlaceholderSpeechSynthesizer;

#[async_trait]
impl SpeechSynthesizer for PlaceholderSpeechSynthesizer {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
        // 250ms of silence.
        AudioClip::new(vec![0.0; DEFAULT_SAMPLE_RATE as usize / 4], DEFAULT_SAMPLE_RATE).to_wav()
    }

    fn name(&self) -> String {
        "Placeholder TTS".to_string()
    }

    async fn status(&self) -> CapabilityStatus {
        CapabilityStatus::Ready
    }
}

/// Returns the same fixed transcription for any recording.
pub struct PlaceholderSpeechTranscriber;

pub const PLACEHOLDER_TRANSCRIPTION: &str = "This is a placeholder transcription.";

#[async_trait]
impl SpeechTranscriber for PlaceholderSpeechTranscriber {
    async fn transcribe(&self, _clip: &AudioClip) -> Result<String> {
        Ok(PLACEHOLDER_TRANSCRIPTION.to_string())
    }

    fn name(&self) -> String {
        "Placeholder STT".to_string()
    }

    async fn status(&self) -> CapabilityStatus {
        CapabilityStatus::Ready
    }
}
