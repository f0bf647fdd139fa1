use super::tts_repository::TtsRepository;
use crate::domain::narration::SynthesisError;
use async_openai::{
    config::OpenAIConfig,
    types::{CreateSpeechRequest, SpeechModel, SpeechResponseFormat, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// OpenAI rejects input longer than this many characters
pub const MAX_INPUT_LENGTH: usize = 4096;

/// OpenAI TTS implementation of TTS repository
pub struct OpenAiTtsRepository {
    client: Arc<Client<OpenAIConfig>>,
}

impl OpenAiTtsRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>) -> Self {
        Self { client }
    }

    pub fn from_api_key(api_key: &str) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self::new(Arc::new(Client::with_config(config)))
    }
}

/// Parse model string to SpeechModel enum
fn parse_model(model: &str) -> SpeechModel {
    match model {
        "tts-1" => SpeechModel::Tts1,
        "tts-1-hd" => SpeechModel::Tts1Hd,
        other => SpeechModel::Other(other.to_string()),
    }
}

/// Parse voice string to Voice enum
fn parse_voice(voice: &str) -> Option<Voice> {
    match voice.to_lowercase().as_str() {
        "alloy" => Some(Voice::Alloy),
        "echo" => Some(Voice::Echo),
        "fable" => Some(Voice::Fable),
        "onyx" => Some(Voice::Onyx),
        "nova" => Some(Voice::Nova),
        "shimmer" => Some(Voice::Shimmer),
        _ => None,
    }
}

#[async_trait]
impl TtsRepository for OpenAiTtsRepository {
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        model: &str,
    ) -> Result<Vec<u8>, SynthesisError> {
        let start_time = std::time::Instant::now();
        let text_length = text.chars().count();

        tracing::debug!(
            model = model,
            voice = voice,
            text_length = text_length,
            text_preview = %text.chars().take(200).collect::<String>(),
            "Calling OpenAI TTS API"
        );

        if text_length > MAX_INPUT_LENGTH {
            // Over-length single words still go out; OpenAI decides
            tracing::warn!(
                text_length = text_length,
                max_input_length = MAX_INPUT_LENGTH,
                "Input exceeds OpenAI length limit"
            );
        }

        let voice_enum = parse_voice(voice).ok_or_else(|| {
            SynthesisError::Provider(format!("unknown OpenAI voice: {}", voice))
        })?;

        let request = CreateSpeechRequest {
            model: parse_model(model),
            input: text.to_string(),
            voice: voice_enum,
            response_format: Some(SpeechResponseFormat::Mp3),
            speed: None, // Defaults to 1.0
        };

        let response = self.client.audio().speech(request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model = model,
                voice = voice,
                text_length = text_length,
                "OpenAI TTS API call failed"
            );
            SynthesisError::Provider(format!("OpenAI TTS error: {}", e))
        })?;

        let audio_bytes = response.bytes.to_vec();
        tracing::debug!(
            provider = "openai",
            latency_ms = start_time.elapsed().as_millis() as u64,
            audio_size = audio_bytes.len(),
            "OpenAI TTS audio received successfully"
        );

        Ok(audio_bytes)
    }

    fn validate_voice(&self, voice: &str, _model: &str) -> Result<(), String> {
        parse_voice(voice).map(|_| ()).ok_or_else(|| {
            format!(
                "unknown OpenAI voice '{}', expected one of alloy, echo, fable, onyx, nova, shimmer",
                voice
            )
        })
    }
}
