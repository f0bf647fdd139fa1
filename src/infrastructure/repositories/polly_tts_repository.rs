use super::tts_repository::TtsRepository;
use crate::domain::narration::SynthesisError;
use async_trait::async_trait;
use aws_sdk_polly::{
    types::{Engine, OutputFormat, VoiceId},
    Client as PollyClient,
};
use std::sync::Arc;

/// AWS Polly has a limit of 3000 characters per request
pub const MAX_INPUT_LENGTH: usize = 3000;

/// AWS Polly implementation of TTS repository.
///
/// `voice` is a Polly voice id (e.g. "Joanna"); `model` is the engine
/// ("neural", "standard", "long-form", "generative").
pub struct PollyTtsRepository {
    polly_client: Arc<PollyClient>,
}

impl PollyTtsRepository {
    pub fn new(polly_client: Arc<PollyClient>) -> Self {
        Self { polly_client }
    }
}

fn parse_engine(model: &str) -> Engine {
    Engine::from(model.to_lowercase().as_str())
}

#[async_trait]
impl TtsRepository for PollyTtsRepository {
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        model: &str,
    ) -> Result<Vec<u8>, SynthesisError> {
        let start_time = std::time::Instant::now();
        let voice_id = VoiceId::from(voice);
        let engine = parse_engine(model);

        tracing::debug!(
            voice_id = ?voice_id,
            engine = ?engine,
            output_format = "Mp3",
            text_length = text.chars().count(),
            text_preview = %text.chars().take(200).collect::<String>(),
            "Calling AWS Polly synthesize_speech"
        );

        // Clone voice_id for error logging since it will be moved
        let voice_id_for_error = voice_id.clone();

        let result = self
            .polly_client
            .synthesize_speech()
            .text(text)
            .voice_id(voice_id)
            .output_format(OutputFormat::Mp3)
            .engine(engine.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    error_display = %e,
                    voice_id = ?voice_id_for_error,
                    engine = ?engine,
                    text_length = text.chars().count(),
                    "AWS Polly synthesize_speech failed"
                );
                SynthesisError::Provider(format!("AWS Polly error: {}", e))
            })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            SynthesisError::Provider(format!("Failed to read audio stream: {}", e))
        })?;

        let audio_bytes = audio_stream.into_bytes().to_vec();
        tracing::debug!(
            provider = "polly",
            latency_ms = start_time.elapsed().as_millis() as u64,
            audio_size = audio_bytes.len(),
            "Audio stream collected successfully"
        );

        Ok(audio_bytes)
    }

    fn validate_voice(&self, voice: &str, model: &str) -> Result<(), String> {
        if !VoiceId::values().contains(&voice) {
            return Err(format!("unknown AWS Polly voice '{}'", voice));
        }
        if !Engine::values().contains(&model.to_lowercase().as_str()) {
            return Err(format!(
                "unknown AWS Polly engine '{}', expected neural, standard, long-form or generative",
                model
            ));
        }
        Ok(())
    }
}
