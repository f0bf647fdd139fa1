use crate::domain::narration::SynthesisError;
use async_trait::async_trait;

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (OpenAI, AWS Polly, ...)
///
/// Implementations handle exactly one provider call per invocation. Splitting
/// long text, retrying and merging audio are the narration pipeline's job.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize one piece of text to speech
    ///
    /// Returns the provider's audio payload (MP3 format)
    ///
    /// # Arguments
    /// * `text` - Text within the provider's length limit
    /// * `voice` - Provider-specific voice identifier
    /// * `model` - Provider-specific model or engine identifier
    ///
    /// # Errors
    /// Returns `SynthesisError::Provider` if the call fails or the provider is unavailable
    async fn synthesize(&self, text: &str, voice: &str, model: &str)
        -> Result<Vec<u8>, SynthesisError>;

    /// Check that `voice` and `model` are accepted by this provider
    ///
    /// Called once before any synthesis so a bad voice fails the job up front
    /// instead of exhausting every segment's retries.
    fn validate_voice(&self, _voice: &str, _model: &str) -> Result<(), String> {
        Ok(())
    }
}
