use super::error::SynthesisError;
use super::retry::RetryPolicy;
use super::segmenter::Segment;
use crate::infrastructure::repositories::TtsRepository;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Settled result for one segment. Produced exactly once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisOutcome {
    Success(Vec<u8>),
    Failure {
        last_error: SynthesisError,
        attempts: u32,
    },
}

impl SynthesisOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SynthesisOutcome::Success(_))
    }
}

/// Synthesis port for the pipeline: one provider, one voice, one model, and
/// the retry policy that turns every call into a settled outcome.
pub struct Synthesizer {
    tts_repo: Arc<dyn TtsRepository>,
    voice: String,
    model: String,
    retry_policy: RetryPolicy,
    attempt_timeout: Option<Duration>,
}

impl Synthesizer {
    pub fn new(
        tts_repo: Arc<dyn TtsRepository>,
        voice: String,
        model: String,
        retry_policy: RetryPolicy,
        attempt_timeout: Option<Duration>,
    ) -> Self {
        Self {
            tts_repo,
            voice,
            model,
            retry_policy,
            attempt_timeout,
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Synthesize a segment, retrying failed attempts up to the policy's budget.
    ///
    /// Never fails: exhaustion and cancellation both settle as
    /// `SynthesisOutcome::Failure`.
    pub async fn synthesize(&self, segment: &Segment, cancel: &CancellationToken) -> SynthesisOutcome {
        let max_attempts = self.retry_policy.max_attempts.max(1);
        let mut attempts = 0;

        loop {
            if cancel.is_cancelled() {
                return Self::cancelled(segment, attempts);
            }

            attempts += 1;
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(SynthesisError::Cancelled),
                result = self.attempt(&segment.text) => result,
            };

            let error = match result {
                Ok(audio) => {
                    tracing::debug!(
                        segment_index = segment.index,
                        attempt = attempts,
                        audio_size = audio.len(),
                        "Segment synthesized"
                    );
                    return SynthesisOutcome::Success(audio);
                }
                Err(SynthesisError::Cancelled) => return Self::cancelled(segment, attempts),
                Err(error) => error,
            };

            tracing::warn!(
                segment_index = segment.index,
                attempt = attempts,
                max_attempts = max_attempts,
                error = %error,
                "Synthesis attempt failed"
            );

            if attempts >= max_attempts {
                tracing::error!(
                    segment_index = segment.index,
                    attempts = attempts,
                    error = %error,
                    "Max retries reached, segment exhausted"
                );
                return SynthesisOutcome::Failure {
                    last_error: error,
                    attempts,
                };
            }

            let delay = self.retry_policy.delay_for(attempts);
            if !delay.is_zero() {
                tracing::debug!(
                    segment_index = segment.index,
                    delay_ms = delay.as_millis() as u64,
                    "Backing off before retry"
                );
                tokio::select! {
                    _ = cancel.cancelled() => return Self::cancelled(segment, attempts),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }

    async fn attempt(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let call = self.tts_repo.synthesize(text.trim(), &self.voice, &self.model);
        match self.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| SynthesisError::Timeout(limit))?,
            None => call.await,
        }
    }

    fn cancelled(segment: &Segment, attempts: u32) -> SynthesisOutcome {
        tracing::debug!(segment_index = segment.index, attempts = attempts, "Segment cancelled");
        SynthesisOutcome::Failure {
            last_error: SynthesisError::Cancelled,
            attempts,
        }
    }
}
