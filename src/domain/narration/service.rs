use super::assembler::{assemble, FailedSegment};
use super::dispatcher::{Dispatcher, FailurePolicy, SegmentProgress};
use super::error::NarrationError;
use super::retry::RetryPolicy;
use super::segmenter::segment;
use super::synthesizer::Synthesizer;
use super::text::clean_text;
use crate::infrastructure::repositories::TtsRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// OpenAI accepts 4096 characters per request; half of that keeps each call short
pub const DEFAULT_MAX_SEGMENT_LENGTH: usize = 2048;
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

#[derive(Debug, Clone)]
pub struct NarrationSettings {
    pub max_segment_length: usize,
    pub voice: String,
    pub model: String,
    pub retry_policy: RetryPolicy,
    pub max_concurrency: usize,
    pub attempt_timeout: Option<Duration>,
    pub job_timeout: Option<Duration>,
    pub failure_policy: FailurePolicy,
    pub clean_markup: bool,
}

impl Default for NarrationSettings {
    fn default() -> Self {
        Self {
            max_segment_length: DEFAULT_MAX_SEGMENT_LENGTH,
            voice: "nova".to_string(),
            model: "tts-1".to_string(),
            retry_policy: RetryPolicy::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            attempt_timeout: None,
            job_timeout: None,
            failure_policy: FailurePolicy::Skip,
            clean_markup: false,
        }
    }
}

impl NarrationSettings {
    pub fn validate(&self) -> Result<(), NarrationError> {
        if self.max_segment_length == 0 {
            return Err(NarrationError::InvalidConfiguration(
                "max segment length must be positive".to_string(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(NarrationError::InvalidConfiguration(
                "max concurrency must be positive".to_string(),
            ));
        }
        if self.voice.trim().is_empty() || self.model.trim().is_empty() {
            return Err(NarrationError::InvalidConfiguration(
                "voice and model must be set".to_string(),
            ));
        }
        if matches!(self.attempt_timeout, Some(t) if t.is_zero())
            || matches!(self.job_timeout, Some(t) if t.is_zero())
        {
            return Err(NarrationError::InvalidConfiguration(
                "timeouts must be positive".to_string(),
            ));
        }
        self.retry_policy.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Every segment is in the audio
    Complete,
    /// Some segments are missing, see `failed`
    Partial,
}

#[derive(Debug, Clone, Serialize)]
pub struct NarrationReport {
    pub job_id: Uuid,
    pub status: JobStatus,
    #[serde(skip)]
    pub audio: Vec<u8>,
    pub audio_size_bytes: usize,
    pub segment_count: usize,
    pub succeeded: Vec<usize>,
    pub failed: Vec<FailedSegment>,
    pub elapsed_ms: u64,
    pub finished_at: DateTime<Utc>,
}

pub struct NarrationService {
    settings: NarrationSettings,
    dispatcher: Dispatcher,
    cancel: CancellationToken,
}

impl NarrationService {
    pub fn new(
        tts_repo: Arc<dyn TtsRepository>,
        settings: NarrationSettings,
    ) -> Result<Self, NarrationError> {
        settings.validate()?;
        tts_repo
            .validate_voice(&settings.voice, &settings.model)
            .map_err(NarrationError::InvalidConfiguration)?;

        let synthesizer = Synthesizer::new(
            tts_repo,
            settings.voice.clone(),
            settings.model.clone(),
            settings.retry_policy.clone(),
            settings.attempt_timeout,
        );
        let dispatcher = Dispatcher::new(
            Arc::new(synthesizer),
            settings.max_concurrency,
            settings.failure_policy,
        )?;

        Ok(Self {
            settings,
            dispatcher,
            cancel: CancellationToken::new(),
        })
    }

    /// Cancelling this token stops every running and future job of this service
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn settings(&self) -> &NarrationSettings {
        &self.settings
    }
}

#[async_trait]
pub trait NarrationServiceApi: Send + Sync {
    /// Turn a whole document into one audio stream
    ///
    /// This operation:
    /// - Optionally strips markup and links
    /// - Splits the text into word-preserving segments
    /// - Synthesizes segments concurrently with bounded retries
    /// - Concatenates the audio in segment order
    ///
    /// Returns the audio with the indices of succeeded and failed segments.
    /// Under `FailurePolicy::Abort` any failed segment fails the job instead.
    async fn narrate(&self, text: &str) -> Result<NarrationReport, NarrationError>;
}

#[async_trait]
impl NarrationServiceApi for NarrationService {
    async fn narrate(&self, text: &str) -> Result<NarrationReport, NarrationError> {
        let job_id = Uuid::new_v4();
        let start_time = Instant::now();

        tracing::info!(
            job_id = %job_id,
            text_length = text.chars().count(),
            max_segment_length = self.settings.max_segment_length,
            voice = %self.settings.voice,
            model = %self.settings.model,
            "Narration job started"
        );

        // 1. Clean the text (optional)
        let cleaned_text = if self.settings.clean_markup {
            let cleaned = clean_text(text);
            tracing::info!(
                original_length = text.chars().count(),
                cleaned_length = cleaned.chars().count(),
                "Text cleaned"
            );
            cleaned
        } else {
            text.to_string()
        };

        // 2. Split into segments
        let segments = segment(&cleaned_text, self.settings.max_segment_length)?;
        tracing::info!(
            job_id = %job_id,
            segment_count = segments.len(),
            "Text split into segments"
        );

        if segments.is_empty() {
            tracing::warn!(job_id = %job_id, "No words to narrate, producing empty audio");
        }

        // 3. Synthesize all segments
        let job_cancel = self.cancel.child_token();
        let job_timer = self.settings.job_timeout.map(|limit| {
            let token = job_cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = tokio::time::sleep(limit) => {
                        tracing::warn!(job_id = %job_id, timeout_secs = limit.as_secs_f64(), "Job timed out, cancelling segments");
                        token.cancel();
                    }
                }
            })
        });

        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let observer = tokio::spawn(observe_progress(job_id, progress_rx));

        let dispatched = self
            .dispatcher
            .dispatch(&segments, &job_cancel, Some(progress_tx))
            .await;

        if let Some(timer) = job_timer {
            timer.abort();
        }
        // Senders are gone once dispatch returns, so the observer drains and exits
        let _ = observer.await;

        let outcomes = dispatched?.into_ordered()?;

        if self.cancel.is_cancelled() {
            tracing::warn!(job_id = %job_id, "Narration job cancelled");
            return Err(NarrationError::Cancelled);
        }

        // 4. Assemble audio in segment order
        let assembled = assemble(&segments, outcomes);

        if !assembled.failed.is_empty() && self.settings.failure_policy == FailurePolicy::Abort {
            tracing::error!(
                job_id = %job_id,
                failed = assembled.failed.len(),
                segment_count = segments.len(),
                "Narration job aborted on failed segments"
            );
            return Err(NarrationError::SegmentsFailed {
                failed: assembled.failed,
                total: segments.len(),
            });
        }

        let status = if assembled.failed.is_empty() {
            JobStatus::Complete
        } else {
            JobStatus::Partial
        };
        let elapsed = start_time.elapsed();

        tracing::info!(
            job_id = %job_id,
            status = ?status,
            latency_ms = elapsed.as_millis() as u64,
            segment_count = segments.len(),
            succeeded = assembled.succeeded.len(),
            failed_indices = ?assembled.failed.iter().map(|f| f.index).collect::<Vec<_>>(),
            audio_size_bytes = assembled.audio.len(),
            "Narration job finished"
        );

        Ok(NarrationReport {
            job_id,
            status,
            audio_size_bytes: assembled.audio.len(),
            audio: assembled.audio,
            segment_count: segments.len(),
            succeeded: assembled.succeeded,
            failed: assembled.failed,
            elapsed_ms: elapsed.as_millis() as u64,
            finished_at: Utc::now(),
        })
    }
}

/// Single consumer of progress events, so no task shares a counter with the logger
async fn observe_progress(job_id: Uuid, mut progress_rx: mpsc::UnboundedReceiver<SegmentProgress>) {
    while let Some(progress) = progress_rx.recv().await {
        tracing::info!(
            job_id = %job_id,
            segment_index = progress.index,
            settled = progress.settled,
            total = progress.total,
            succeeded = progress.succeeded,
            "Segment settled ({}/{})",
            progress.settled,
            progress.total
        );
    }
}
