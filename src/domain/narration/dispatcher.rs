use super::error::NarrationError;
use super::segmenter::Segment;
use super::store::ResultStore;
use super::synthesizer::Synthesizer;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// What to do with the job once a segment exhausts its retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Leave the segment out of the audio and report it
    #[default]
    Skip,
    /// Cancel the remaining segments and fail the job
    Abort,
}

/// Emitted once per segment as it settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentProgress {
    pub index: usize,
    pub settled: usize,
    pub total: usize,
    pub succeeded: bool,
}

/// Runs one synthesis task per segment through a bounded worker pool.
pub struct Dispatcher {
    synthesizer: Arc<Synthesizer>,
    max_concurrency: usize,
    failure_policy: FailurePolicy,
}

impl Dispatcher {
    pub fn new(
        synthesizer: Arc<Synthesizer>,
        max_concurrency: usize,
        failure_policy: FailurePolicy,
    ) -> Result<Self, NarrationError> {
        if max_concurrency == 0 {
            return Err(NarrationError::InvalidConfiguration(
                "max concurrency must be positive".to_string(),
            ));
        }

        Ok(Self {
            synthesizer,
            max_concurrency,
            failure_policy,
        })
    }

    /// Synthesize every segment and return once all of them have settled.
    ///
    /// At most `max_concurrency` segments are in flight; a new task is only
    /// spawned once a permit frees up. Each task writes its own slot.
    pub async fn dispatch(
        &self,
        segments: &[Segment],
        cancel: &CancellationToken,
        progress: Option<mpsc::UnboundedSender<SegmentProgress>>,
    ) -> Result<ResultStore, NarrationError> {
        let total = segments.len();
        let store = Arc::new(ResultStore::with_capacity(total));
        let settled = Arc::new(AtomicUsize::new(0));
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        // Aborting cancels only this dispatch, never the caller's token
        let job_cancel = cancel.child_token();
        let mut tasks = JoinSet::new();

        tracing::info!(
            segment_count = total,
            max_concurrency = self.max_concurrency,
            failure_policy = ?self.failure_policy,
            "Dispatching segments"
        );

        for segment in segments.iter().cloned() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| NarrationError::Internal(format!("worker pool closed: {}", e)))?;

            let synthesizer = Arc::clone(&self.synthesizer);
            let store = Arc::clone(&store);
            let settled = Arc::clone(&settled);
            let progress = progress.clone();
            let job_cancel = job_cancel.clone();
            let abort_on_failure = self.failure_policy == FailurePolicy::Abort;

            tasks.spawn(async move {
                let _permit = permit;

                let outcome = synthesizer.synthesize(&segment, &job_cancel).await;
                let succeeded = outcome.is_success();
                if !succeeded && abort_on_failure && !job_cancel.is_cancelled() {
                    tracing::warn!(
                        segment_index = segment.index,
                        "Segment failed, cancelling remaining segments"
                    );
                    job_cancel.cancel();
                }

                store.set(segment.index, outcome)?;

                let settled = settled.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(progress) = progress {
                    // The observer may already be gone; progress is best-effort
                    let _ = progress.send(SegmentProgress {
                        index: segment.index,
                        settled,
                        total,
                        succeeded,
                    });
                }

                Ok::<(), NarrationError>(())
            });
        }
        drop(progress);

        while let Some(joined) = tasks.join_next().await {
            joined.map_err(|e| NarrationError::Internal(format!("synthesis task failed: {}", e)))??;
        }

        tracing::debug!(settled = settled.load(Ordering::SeqCst), total = total, "All segments settled");

        Arc::try_unwrap(store)
            .map_err(|_| NarrationError::Internal("result store still shared after join".to_string()))
    }
}
