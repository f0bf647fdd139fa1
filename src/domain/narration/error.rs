use super::assembler::FailedSegment;
use crate::error::AppError;
use std::time::Duration;

/// A single failed attempt against the TTS provider. Always recoverable by retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    #[error("provider error: {0}")]
    Provider(String),
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),
    #[error("synthesis cancelled")]
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum NarrationError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("result slot {0} written twice")]
    DuplicateWrite(usize),
    #[error("result slot {index} out of range for {capacity} segments")]
    SlotOutOfRange { index: usize, capacity: usize },
    #[error("result slot {0} was never settled")]
    UnsettledSlot(usize),
    #[error("{} of {total} segments failed", .failed.len())]
    SegmentsFailed {
        failed: Vec<FailedSegment>,
        total: usize,
    },
    #[error("narration job cancelled")]
    Cancelled,
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<NarrationError> for AppError {
    fn from(err: NarrationError) -> Self {
        match err {
            NarrationError::InvalidConfiguration(msg) => AppError::Config(msg),
            other => AppError::Narration(other),
        }
    }
}
