pub mod assembler;
pub mod dispatcher;
pub mod error;
pub mod retry;
pub mod segmenter;
pub mod service;
pub mod store;
pub mod synthesizer;
pub mod text;

#[cfg(test)]
pub(crate) mod testing;

pub use assembler::{assemble, AssembledAudio, FailedSegment};
pub use dispatcher::{Dispatcher, FailurePolicy, SegmentProgress};
pub use error::{NarrationError, SynthesisError};
pub use retry::RetryPolicy;
pub use segmenter::{segment, Segment};
pub use service::{JobStatus, NarrationReport, NarrationService, NarrationServiceApi, NarrationSettings};
pub use store::ResultStore;
pub use synthesizer::{SynthesisOutcome, Synthesizer};
pub use text::clean_text;
