use super::segmenter::Segment;
use super::synthesizer::SynthesisOutcome;
use serde::Serialize;

/// A segment that is missing from the assembled audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedSegment {
    pub index: usize,
    pub text: String,
    pub error: String,
    pub attempts: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledAudio {
    pub audio: Vec<u8>,
    pub succeeded: Vec<usize>,
    pub failed: Vec<FailedSegment>,
}

/// Concatenate successful payloads in segment order.
///
/// Failed segments are left out of the audio and listed in `failed`.
/// `outcomes[i]` must belong to `segments[i]`.
pub fn assemble(segments: &[Segment], outcomes: Vec<SynthesisOutcome>) -> AssembledAudio {
    debug_assert_eq!(segments.len(), outcomes.len());
    let mut assembled = AssembledAudio::default();

    for (segment, outcome) in segments.iter().zip(outcomes) {
        match outcome {
            SynthesisOutcome::Success(audio) => {
                assembled.audio.extend(audio);
                assembled.succeeded.push(segment.index);
            }
            SynthesisOutcome::Failure { last_error, attempts } => {
                tracing::warn!(
                    segment_index = segment.index,
                    attempts = attempts,
                    error = %last_error,
                    text_preview = %segment.text.chars().take(80).collect::<String>(),
                    "Segment missing from assembled audio"
                );
                assembled.failed.push(FailedSegment {
                    index: segment.index,
                    text: segment.text.clone(),
                    error: last_error.to_string(),
                    attempts,
                });
            }
        }
    }

    tracing::info!(
        audio_size_bytes = assembled.audio.len(),
        succeeded = assembled.succeeded.len(),
        failed = assembled.failed.len(),
        "Audio assembled"
    );

    assembled
}
