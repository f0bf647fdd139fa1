use longread_tts::domain::narration::{NarrationService, NarrationSettings};
use std::sync::Arc;

pub mod assertions;
pub mod fake_tts;

pub use fake_tts::ScriptedTtsRepository;

/// Build a service over the scripted provider
pub fn narration_service(
    repo: Arc<ScriptedTtsRepository>,
    settings: NarrationSettings,
) -> NarrationService {
    NarrationService::new(repo, settings).expect("Failed to create narration service")
}

/// `count` words drawn from a fixed vocabulary of mixed lengths
pub fn words(count: usize) -> String {
    const VOCABULARY: &[&str] = &[
        "the", "narrator", "paused", "before", "an", "unexpectedly", "long", "sentence", "of",
        "synthesis", "and", "silence",
    ];
    (0..count)
        .map(|i| VOCABULARY[(i * 5 + i / 3) % VOCABULARY.len()])
        .collect::<Vec<_>>()
        .join(" ")
}
