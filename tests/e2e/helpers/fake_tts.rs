use async_trait::async_trait;
use longread_tts::domain::narration::SynthesisError;
use longread_tts::infrastructure::repositories::TtsRepository;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::Duration;

/// How long each provider call takes
#[derive(Debug, Clone, Copy)]
pub enum CallDelay {
    None,
    /// Pseudo-random per text in `0..max_ms`, reproducible for a given seed
    Scrambled { seed: u64, max_ms: u64 },
}

/// Scripted TTS provider returning `[text]` as audio bytes
pub struct ScriptedTtsRepository {
    always_failing: HashSet<String>,
    failing_first: HashMap<String, u32>,
    delay: CallDelay,
    calls: Mutex<HashMap<String, u32>>,
}

impl ScriptedTtsRepository {
    pub fn new() -> Self {
        Self {
            always_failing: HashSet::new(),
            failing_first: HashMap::new(),
            delay: CallDelay::None,
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn always_failing(mut self, text: &str) -> Self {
        self.always_failing.insert(text.to_string());
        self
    }

    /// Fail the first `times` calls for `text`, then succeed
    pub fn flaky(mut self, text: &str, times: u32) -> Self {
        self.failing_first.insert(text.to_string(), times);
        self
    }

    pub fn with_delay(mut self, delay: CallDelay) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls_for(&self, text: &str) -> u32 {
        self.calls.lock().unwrap().get(text).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> u32 {
        self.calls.lock().unwrap().values().sum()
    }

    fn delay_for(&self, text: &str) -> Duration {
        match self.delay {
            CallDelay::None => Duration::ZERO,
            CallDelay::Scrambled { seed, max_ms } => {
                let mut hasher = DefaultHasher::new();
                seed.hash(&mut hasher);
                text.hash(&mut hasher);
                Duration::from_millis(hasher.finish() % max_ms.max(1))
            }
        }
    }
}

#[async_trait]
impl TtsRepository for ScriptedTtsRepository {
    async fn synthesize(
        &self,
        text: &str,
        _voice: &str,
        _model: &str,
    ) -> Result<Vec<u8>, SynthesisError> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(text.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        let delay = self.delay_for(text);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.always_failing.contains(text) {
            return Err(SynthesisError::Provider(format!("503 Service Unavailable for {}", text)));
        }
        if let Some(&times) = self.failing_first.get(text) {
            if call_number <= times {
                return Err(SynthesisError::Provider("connection reset".to_string()));
            }
        }

        Ok(format!("[{}]", text).into_bytes())
    }
}
