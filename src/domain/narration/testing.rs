use super::error::SynthesisError;
use crate::infrastructure::repositories::TtsRepository;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory provider: the "audio" for `text` is the bytes of `[text]`.
#[derive(Default)]
pub struct FakeTtsRepository {
    failures: HashMap<String, u32>,
    rejected_voice: Option<String>,
    delay: Duration,
    calls: AtomicU32,
    per_text_calls: Mutex<HashMap<String, u32>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeTtsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first `times` calls for `text`
    pub fn failing_on(mut self, text: &str, times: u32) -> Self {
        self.failures.insert(text.to_string(), times);
        self
    }

    /// Report `voice` as unsupported from `validate_voice`
    pub fn rejecting_voice(mut self, voice: &str) -> Self {
        self.rejected_voice = Some(voice.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TtsRepository for FakeTtsRepository {
    async fn synthesize(
        &self,
        text: &str,
        _voice: &str,
        _model: &str,
    ) -> Result<Vec<u8>, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let seen = {
            let mut per_text = self.per_text_calls.lock().unwrap();
            let count = per_text.entry(text.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.failures.get(text) {
            Some(&times) if seen <= times => {
                Err(SynthesisError::Provider(format!("fake failure {} for {}", seen, text)))
            }
            _ => Ok(format!("[{}]", text).into_bytes()),
        }
    }

    fn validate_voice(&self, voice: &str, _model: &str) -> Result<(), String> {
        match &self.rejected_voice {
            Some(rejected) if rejected == voice => Err(format!("unsupported voice: {}", voice)),
            _ => Ok(()),
        }
    }
}
