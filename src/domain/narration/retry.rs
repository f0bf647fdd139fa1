use super::error::NarrationError;
use rand::Rng;
use std::time::Duration;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Bounded retry policy applied to every segment.
///
/// With the default zero `initial_delay` a failed attempt is retried
/// immediately. A non-zero delay turns on exponential backoff:
/// `initial_delay * backoff_multiplier^(attempt - 1)`, capped at `max_delay`,
/// with up to 25% jitter either way when `jitter` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: Duration::ZERO,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }
}

impl RetryPolicy {
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), NarrationError> {
        if self.max_attempts == 0 {
            return Err(NarrationError::InvalidConfiguration(
                "retry budget must allow at least one attempt".to_string(),
            ));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(NarrationError::InvalidConfiguration(format!(
                "backoff multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            )));
        }
        Ok(())
    }

    /// Delay before the next attempt, given how many attempts have failed so far.
    pub fn delay_for(&self, failed_attempts: u32) -> Duration {
        if self.initial_delay.is_zero() {
            return Duration::ZERO;
        }

        let base_ms = self.initial_delay.as_millis() as f64;
        let exponent = failed_attempts.saturating_sub(1).min(i32::MAX as u32) as i32;
        let delay_ms = (base_ms * self.backoff_multiplier.powi(exponent))
            .min(self.max_delay.as_millis() as f64);

        let delay_ms = if self.jitter {
            (delay_ms + rand_jitter(delay_ms * 0.25)).max(0.0)
        } else {
            delay_ms
        };

        Duration::from_millis(delay_ms as u64)
    }
}

/// Uniform random offset in `-range..=range`
fn rand_jitter(range: f64) -> f64 {
    if range <= 0.0 {
        return 0.0;
    }
    rand::thread_rng().gen_range(-range..=range)
}
