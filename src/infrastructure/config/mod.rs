use crate::domain::narration::{
    service::{DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_SEGMENT_LENGTH},
    FailurePolicy, NarrationSettings, RetryPolicy,
};
use crate::error::AppError;
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub tts_provider: TtsProvider,
    pub openai_api_key: Option<String>,
    pub aws_region: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub max_segment_length: usize,
    pub max_retries: u32,
    pub max_concurrency: usize,
    pub segment_timeout_secs: Option<u64>,
    pub job_timeout_secs: Option<u64>,
    // Retry backoff, zero initial delay retries immediately
    pub retry_initial_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub retry_backoff_multiplier: f64,
    pub retry_jitter: bool,
    pub failure_policy: FailurePolicy,
    pub clean_markup: bool,
    pub output_dir: PathBuf,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TtsProvider {
    OpenAi,
    Polly,
}

impl TtsProvider {
    fn default_voice(&self) -> &'static str {
        match self {
            TtsProvider::OpenAi => "nova",
            TtsProvider::Polly => "Joanna",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            TtsProvider::OpenAi => "tts-1",
            TtsProvider::Polly => "neural",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let tts_provider = match env::var("TTS_PROVIDER")
            .unwrap_or_else(|_| "openai".to_string())
            .to_lowercase()
            .as_str()
        {
            "openai" => TtsProvider::OpenAi,
            "polly" => TtsProvider::Polly,
            other => {
                return Err(AppError::Config(format!(
                    "TTS_PROVIDER must be 'openai' or 'polly', got '{}'",
                    other
                )))
            }
        };

        let openai_api_key = env::var("OPENAI_API_KEY").ok().filter(|key| !key.is_empty());
        if tts_provider == TtsProvider::OpenAi && openai_api_key.is_none() {
            return Err(AppError::Config(
                "OPENAI_API_KEY is required for the openai provider".to_string(),
            ));
        }

        let config = Config {
            tts_provider,
            openai_api_key,
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
            tts_model: env::var("TTS_MODEL")
                .unwrap_or_else(|_| tts_provider.default_model().to_string()),
            tts_voice: env::var("TTS_VOICE")
                .unwrap_or_else(|_| tts_provider.default_voice().to_string()),
            max_segment_length: parse_var("MAX_SEGMENT_LENGTH", DEFAULT_MAX_SEGMENT_LENGTH)?,
            max_retries: parse_var("MAX_RETRIES", 3)?,
            max_concurrency: parse_var("MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY)?,
            segment_timeout_secs: parse_optional_var("SEGMENT_TIMEOUT_SECS")?,
            job_timeout_secs: parse_optional_var("JOB_TIMEOUT_SECS")?,
            retry_initial_delay_ms: parse_var("RETRY_INITIAL_DELAY_MS", 0)?,
            retry_max_delay_ms: parse_var("RETRY_MAX_DELAY_MS", 30_000)?,
            retry_backoff_multiplier: parse_var("RETRY_BACKOFF_MULTIPLIER", 2.0)?,
            retry_jitter: parse_bool("RETRY_JITTER")?,
            failure_policy: parse_failure_policy()?,
            clean_markup: parse_bool("CLEAN_MARKUP")?,
            output_dir: PathBuf::from(env::var("OUTPUT_DIR").unwrap_or_else(|_| "mp3".to_string())),
            log_format: parse_log_format()?,
        };

        Ok(config)
    }

    pub fn narration_settings(&self) -> NarrationSettings {
        NarrationSettings {
            max_segment_length: self.max_segment_length,
            voice: self.tts_voice.clone(),
            model: self.tts_model.clone(),
            retry_policy: RetryPolicy {
                max_attempts: self.max_retries,
                initial_delay: Duration::from_millis(self.retry_initial_delay_ms),
                max_delay: Duration::from_millis(self.retry_max_delay_ms),
                backoff_multiplier: self.retry_backoff_multiplier,
                jitter: self.retry_jitter,
            },
            max_concurrency: self.max_concurrency,
            attempt_timeout: self.segment_timeout_secs.map(Duration::from_secs),
            job_timeout: self.job_timeout_secs.map(Duration::from_secs),
            failure_policy: self.failure_policy,
            clean_markup: self.clean_markup,
        }
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{} has invalid value '{}': {}", key, raw, e))),
        Err(_) => Ok(default),
    }
}

fn parse_optional_var<T>(key: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| AppError::Config(format!("{} has invalid value '{}': {}", key, raw, e))),
        _ => Ok(None),
    }
}

/// Unset means `false`; anything other than true/false/1/0/yes/no is an error
fn parse_bool(key: &str) -> Result<bool, AppError> {
    let raw = match env::var(key) {
        Ok(raw) => raw,
        Err(_) => return Ok(false),
    };
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(AppError::Config(format!(
            "{} must be a boolean (true/false/1/0/yes/no), got '{}'",
            key, raw
        ))),
    }
}

fn parse_failure_policy() -> Result<FailurePolicy, AppError> {
    match env::var("FAILURE_POLICY") {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "skip" => Ok(FailurePolicy::Skip),
            "abort" => Ok(FailurePolicy::Abort),
            _ => Err(AppError::Config(format!(
                "FAILURE_POLICY must be 'skip' or 'abort', got '{}'",
                raw
            ))),
        },
        Err(_) => Ok(FailurePolicy::default()),
    }
}

fn parse_log_format() -> Result<LogFormat, AppError> {
    match env::var("LOG_FORMAT") {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(AppError::Config(format!(
                "LOG_FORMAT must be 'pretty' or 'json', got '{}'",
                raw
            ))),
        },
        Err(_) => Ok(LogFormat::Pretty),
    }
}
