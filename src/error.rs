use crate::domain::narration::NarrationError;

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Narration failed: {0}")]
    Narration(NarrationError),

    #[error("Report serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Io(_) | Self::Serialization(_) => 74,
            Self::Narration(NarrationError::Cancelled) => 130,
            Self::Narration(_) => 1,
        }
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
