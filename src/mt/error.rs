/// Error types for the Machine Translation module
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MtError {
    /// Language code that cannot be sent to the service
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),
    /// Provider could not be configured
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Transport-level failure (connection refused, timeout, ...)
    #[error("Network error: {0}")]
    NetworkError(String),
    /// The endpoint answered with a non-success status
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    /// Every attempt failed
    #[error("Translation failed after {attempts} attempt(s): {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
    /// Error during translation phase
    #[error("Translation error: {0}")]
    TranslationError(String),
}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        MtError::NetworkError(err.to_string())
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;
