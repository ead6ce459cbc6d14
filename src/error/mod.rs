use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation failed: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Chat-completion API errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API key is empty in loaded model config.")]
    MissingCredential,

    #[error("{provider} request failed with HTTP {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("{provider} request timed out after {timeout_ms}ms")]
    Timeout { provider: String, timeout_ms: u64 },

    #[error("{provider} request failed: {message}")]
    Transport { provider: String, message: String },

    #[error("{provider} response is not in expected format: {body}")]
    InvalidResponse { provider: String, body: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Raised when no JSON object can be recovered from model output
#[derive(Debug, Error)]
#[error("Could not parse JSON object from model output: {text}")]
pub struct ParseError {
    /// The original model output, kept for diagnosis
    pub text: String,
}

impl AppError {
    /// Shorthand for a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        AppError::Config {
            message: message.into(),
        }
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for chat-completion calls
pub type ApiResult<T> = Result<T, ApiError>;
