use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("timed out after {timeout_secs}s waiting on step '{step}'")]
    Timeout { step: String, timeout_secs: u64 },

    #[error("unexpected portal state in step '{step}': {detail}")]
    UnexpectedState { step: String, detail: String },

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("driver failure in step '{step}': {message}")]
    Driver { step: String, message: String },
}

impl ScraperError {
    /// Wrap a browser-side failure with the step it happened in.
    pub fn driver(step: &str, message: impl Into<String>) -> Self {
        ScraperError::Driver {
            step: step.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;
