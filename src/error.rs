use thiserror::Error;

#[derive(Error, Debug)]
pub enum BabelsyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Input validation error: {0}")]
    InputValidation(String),

    #[error("{service} service error: {message}")]
    RemoteService { service: String, message: String },

    #[error("Sync job {job_id} failed: {reason}")]
    JobFailed { job_id: String, reason: String },

    #[error("Sync job {job_id} did not complete within {attempts} status checks")]
    JobTimeout { job_id: String, attempts: u32 },

    #[error("Run cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BabelsyncError {
    /// Shorthand for a remote API failure with the service name attached.
    pub fn remote(service: &str, message: impl Into<String>) -> Self {
        Self::RemoteService {
            service: service.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BabelsyncError>;
