//! Error types for the ap-app service layer.

use ap_core::ApError;
use ap_project::ProjectError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Session error: {0}")]
    Session(#[from] ApError),

    #[error("Job error: {0}")]
    Job(#[from] ProjectError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ap_host::HostError> for AppError {
    fn from(err: ap_host::HostError) -> Self {
        AppError::Session(err.into())
    }
}

/// Result type for ap-app operations.
pub type AppResult<T> = Result<T, AppError>;
