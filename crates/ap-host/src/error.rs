//! Host access errors.

use ap_core::ApError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    /// The automation server could not be created or reached.
    #[error("Automation server unavailable: {message}")]
    Unavailable { message: String },

    /// The host refused to open the document. `message` is the host's own diagnostic.
    #[error("Failed to load {path}: {message}")]
    Load { path: PathBuf, message: String },

    #[error("Node not found: {path}")]
    NodeMissing { path: String },

    /// The node exists but has no scalar value (it is a folder of other nodes).
    #[error("Node {name} does not hold a scalar value")]
    NotScalar { name: String },

    /// Any other failure reported by the host while calling `member`.
    #[error("{member} failed: {message}")]
    Call { member: &'static str, message: String },

    #[error("Process utility failed: {message}")]
    Process { message: String },
}

impl From<HostError> for ApError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::Unavailable { .. } | HostError::Load { .. } => ApError::Connection {
                message: err.to_string(),
            },
            HostError::NodeMissing { ref path } => ApError::HostAccess {
                path: path.clone(),
                message: err.to_string(),
            },
            HostError::NotScalar { ref name } => ApError::HostAccess {
                path: name.clone(),
                message: err.to_string(),
            },
            HostError::Call { .. } => ApError::Host {
                message: err.to_string(),
            },
            HostError::Process { message } => ApError::Process { message },
        }
    }
}
