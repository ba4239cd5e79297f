//! Partial results of batched property access.

use ap_core::{ApError, PropertyKey, PropertyMap};
use thiserror::Error;
use tracing::{error, warn};

/// Why one key of a batch was skipped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Diagnostic {
    #[error("Property {key} not found. May not be implemented, or doesn't exist")]
    UnknownKey { key: PropertyKey },

    #[error("Property {key} could not be accessed at {path}: {message}. Check manually")]
    HostAccess {
        key: PropertyKey,
        path: String,
        message: String,
    },
}

impl Diagnostic {
    pub fn key(&self) -> &PropertyKey {
        match self {
            Diagnostic::UnknownKey { key } | Diagnostic::HostAccess { key, .. } => key,
        }
    }

    /// Unknown keys are warnings; host failures are errors.
    pub(crate) fn emit(&self, entity: &str) {
        match self {
            Diagnostic::UnknownKey { .. } => warn!(entity, "{}", self),
            Diagnostic::HostAccess { .. } => error!(entity, "{}", self),
        }
    }
}

impl From<Diagnostic> for ApError {
    fn from(diag: Diagnostic) -> Self {
        match diag {
            Diagnostic::UnknownKey { key } => ApError::UnknownKey {
                key: key.to_string(),
            },
            Diagnostic::HostAccess { path, message, .. } => ApError::HostAccess { path, message },
        }
    }
}

/// Values for the keys that succeeded, diagnostics for the ones that did not.
///
/// For reads `values` holds what was fetched; for writes it holds what was
/// assigned. Every requested key lands in exactly one of the two.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub values: PropertyMap,
    pub diagnostics: Vec<Diagnostic>,
}
