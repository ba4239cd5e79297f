use core::fmt;
use thiserror::Error;

pub type ApResult<T> = Result<T, ApError>;

/// Kind of entity living under one of the variable tree roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Stream,
    Block,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Stream => write!(f, "stream"),
            EntityKind::Block => write!(f, "block"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApError {
    /// The automation server could not be reached, or the document could not be loaded.
    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("There is no {kind} with name {name} in the simulation")]
    LookupAbsent { kind: EntityKind, name: String },

    #[error("Unknown property key: {key}")]
    UnknownKey { key: String },

    /// Key text that is not of the form `MNEMONIC` or `MNEMONIC:COMPONENT`.
    #[error("Malformed property key '{text}': expected MNEMONIC or MNEMONIC:COMPONENT")]
    MalformedKey { text: String },

    /// The key resolved to a path but the host rejected the lookup or assignment.
    #[error("Host access failed at {path}: {message}")]
    HostAccess { path: String, message: String },

    #[error("Host error: {message}")]
    Host { message: String },

    #[error("Process table error: {message}")]
    Process { message: String },
}
