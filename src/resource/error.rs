//! Synchronizer error types

use crate::siem::error::ClientError;
use std::fmt;

/// The four synchronizer verbs, used to label errors and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Read => "Read",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// No registry entry for the requested kind
    #[error("unknown resource kind: {0}")]
    UnknownKind(String),

    /// The desired document could not be parsed. Never retried.
    #[error("[{operation}][{kind}] Parser Error: unable to parse document: {reason}")]
    Validation {
        kind: String,
        operation: Operation,
        reason: String,
    },

    /// The remote rejected the call, or the call never completed
    #[error("[{operation}][{kind}] Client Error: {source}")]
    Remote {
        kind: String,
        operation: Operation,
        #[source]
        source: ClientError,
    },

    /// The addressed resource does not exist remotely.
    /// Callers should stop tracking it rather than fail.
    #[error("[{operation}][{kind}] resource '{id}' not found")]
    NotFound {
        kind: String,
        operation: Operation,
        id: String,
    },

    /// A write succeeded but the response carried no identity
    #[error("[{operation}][{kind}] response has no '{field}' identity field")]
    MissingIdentity {
        kind: String,
        operation: Operation,
        field: String,
    },
}

impl SyncError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Underlying client error, for remote failures
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::Remote { source, .. } => Some(source),
            _ => None,
        }
    }
}
