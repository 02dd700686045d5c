//! Mutation error types crossing the collaborator boundary
//!
//! The engine classifies every failure into a `MutationError` with a stable
//! code; the caller (UI orchestration) is responsible for presentation and
//! retry. Collaborators report their own failures as `PersistenceError`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classified mutation error reported to the caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MutationError {
    pub code: MutationErrorCode,
    pub message: String,
}

impl MutationError {
    pub fn new(code: MutationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for MutationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

/// Mutation error codes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationErrorCode {
    /// Local precondition violated; never reached the network
    ValidationFailed,
    /// Lifecycle gate denied the mutation for the current visit status
    NotPermitted,
    /// Another mutation against this visit is still in flight
    Busy,
    /// The targeted line item does not exist locally
    ItemNotFound,
    /// Collaborator call failed (network, non-success status, bad payload)
    TransportFailed,
    /// Collaborator rejected the mutation for domain reasons
    Conflict,
}

/// Failure reported by the persistence/catalog/status collaborators
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PersistenceError {
    /// Network failure, non-success status, or malformed response
    #[error("Transport error: {0}")]
    Transport(String),

    /// Domain-level rejection (e.g. item already removed by another actor)
    #[error("Conflict: {0}")]
    Conflict(String),
}
