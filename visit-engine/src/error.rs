//! Engine errors
//!
//! One crate-wide error enum, classified into the serializable
//! `MutationError` at the boundary. Transport and conflict failures from
//! collaborators map through without retry or merging.

use shared::error::{MutationError, MutationErrorCode, PersistenceError};
use shared::visit::VisitStatus;
use thiserror::Error;

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Operation '{operation}' not permitted while visit is {status}")]
    NotPermitted {
        status: VisitStatus,
        operation: &'static str,
    },

    #[error("Another mutation is in flight: {in_flight}")]
    Busy { in_flight: &'static str },

    #[error("Line item not found: {0}")]
    ItemNotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation(message.into())
    }
}

impl From<PersistenceError> for EngineError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Transport(msg) => EngineError::Transport(msg),
            PersistenceError::Conflict(msg) => EngineError::Conflict(msg),
        }
    }
}

impl From<EngineError> for MutationError {
    fn from(err: EngineError) -> Self {
        let code = match &err {
            EngineError::Validation(_) => MutationErrorCode::ValidationFailed,
            EngineError::NotPermitted { .. } => MutationErrorCode::NotPermitted,
            EngineError::Busy { .. } => MutationErrorCode::Busy,
            EngineError::ItemNotFound(_) => MutationErrorCode::ItemNotFound,
            EngineError::Transport(_) => MutationErrorCode::TransportFailed,
            EngineError::Conflict(_) => MutationErrorCode::Conflict,
        };
        MutationError::new(code, err.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
