//! Shared types for the visit engine
//!
//! Common types used across crates: monetary values, visit and line-item
//! models, and the mutation error types exchanged with collaborators.

pub mod error;
pub mod money;
pub mod visit;

// Re-exports
pub use error::{MutationError, MutationErrorCode, PersistenceError};
pub use money::{MONEY_TOLERANCE, Money};
pub use serde::{Deserialize, Serialize};
