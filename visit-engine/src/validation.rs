//! Input validation helpers
//!
//! Centralized text length constants and validation functions. Limits are
//! chosen as reasonable UX limits for names and notes; the persistence
//! collaborator enforces nothing the engine can rely on.

use crate::error::EngineError;

// ── Text length limits ──────────────────────────────────────────────

/// Service names
pub const MAX_NAME_LEN: usize = 200;

/// Notes and removal reasons
pub const MAX_NOTE_LEN: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(
    value: &str,
    field: &str,
    max_len: usize,
) -> Result<(), EngineError> {
    if value.trim().is_empty() {
        return Err(EngineError::validation(format!(
            "{field} must not be empty"
        )));
    }
    if value.len() > max_len {
        return Err(EngineError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), EngineError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(EngineError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}
