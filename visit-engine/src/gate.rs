//! Visit lifecycle gate
//!
//! The engine never drives status transitions; it only queries them to
//! decide which mutations are currently legal. Every check matches the
//! status exhaustively so a new variant cannot slip past the gate.

use crate::error::EngineError;
use shared::visit::VisitStatus;

/// Price edits are only meaningful once service scope is final and before
/// handoff.
pub fn can_edit_prices(status: VisitStatus) -> bool {
    match status {
        VisitStatus::ReadyForPickup => true,
        VisitStatus::Scheduled
        | VisitStatus::InProgress
        | VisitStatus::Completed
        | VisitStatus::Cancelled => false,
    }
}

/// Services may be added or removed any time before the visit is closed out.
pub fn can_modify_services(status: VisitStatus) -> bool {
    match status {
        VisitStatus::Completed | VisitStatus::Cancelled => false,
        VisitStatus::Scheduled | VisitStatus::InProgress | VisitStatus::ReadyForPickup => true,
    }
}

/// Fail-fast check used before any collaborator mutation is attempted.
pub fn ensure_can_edit_prices(status: VisitStatus) -> Result<(), EngineError> {
    if can_edit_prices(status) {
        Ok(())
    } else {
        Err(EngineError::NotPermitted {
            status,
            operation: "edit_prices",
        })
    }
}

/// Fail-fast check used before any collaborator mutation is attempted.
pub fn ensure_can_modify_services(status: VisitStatus) -> Result<(), EngineError> {
    if can_modify_services(status) {
        Ok(())
    } else {
        Err(EngineError::NotPermitted {
            status,
            operation: "modify_services",
        })
    }
}
