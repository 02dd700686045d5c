//! Visit lifecycle status
//!
//! Status transitions are driven externally; the engine only reads them.
//! Kept as a closed enum with exhaustive matching so a new status cannot
//! silently bypass the mutation gate.

use serde::{Deserialize, Serialize};

/// Overall lifecycle status of a visit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitStatus {
    #[default]
    Scheduled,
    InProgress,
    ReadyForPickup,
    Completed,
    Cancelled,
}

impl VisitStatus {
    /// Terminal states: no further mutations of any kind
    pub fn is_terminal(&self) -> bool {
        matches!(self, VisitStatus::Completed | VisitStatus::Cancelled)
    }

    /// Whether the visit is still open for work
    pub fn is_open(&self) -> bool {
        !self.is_terminal()
    }
}

impl std::fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VisitStatus::Scheduled => "SCHEDULED",
            VisitStatus::InProgress => "IN_PROGRESS",
            VisitStatus::ReadyForPickup => "READY_FOR_PICKUP",
            VisitStatus::Completed => "COMPLETED",
            VisitStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}
