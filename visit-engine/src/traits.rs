//! Collaborator seams
//!
//! The engine never speaks a wire protocol itself. Transport, persistence
//! and status tracking live behind these traits; any JSON-over-HTTP client
//! satisfying the contracts is conformant. Every mutation returns the full
//! authoritative line-item set so the engine can replace its local state
//! wholesale instead of merging.

use async_trait::async_trait;
use shared::error::PersistenceError;
use shared::visit::{CatalogEntry, ServiceLineInput, ServiceLineItem, VisitStatus};

/// Service catalog lookup, used to seed new line items
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn list_available_services(&self) -> Result<Vec<CatalogEntry>, PersistenceError>;
}

/// Persistence collaborator applying mutations and returning authoritative
/// state
#[async_trait]
pub trait VisitPersistence: Send + Sync {
    /// Add services to a visit; returns the complete resulting line-item set
    async fn add_services(
        &self,
        visit_id: &str,
        inputs: &[ServiceLineInput],
    ) -> Result<Vec<ServiceLineItem>, PersistenceError>;

    /// Remove one service; returns the complete resulting line-item set
    async fn remove_service(
        &self,
        visit_id: &str,
        service_id: &str,
        reason: Option<&str>,
    ) -> Result<Vec<ServiceLineItem>, PersistenceError>;

    /// Atomically replace the priced line-item set.
    ///
    /// The endpoint is authoritative-accepting: on success the submitted
    /// set becomes the truth, so no payload comes back.
    async fn update_prices(
        &self,
        visit_id: &str,
        items: &[ServiceLineItem],
    ) -> Result<(), PersistenceError>;
}

/// Read-only source for the externally-driven visit status
#[async_trait]
pub trait VisitStatusSource: Send + Sync {
    async fn get_status(&self, visit_id: &str) -> Result<VisitStatus, PersistenceError>;
}
