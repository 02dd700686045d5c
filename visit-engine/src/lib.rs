//! Visit pricing and mutation-gating engine
//!
//! This crate implements the line-item core of the back-office visit screen:
//!
//! - **pricing**: pure discount engine and input validation
//! - **collection**: the ordered line-item set owned by one visit
//! - **gate**: lifecycle authorization over the visit status
//! - **traits**: collaborator seams (catalog, persistence, status source)
//! - **coordinator**: atomic add/remove/edit mutation intents
//!
//! # Mutation Flow
//!
//! ```text
//! mutate(intent)
//!     ├─ 1. Claim the in-flight slot (Busy check)
//!     ├─ 2. Read visit status and check the lifecycle gate
//!     ├─ 3. Validate inputs locally
//!     ├─ 4. Submit to the persistence collaborator
//!     ├─ 5. Replace the collection from the authoritative response
//!     └─ 6. Release the slot and return the outcome
//! ```
//!
//! Failures never leave partial local state: the collection is only touched
//! after a successful collaborator response, and always wholesale.

pub mod collection;
pub mod coordinator;
pub mod error;
pub mod gate;
pub mod pricing;
pub mod traits;
pub mod validation;

// Re-exports
pub use collection::{LineItemCollection, Totals};
pub use coordinator::{MutationCoordinator, PriceEditSession};
pub use error::{EngineError, EngineResult};
pub use traits::{ServiceCatalog, VisitPersistence, VisitStatusSource};

// Re-export shared types for convenience
pub use shared::error::{MutationError, MutationErrorCode, PersistenceError};
pub use shared::money::Money;
pub use shared::visit::{
    ApprovalStatus, CatalogEntry, DiscountMode, LineItemEdit, ServiceLineInput, ServiceLineItem,
    VisitStatus,
};
