//! Visit (service protocol) domain types
//!
//! A visit aggregates the services performed on a single vehicle. These
//! types cross the collaborator boundary and are shared between the engine
//! and whatever transport carries them.

mod status;
mod types;

pub use status::VisitStatus;
pub use types::{
    ApprovalStatus, CatalogEntry, DiscountMode, LineItemEdit, ServiceLineInput, ServiceLineItem,
};
