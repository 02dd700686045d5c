//! Mutation coordinator
//!
//! Orchestrates add-services, remove-service and edit-prices as atomic
//! intents against one visit. The coordinator is the source of truth for
//! "busy": mutations against the same visit are serialized, and a second
//! intent arriving while one is submitting is refused rather than queued.
//!
//! # Intent Flow
//!
//! ```text
//! intent
//!     ├─ 1. Claim the in-flight slot (refuse with Busy if taken)
//!     ├─ 2. Check the lifecycle gate against the observed status
//!     ├─ 3. Validate inputs locally
//!     ├─ 4. Await the persistence collaborator
//!     ├─ 5. On success, replace the collection wholesale
//!     └─ 6. Release the slot (success and failure alike)
//! ```
//!
//! The visit status is observed through `refresh_status`; mutations check
//! the cached observation synchronously so a gate denial never touches the
//! network.

use crate::collection::{self, LineItemCollection, Totals};
use crate::error::{EngineError, EngineResult};
use crate::gate;
use crate::pricing;
use crate::traits::{VisitPersistence, VisitStatusSource};
use crate::validation::{MAX_NOTE_LEN, validate_optional_text};
use parking_lot::Mutex;
use shared::money::Money;
use shared::visit::{DiscountMode, LineItemEdit, ServiceLineInput, ServiceLineItem, VisitStatus};
use std::sync::Arc;
use uuid::Uuid;

/// Kind of in-flight mutation, used for busy reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MutationKind {
    AddServices,
    RemoveService,
    EditPrices,
}

impl MutationKind {
    fn as_str(&self) -> &'static str {
        match self {
            MutationKind::AddServices => "add_services",
            MutationKind::RemoveService => "remove_service",
            MutationKind::EditPrices => "edit_prices",
        }
    }
}

/// The single in-flight operation slot for one visit
#[derive(Debug)]
struct InFlightOp {
    intent_id: Uuid,
    kind: MutationKind,
}

/// Releases the in-flight slot on drop, on success and failure alike
struct OpGuard<'a> {
    slot: &'a Mutex<Option<InFlightOp>>,
}

impl Drop for OpGuard<'_> {
    fn drop(&mut self) {
        *self.slot.lock() = None;
    }
}

/// Visit-local state exclusively owned by the coordinator
struct VisitState {
    status: VisitStatus,
    items: LineItemCollection,
    updated_at: i64,
}

/// Coordinates line-item mutations for one visit aggregate
pub struct MutationCoordinator {
    visit_id: String,
    state: Mutex<VisitState>,
    in_flight: Mutex<Option<InFlightOp>>,
    persistence: Arc<dyn VisitPersistence>,
    status_source: Arc<dyn VisitStatusSource>,
}

impl std::fmt::Debug for MutationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationCoordinator")
            .field("visit_id", &self.visit_id)
            .finish()
    }
}

impl MutationCoordinator {
    pub fn new(
        visit_id: impl Into<String>,
        initial_status: VisitStatus,
        initial_items: Vec<ServiceLineItem>,
        persistence: Arc<dyn VisitPersistence>,
        status_source: Arc<dyn VisitStatusSource>,
    ) -> Self {
        Self {
            visit_id: visit_id.into(),
            state: Mutex::new(VisitState {
                status: initial_status,
                items: LineItemCollection::from_items(initial_items),
                updated_at: chrono::Utc::now().timestamp_millis(),
            }),
            in_flight: Mutex::new(None),
            persistence,
            status_source,
        }
    }

    pub fn visit_id(&self) -> &str {
        &self.visit_id
    }

    /// The last observed visit status
    pub fn status(&self) -> VisitStatus {
        self.state.lock().status
    }

    /// Snapshot of the current line items
    pub fn items(&self) -> Vec<ServiceLineItem> {
        self.state.lock().items.items().to_vec()
    }

    /// Aggregate totals over the current line items
    pub fn totals(&self) -> Totals {
        self.state.lock().items.totals()
    }

    /// Timestamp (ms) of the last authoritative reconcile
    pub fn updated_at(&self) -> i64 {
        self.state.lock().updated_at
    }

    /// Poll the status source and cache the observation for gate checks
    pub async fn refresh_status(&self) -> EngineResult<VisitStatus> {
        let status = self.status_source.get_status(&self.visit_id).await?;
        let mut state = self.state.lock();
        if state.status != status {
            tracing::debug!(
                visit_id = %self.visit_id,
                old = %state.status,
                new = %status,
                "Visit status changed"
            );
            state.status = status;
        }
        Ok(status)
    }

    /// Apply a per-line approval confirmed through the external channel
    pub fn apply_approval(&self, service_id: &str) -> bool {
        self.state.lock().items.apply_approval(service_id)
    }

    /// Claim the in-flight slot or refuse with Busy.
    ///
    /// Happens before validation and before any collaborator call.
    fn try_begin(&self, kind: MutationKind) -> EngineResult<(Uuid, OpGuard<'_>)> {
        let mut slot = self.in_flight.lock();
        if let Some(op) = slot.as_ref() {
            tracing::warn!(
                visit_id = %self.visit_id,
                in_flight_intent = %op.intent_id,
                attempted = kind.as_str(),
                "Mutation refused: another intent is in flight"
            );
            return Err(EngineError::Busy {
                in_flight: op.kind.as_str(),
            });
        }
        let intent_id = Uuid::new_v4();
        *slot = Some(InFlightOp { intent_id, kind });
        drop(slot);
        Ok((
            intent_id,
            OpGuard {
                slot: &self.in_flight,
            },
        ))
    }

    /// Replace local state with the authoritative server-returned set
    fn reconcile(&self, authoritative: Vec<ServiceLineItem>) {
        let mut state = self.state.lock();
        state.items.replace_all(authoritative);
        state.updated_at = chrono::Utc::now().timestamp_millis();
    }

    // ==================== Add services ====================

    /// Add catalog-selected services to the visit as one atomic intent.
    ///
    /// On failure no local mutation occurs; on success the collection is
    /// replaced from the response.
    pub async fn add_services(&self, inputs: Vec<ServiceLineInput>) -> EngineResult<()> {
        let (intent_id, _guard) = self.try_begin(MutationKind::AddServices)?;
        tracing::debug!(
            visit_id = %self.visit_id,
            intent_id = %intent_id,
            count = inputs.len(),
            "Processing add-services intent"
        );

        gate::ensure_can_modify_services(self.status())?;

        if inputs.is_empty() {
            return Err(EngineError::validation(
                "at least one service must be selected",
            ));
        }
        for input in &inputs {
            pricing::validate_line_input(input)?;
        }

        let items = self
            .persistence
            .add_services(&self.visit_id, &inputs)
            .await
            .map_err(|e| {
                tracing::error!(visit_id = %self.visit_id, intent_id = %intent_id, error = %e, "Add-services submission failed");
                EngineError::from(e)
            })?;

        self.reconcile(items);
        tracing::info!(
            visit_id = %self.visit_id,
            intent_id = %intent_id,
            count = inputs.len(),
            "Services added"
        );
        Ok(())
    }

    // ==================== Remove service ====================

    /// Remove one service from the visit, with an optional reason note.
    ///
    /// There is no optimistic deletion: the line disappears only when the
    /// collaborator confirms and returns the authoritative set.
    pub async fn remove_service(
        &self,
        service_id: &str,
        reason: Option<String>,
    ) -> EngineResult<()> {
        let (intent_id, _guard) = self.try_begin(MutationKind::RemoveService)?;
        tracing::debug!(
            visit_id = %self.visit_id,
            intent_id = %intent_id,
            service_id = %service_id,
            "Processing remove-service intent"
        );

        gate::ensure_can_modify_services(self.status())?;
        validate_optional_text(&reason, "reason", MAX_NOTE_LEN)?;

        if !self.state.lock().items.contains(service_id) {
            return Err(EngineError::ItemNotFound(service_id.to_string()));
        }

        let items = self
            .persistence
            .remove_service(&self.visit_id, service_id, reason.as_deref())
            .await
            .map_err(|e| {
                tracing::error!(visit_id = %self.visit_id, intent_id = %intent_id, error = %e, "Remove-service submission failed");
                EngineError::from(e)
            })?;

        self.reconcile(items);
        tracing::info!(
            visit_id = %self.visit_id,
            intent_id = %intent_id,
            service_id = %service_id,
            "Service removed"
        );
        Ok(())
    }

    // ==================== Edit prices ====================

    /// Start a price-edit session over a snapshot of the collection.
    ///
    /// The session is local until submitted; abandoning it has no side
    /// effects.
    pub fn begin_price_edit(&self) -> EngineResult<PriceEditSession> {
        gate::ensure_can_edit_prices(self.status())?;
        let state = self.state.lock();
        tracing::debug!(visit_id = %self.visit_id, "Price-edit session started");
        Ok(PriceEditSession {
            visit_id: self.visit_id.clone(),
            original: state.items.items().to_vec(),
            edited: state.items.items().to_vec(),
        })
    }

    /// Submit the complete edited set atomically.
    ///
    /// On success the local collection becomes the edited set (the edit
    /// endpoint is authoritative-accepting). On failure the session is
    /// handed back untouched so the caller can retry or cancel explicitly.
    pub async fn submit_price_edit(
        &self,
        session: PriceEditSession,
    ) -> Result<(), (PriceEditSession, EngineError)> {
        let (intent_id, _guard) = match self.try_begin(MutationKind::EditPrices) {
            Ok(claimed) => claimed,
            Err(err) => return Err((session, err)),
        };
        tracing::debug!(
            visit_id = %self.visit_id,
            intent_id = %intent_id,
            modified = session.modified_ids().len(),
            "Processing edit-prices intent"
        );

        if session.visit_id != self.visit_id {
            return Err((
                session,
                EngineError::validation("price-edit session belongs to a different visit"),
            ));
        }
        if let Err(err) = gate::ensure_can_edit_prices(self.status()) {
            return Err((session, err));
        }
        // Partial application is unsupported: every line must validate
        for line in &session.edited {
            if let Err(err) = pricing::validate_line(line) {
                return Err((session, err));
            }
        }

        match self
            .persistence
            .update_prices(&self.visit_id, &session.edited)
            .await
        {
            Ok(()) => {
                self.reconcile(session.edited);
                tracing::info!(
                    visit_id = %self.visit_id,
                    intent_id = %intent_id,
                    "Prices updated"
                );
                Ok(())
            }
            Err(err) => {
                tracing::error!(
                    visit_id = %self.visit_id,
                    intent_id = %intent_id,
                    error = %err,
                    "Edit-prices submission failed, session retained"
                );
                Err((session, err.into()))
            }
        }
    }
}

// ==================== Price-edit session ====================

/// A locally-edited snapshot of the whole collection.
///
/// All mutators are synchronous and touch only the snapshot; the visit's
/// collection is unaffected until `submit_price_edit` succeeds.
#[derive(Debug)]
pub struct PriceEditSession {
    visit_id: String,
    original: Vec<ServiceLineItem>,
    edited: Vec<ServiceLineItem>,
}

impl PriceEditSession {
    /// The lines as currently edited
    pub fn items(&self) -> &[ServiceLineItem] {
        &self.edited
    }

    /// Apply a change set to one line.
    ///
    /// Switching a line into fixed-price mode without an explicit value
    /// seeds the value from the line's current base amount; otherwise the
    /// line would jump to a zero price.
    pub fn apply_edit(&mut self, service_id: &str, edit: LineItemEdit) -> EngineResult<()> {
        pricing::validate_line_edit(&edit)?;

        let idx = self
            .edited
            .iter()
            .position(|i| i.id == service_id)
            .ok_or_else(|| EngineError::ItemNotFound(service_id.to_string()))?;

        let mut line = self.edited[idx].clone();
        if let Some(base) = edit.base_price {
            line = collection::with_base_price(&line, base)?;
        }

        let mode = edit.discount_mode.unwrap_or(line.discount_mode);
        let value = match edit.discount_value {
            Some(v) => v,
            None if mode == DiscountMode::FixedPrice && line.discount_mode != DiscountMode::FixedPrice => {
                line.base_price.gross
            }
            None => line.discount_value,
        };
        line = collection::apply_discount(&line, mode, value);

        if let Some(note) = edit.note {
            line.note = Some(note);
        }

        self.edited[idx] = line;
        Ok(())
    }

    /// Replace one line's base price, recomputing its final price
    pub fn set_base_price(&mut self, service_id: &str, new_base: Money) -> EngineResult<()> {
        self.apply_edit(
            service_id,
            LineItemEdit {
                base_price: Some(new_base),
                ..Default::default()
            },
        )
    }

    /// Change one line's discount, recomputing its final price
    pub fn set_discount(
        &mut self,
        service_id: &str,
        mode: DiscountMode,
        value: f64,
    ) -> EngineResult<()> {
        self.apply_edit(
            service_id,
            LineItemEdit {
                discount_mode: Some(mode),
                discount_value: Some(value),
                ..Default::default()
            },
        )
    }

    /// Ids of lines that diverged from the snapshot taken at session start
    pub fn modified_ids(&self) -> Vec<String> {
        self.edited
            .iter()
            .filter(|current| {
                self.original
                    .iter()
                    .find(|o| o.id == current.id)
                    .is_some_and(|o| collection::is_modified_since(current, o))
            })
            .map(|i| i.id.clone())
            .collect()
    }

    /// Abandon the session, discarding local uncommitted changes
    pub fn cancel(self) {
        tracing::debug!(visit_id = %self.visit_id, "Price-edit session cancelled");
    }
}

#[cfg(test)]
mod tests;
