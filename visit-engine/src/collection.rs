//! Service line items and the per-visit collection
//!
//! Line items are immutable values: every operation returns a new item with
//! `final_price` recomputed by the discount engine. The collection is owned
//! exclusively by one visit and is only ever replaced wholesale from an
//! authoritative collaborator response, never patched incrementally.

use crate::error::EngineError;
use crate::pricing;
use rust_decimal::prelude::*;
use serde::Serialize;
use shared::money::{Money, money_eq, to_decimal, to_f64};
use shared::visit::{ApprovalStatus, CatalogEntry, DiscountMode, ServiceLineInput, ServiceLineItem};
use uuid::Uuid;

// ==================== Line construction ====================

/// Seed an add-services input from a catalog entry's current price
pub fn input_from_catalog(entry: &CatalogEntry) -> ServiceLineInput {
    ServiceLineInput {
        id: entry.id.clone(),
        name: entry.name.clone(),
        base_price: entry.current_price,
        quantity: 1,
        discount_mode: None,
        discount_value: None,
        note: None,
    }
}

/// Build a line item from an add-services input.
///
/// Mints a fresh client-local row id and computes `final_price` through the
/// discount engine. New lines start out `Pending` approval.
pub fn line_from_input(input: &ServiceLineInput) -> ServiceLineItem {
    let mode = input.discount_mode.unwrap_or_default();
    let value = input.discount_value.unwrap_or(0.0);
    ServiceLineItem {
        id: input.id.clone(),
        local_row_id: Uuid::new_v4(),
        name: input.name.clone(),
        quantity: input.quantity,
        base_price: input.base_price,
        discount_mode: mode,
        discount_value: value,
        final_price: pricing::compute_final(&input.base_price, mode, value),
        note: input.note.clone(),
        approval_status: ApprovalStatus::Pending,
    }
}

// ==================== Line operations ====================

/// Return a new line with the discount changed and `final_price` recomputed
pub fn apply_discount(line: &ServiceLineItem, mode: DiscountMode, value: f64) -> ServiceLineItem {
    ServiceLineItem {
        discount_mode: mode,
        discount_value: value,
        final_price: pricing::compute_final(&line.base_price, mode, value),
        ..line.clone()
    }
}

/// Return a new line with a replaced base price and `final_price` recomputed.
///
/// Only legal while a price edit is in progress; a non-positive price is
/// rejected with a validation error and no state changes.
pub fn with_base_price(
    line: &ServiceLineItem,
    new_base: Money,
) -> Result<ServiceLineItem, EngineError> {
    if new_base.gross <= 0.0 || !new_base.gross.is_finite() {
        return Err(EngineError::validation(format!(
            "base price must be positive, got {}",
            new_base.gross
        )));
    }
    Ok(ServiceLineItem {
        base_price: new_base,
        final_price: pricing::compute_final(&new_base, line.discount_mode, line.discount_value),
        ..line.clone()
    })
}

/// Whether a line diverged from its edit-session snapshot.
///
/// Compares base price, discount mode and discount value; note changes do
/// not count as price modifications.
pub fn is_modified_since(current: &ServiceLineItem, snapshot: &ServiceLineItem) -> bool {
    !money_eq(current.base_price.gross, snapshot.base_price.gross)
        || current.discount_mode != snapshot.discount_mode
        || !money_eq(current.discount_value, snapshot.discount_value)
}

// ==================== Collection ====================

/// Aggregate totals across a collection, each a net/gross/tax triple
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Totals {
    /// Sum of base prices (per line: base * quantity)
    pub base_total: Money,
    /// base_total - final_total, component-wise, floored at zero
    pub discount_total: Money,
    /// Sum of final prices (per line: final * quantity)
    pub final_total: Money,
}

/// The ordered set of line items belonging to one visit, keyed by server id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItemCollection {
    items: Vec<ServiceLineItem>,
}

impl LineItemCollection {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn from_items(items: Vec<ServiceLineItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceLineItem> {
        self.items.iter()
    }

    pub fn items(&self) -> &[ServiceLineItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&ServiceLineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Replace the whole collection with the authoritative server-returned
    /// set.
    ///
    /// The server may recompute approval status, identity or pricing the
    /// client does not own, so nothing is merged. Client-local row ids are
    /// preserved for lines whose server id survives the replacement.
    pub fn replace_all(&mut self, new_items: Vec<ServiceLineItem>) {
        let mut replaced = new_items;
        for item in replaced.iter_mut() {
            if let Some(existing) = self.get(&item.id) {
                item.local_row_id = existing.local_row_id;
            }
        }
        self.items = replaced;
    }

    /// Apply an approval confirmed through the external channel.
    ///
    /// Pending -> Approved; an approval is never reversed. Returns false
    /// for an unknown id.
    pub fn apply_approval(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.approval_status = ApprovalStatus::Approved;
                true
            }
            None => false,
        }
    }

    /// Sum base, discount and final components across all lines.
    ///
    /// Each line contributes price * quantity; sums are computed in Decimal
    /// and rounded once at the end.
    pub fn totals(&self) -> Totals {
        let mut base_net = Decimal::ZERO;
        let mut base_gross = Decimal::ZERO;
        let mut base_tax = Decimal::ZERO;
        let mut final_net = Decimal::ZERO;
        let mut final_gross = Decimal::ZERO;
        let mut final_tax = Decimal::ZERO;

        for item in &self.items {
            let quantity = Decimal::from(item.quantity);
            base_net += to_decimal(item.base_price.net) * quantity;
            base_gross += to_decimal(item.base_price.gross) * quantity;
            base_tax += to_decimal(item.base_price.tax) * quantity;
            final_net += to_decimal(item.final_price.net) * quantity;
            final_gross += to_decimal(item.final_price.gross) * quantity;
            final_tax += to_decimal(item.final_price.tax) * quantity;
        }

        let base_total = Money {
            net: to_f64(base_net),
            gross: to_f64(base_gross),
            tax: to_f64(base_tax),
        };
        let final_total = Money {
            net: to_f64(final_net),
            gross: to_f64(final_gross),
            tax: to_f64(final_tax),
        };
        Totals {
            base_total,
            discount_total: base_total.sub_clamped(&final_total),
            final_total,
        }
    }
}
