//! Service line-item types
//!
//! A line item is one service billed within a visit. The pricing fields
//! follow the same convention everywhere: `base_price` is what the service
//! would cost undiscounted, `final_price` is the discount engine's output
//! for `(base_price, discount_mode, discount_value)` and is never edited
//! independently.

use crate::money::Money;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_quantity() -> i32 {
    1
}

/// Semantics used to derive a final price from a base price
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountMode {
    /// `final = base * (1 - value/100)`, value clamped to [0, 100]
    #[default]
    Percentage,
    /// `final = max(0, base - value)`
    Amount,
    /// `final = value`, ignoring the base
    FixedPrice,
}

/// Per-line approval lifecycle
///
/// Transitions Pending -> Approved only, confirmed through an external
/// channel. The engine never reverses an approval.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
}

/// One serviced item on a visit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceLineItem {
    /// Stable server identity
    pub id: String,
    /// Client-only identity for list rendering/ordering
    pub local_row_id: Uuid,
    /// Service name
    pub name: String,
    /// Quantity (>= 1)
    pub quantity: i32,
    /// Undiscounted price
    pub base_price: Money,
    /// Discount semantics for this line
    pub discount_mode: DiscountMode,
    /// Discount value interpreted per `discount_mode`
    pub discount_value: f64,
    /// Discount engine output for (base_price, discount_mode, discount_value)
    pub final_price: Money,
    /// Free-text note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Approval lifecycle state
    pub approval_status: ApprovalStatus,
}

impl ServiceLineItem {
    /// Whether a discount indicator should be shown for this line.
    ///
    /// A line with `discount_value == 0` carries no discount regardless
    /// of mode.
    pub fn has_discount(&self) -> bool {
        self.discount_value != 0.0
    }
}

/// Input for adding one service to a visit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceLineInput {
    /// Catalog/service identity
    pub id: String,
    /// Service name
    pub name: String,
    /// Base price seeded from the catalog's current price
    pub base_price: Money,
    /// Quantity, defaults to 1
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_mode: Option<DiscountMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Per-line change set for the price-edit workflow (None = no change)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LineItemEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_mode: Option<DiscountMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One entry from the service catalog lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub current_price: Money,
}
