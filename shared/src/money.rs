//! Monetary values as net/gross/tax triples
//!
//! This module provides precise decimal arithmetic for monetary calculations.
//! All calculations are done using `Decimal` internally, then converted to
//! `f64` for storage/serialization.
//!
//! Prices are tax-inclusive: `gross` is the customer-facing amount, `net` is
//! the taxable base and `tax` the difference. Every constructor guarantees
//! `gross == net + tax` after rounding to 2 decimal places.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Rounding strategy for monetary values (2 decimal places, half-up)
pub const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Convert f64 to Decimal for calculation
///
/// Input values should be validated as finite at the boundary. If
/// NaN/Infinity somehow reaches here, logs an error and returns ZERO
/// to avoid silent data corruption in financial calculations.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// A monetary quantity as a net/gross/tax triple.
///
/// Produced only by the discount engine or supplied verbatim by the
/// persistence collaborator; never mutated in place. Every operation
/// returns a new `Money`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Money {
    /// Taxable base amount
    pub net: f64,
    /// Customer-facing amount (net + tax)
    pub gross: f64,
    /// Tax amount
    pub tax: f64,
}

impl Money {
    /// The zero amount
    pub const fn zero() -> Self {
        Self {
            net: 0.0,
            gross: 0.0,
            tax: 0.0,
        }
    }

    /// Build from a tax-inclusive gross amount and a tax rate in percent.
    ///
    /// Formula: `net = gross / (1 + rate/100)`, `tax = gross - net`.
    /// Negative inputs are clamped to zero.
    pub fn from_gross(gross: f64, tax_rate_percent: f64) -> Self {
        let gross_dec = to_decimal(gross).max(Decimal::ZERO);
        let rate = to_decimal(tax_rate_percent).max(Decimal::ZERO);
        Self::from_gross_dec(gross_dec, rate)
    }

    /// Lift a numeric-only price into a degenerate Money with `tax = 0`.
    ///
    /// Used for legacy shapes that carry a single amount instead of a
    /// net/gross/tax triple.
    pub fn from_net_only(amount: f64) -> Self {
        let amount = to_f64(to_decimal(amount).max(Decimal::ZERO));
        Self {
            net: amount,
            gross: amount,
            tax: 0.0,
        }
    }

    /// Accept a collaborator-supplied triple verbatim, after clamping
    /// negatives to zero and rounding to 2 decimal places.
    pub fn from_parts(net: f64, gross: f64, tax: f64) -> Self {
        Self {
            net: to_f64(to_decimal(net).max(Decimal::ZERO)),
            gross: to_f64(to_decimal(gross).max(Decimal::ZERO)),
            tax: to_f64(to_decimal(tax).max(Decimal::ZERO)),
        }
    }

    /// Build from a Decimal gross and a Decimal tax rate (percent).
    pub(crate) fn from_gross_dec(gross: Decimal, tax_rate_percent: Decimal) -> Self {
        let gross = gross
            .max(Decimal::ZERO)
            .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
        let net = if tax_rate_percent > Decimal::ZERO {
            (gross / (Decimal::ONE + tax_rate_percent / Decimal::ONE_HUNDRED))
                .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        } else {
            gross
        };
        // Tax is derived as the difference so gross == net + tax holds exactly
        let tax = gross - net;
        Self {
            net: to_f64(net),
            gross: to_f64(gross),
            tax: to_f64(tax),
        }
    }

    /// The tax rate implied by this triple, in percent.
    ///
    /// Returns ZERO for a zero or tax-free amount.
    pub fn implied_tax_rate(&self) -> Decimal {
        let net = to_decimal(self.net);
        if net > Decimal::ZERO {
            to_decimal(self.tax) / net * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        }
    }

    /// Re-derive the triple for a new gross amount, preserving this
    /// amount's implied tax rate.
    pub fn with_gross(&self, new_gross: Decimal) -> Self {
        Self::from_gross_dec(new_gross, self.implied_tax_rate())
    }

    /// Component-wise sum
    pub fn add(&self, other: &Money) -> Self {
        Self {
            net: to_f64(to_decimal(self.net) + to_decimal(other.net)),
            gross: to_f64(to_decimal(self.gross) + to_decimal(other.gross)),
            tax: to_f64(to_decimal(self.tax) + to_decimal(other.tax)),
        }
    }

    /// Component-wise difference, floored at zero
    pub fn sub_clamped(&self, other: &Money) -> Self {
        Self {
            net: to_f64((to_decimal(self.net) - to_decimal(other.net)).max(Decimal::ZERO)),
            gross: to_f64((to_decimal(self.gross) - to_decimal(other.gross)).max(Decimal::ZERO)),
            tax: to_f64((to_decimal(self.tax) - to_decimal(other.tax)).max(Decimal::ZERO)),
        }
    }

    /// Whether `gross == net + tax` within tolerance
    pub fn is_consistent(&self) -> bool {
        let diff = (to_decimal(self.gross) - to_decimal(self.net) - to_decimal(self.tax)).abs();
        diff <= MONEY_TOLERANCE
    }

    /// Compare two amounts for equality (gross side, within 0.01 tolerance)
    pub fn approx_eq(&self, other: &Money) -> bool {
        money_eq(self.gross, other.gross)
    }

    /// Whether this is the zero amount
    pub fn is_zero(&self) -> bool {
        money_eq(self.gross, 0.0)
    }
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < MONEY_TOLERANCE
}
