//! Price & Discount Engine
//!
//! Pure computation over a [`CatalogIndex`](crate::catalog::CatalogIndex)
//! snapshot. Quoting never fails: unknown catalog references price as zero
//! and are reported in [`PriceBreakdown::unknown_refs`](shared::models::PriceBreakdown).

mod discount_calculator;
mod engine;
mod feature_calculator;


pub use discount_calculator::{AppliedDiscount, calculate_discount};
pub use engine::{PriceEngine, PricingInput, QuoteRequest};
pub use feature_calculator::calculate_features_total;

use rust_decimal::prelude::*;

/// Decimal places for money output
const DECIMAL_PLACES: u32 = 2;

/// Recorded in `unknown_refs` when an amount saturated at the `Decimal` bounds
pub const OVERFLOW_REF: &str = "overflow";

fn saturate(negative: bool, refs: &mut Vec<String>) -> Decimal {
    tracing::warn!("Price arithmetic overflowed, saturating");
    if !refs.iter().any(|r| r == OVERFLOW_REF) {
        refs.push(OVERFLOW_REF.to_string());
    }
    if negative { Decimal::MIN } else { Decimal::MAX }
}

/// `a + b`, saturating on overflow
pub(crate) fn add_money(a: Decimal, b: Decimal, refs: &mut Vec<String>) -> Decimal {
    a.checked_add(b)
        .unwrap_or_else(|| saturate(b.is_sign_negative(), refs))
}

/// `a - b`, saturating on overflow
pub(crate) fn sub_money(a: Decimal, b: Decimal, refs: &mut Vec<String>) -> Decimal {
    a.checked_sub(b)
        .unwrap_or_else(|| saturate(b.is_sign_positive(), refs))
}

/// `a * b`, saturating on overflow
pub(crate) fn mul_money(a: Decimal, b: Decimal, refs: &mut Vec<String>) -> Decimal {
    a.checked_mul(b)
        .unwrap_or_else(|| saturate(a.is_sign_negative() != b.is_sign_negative(), refs))
}

/// `basis * percent / 100`, saturating on overflow
pub(crate) fn percent_of(basis: Decimal, percent: Decimal, refs: &mut Vec<String>) -> Decimal {
    mul_money(basis, percent, refs) / Decimal::ONE_HUNDRED
}

/// Round a money value to 2 decimal places, half away from zero
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}
