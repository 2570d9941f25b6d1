//! Discount calculation
//!
//! One discount per order. Catalog discounts are computed against the base
//! price or the subtotal depending on their scope; custom discounts always
//! use the subtotal.

use rust_decimal::Decimal;
use shared::models::{CustomDiscountType, DiscountScope, DiscountSelection, DiscountValue};

use super::percent_of;
use crate::catalog::CatalogIndex;

/// Discount amount and its display label
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedDiscount {
    pub amount: Decimal,
    pub label: Option<String>,
}

impl AppliedDiscount {
    fn none() -> Self {
        Self::default()
    }

    fn new(amount: Decimal, label: impl Into<String>) -> Self {
        Self {
            amount: amount.max(Decimal::ZERO),
            label: Some(label.into()),
        }
    }
}

/// Amount of a catalog discount against its scoped basis
///
/// Fixed amounts are capped at the basis.
fn scoped_amount(
    value: DiscountValue,
    scope: DiscountScope,
    base: Decimal,
    subtotal: Decimal,
    unknown_refs: &mut Vec<String>,
) -> Decimal {
    let basis = match scope {
        DiscountScope::StockModelOnly => base,
        DiscountScope::TotalOrder => subtotal,
    };
    match value {
        DiscountValue::Percent(percent) => percent_of(basis, percent, unknown_refs),
        DiscountValue::FixedAmount(amount) => amount.min(basis),
    }
}

/// Compute the discount for `selection`
///
/// Inactive discounts and short-term sales outside their window contribute
/// zero. Unknown discount ids are recorded in `unknown_refs`.
pub fn calculate_discount(
    catalog: &CatalogIndex,
    selection: &DiscountSelection,
    base: Decimal,
    subtotal: Decimal,
    now: i64,
    unknown_refs: &mut Vec<String>,
) -> AppliedDiscount {
    match selection {
        DiscountSelection::None => AppliedDiscount::none(),

        DiscountSelection::Custom { custom_type, value } => {
            let amount = match custom_type {
                CustomDiscountType::Percent => percent_of(subtotal, *value, unknown_refs),
                CustomDiscountType::Amount => *value,
            };
            AppliedDiscount::new(amount, "Custom")
        }

        DiscountSelection::Persistent { id } => match catalog.persistent_discount(id) {
            Some(discount) if discount.is_active => AppliedDiscount::new(
                scoped_amount(discount.value, discount.applies_to, base, subtotal, unknown_refs),
                discount.code.clone(),
            ),
            Some(_) => AppliedDiscount::none(),
            None => {
                tracing::debug!(discount_id = %id, "Unknown persistent discount priced as zero");
                unknown_refs.push(format!("persistent_{id}"));
                AppliedDiscount::none()
            }
        },

        DiscountSelection::ShortTerm { id } => match catalog.short_term_sale(id) {
            Some(sale) if sale.is_live(now) => AppliedDiscount::new(
                scoped_amount(
                    DiscountValue::Percent(sale.percent),
                    sale.applies_to,
                    base,
                    subtotal,
                    unknown_refs,
                ),
                sale.code.clone(),
            ),
            Some(_) => AppliedDiscount::none(),
            None => {
                tracing::debug!(discount_id = %id, "Unknown short-term sale priced as zero");
                unknown_refs.push(format!("short_term_{id}"));
                AppliedDiscount::none()
            }
        },
    }
}
