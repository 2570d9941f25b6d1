//! Price breakdown returned by the price engine

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Computed order totals (rounded to 2 decimal places)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PriceBreakdown {
    /// Price override or stock model base price
    pub base_price: Decimal,
    pub features_total: Decimal,
    pub misc_total: Decimal,
    pub subtotal: Decimal,
    pub discount: Decimal,
    /// `max(0, subtotal - discount)`
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_label: Option<String>,
    /// Catalog references that priced as zero because they were not found
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_refs: Vec<String>,
}
