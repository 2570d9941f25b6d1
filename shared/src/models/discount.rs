//! Discount Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What a catalog discount is computed against.
///
/// Required on every discount record; there is no implicit default.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiscountScope {
    /// Base price only (stock model or price override)
    StockModelOnly,
    /// Full order subtotal
    TotalOrder,
}

/// Discount amount: percentage (10 = 10%) or fixed amount
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DiscountValue {
    Percent(Decimal),
    FixedAmount(Decimal),
}

/// Catalog discount with no expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistentDiscount {
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub value: DiscountValue,
    pub applies_to: DiscountScope,
    pub is_active: bool,
}

/// Catalog discount valid within a date window (Unix millis, inclusive)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortTermSale {
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub percent: Decimal,
    pub start_date: i64,
    pub end_date: i64,
    pub applies_to: DiscountScope,
    pub is_active: bool,
}

impl ShortTermSale {
    /// Active flag set and `start_date <= now <= end_date`
    pub fn is_live(&self, now: i64) -> bool {
        self.is_active && self.start_date <= now && now <= self.end_date
    }
}

/// Per-order custom discount type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CustomDiscountType {
    Percent,
    Amount,
}

/// Discount selected on an order (at most one)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscountSelection {
    #[default]
    None,
    Persistent {
        id: String,
    },
    ShortTerm {
        id: String,
    },
    /// Always applied to the full subtotal
    Custom {
        custom_type: CustomDiscountType,
        value: Decimal,
    },
}

impl DiscountSelection {
    /// Parse the legacy selector codes `none`, `persistent_<id>`, `short_term_<id>`
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.is_empty() || code == "none" {
            return Some(Self::None);
        }
        if let Some(id) = code.strip_prefix("persistent_").filter(|id| !id.is_empty()) {
            return Some(Self::Persistent { id: id.to_string() });
        }
        if let Some(id) = code.strip_prefix("short_term_").filter(|id| !id.is_empty()) {
            return Some(Self::ShortTerm { id: id.to_string() });
        }
        None
    }

    /// Legacy selector code; `None` for custom discounts
    pub fn code(&self) -> Option<String> {
        match self {
            Self::None => Some("none".to_string()),
            Self::Persistent { id } => Some(format!("persistent_{id}")),
            Self::ShortTerm { id } => Some(format!("short_term_{id}")),
            Self::Custom { .. } => None,
        }
    }
}
