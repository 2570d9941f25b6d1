//! Order Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::department::Department;
use super::discount::DiscountSelection;
use super::pricing::PriceBreakdown;

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Draft,
    Confirmed,
    /// On the production floor
    Finalized,
    Shipped,
    Cancelled,
    /// Destroyed on the floor; a replacement may carry the work on
    Scrapped,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Shipped | Self::Cancelled | Self::Scrapped)
    }

    /// Draft and Confirmed orders may still be edited
    pub fn is_editable(self) -> bool {
        matches!(self, Self::Draft | Self::Confirmed)
    }
}

/// Feature selection value: a single option or a set of options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FeatureValue {
    Single(String),
    Multi(Vec<String>),
}

impl FeatureValue {
    /// Selected option values, skipping empty strings and `none`
    pub fn values(&self) -> Vec<&str> {
        let raw: Vec<&str> = match self {
            Self::Single(v) => vec![v.as_str()],
            Self::Multi(vs) => vs.iter().map(String::as_str).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|v| !v.is_empty() && *v != "none")
            .collect()
    }

    /// First selected value
    pub fn first(&self) -> Option<&str> {
        self.values().into_iter().next()
    }
}

/// Ad-hoc priced line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MiscLineItem {
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub customer_id: String,
    pub model_id: String,
    #[serde(default)]
    pub features: BTreeMap<String, FeatureValue>,
    #[serde(default)]
    pub price_override: Option<Decimal>,
    #[serde(default)]
    pub discount: DiscountSelection,
    #[serde(default)]
    pub misc_items: Vec<MiscLineItem>,
    pub status: OrderStatus,
    pub current_department: Option<Department>,
    /// Flat-top stocks skip CNC
    #[serde(default)]
    pub is_flattop: bool,
    pub order_date: i64,
    pub due_date: i64,
    #[serde(default)]
    pub notes: Option<String>,
    /// Totals from the last save
    #[serde(default)]
    pub pricing: Option<PriceBreakdown>,
    /// When the order left each department
    #[serde(default)]
    pub department_completed_at: BTreeMap<Department, i64>,
    pub finalized_at: Option<i64>,
    pub shipped_at: Option<i64>,
    pub cancelled_at: Option<i64>,
    pub cancel_reason: Option<String>,
    /// Restored by undo-cancel
    pub pre_cancel_status: Option<OrderStatus>,
    pub pre_cancel_department: Option<Department>,
    #[serde(default)]
    pub scrap: Option<ScrapRecord>,
    /// Scrapped order this one replaces
    #[serde(default)]
    pub replaces_order_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Why and where a stock was scrapped
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapRecord {
    pub reason: String,
    pub disposition: Option<String>,
    pub authorized_by: Option<String>,
    pub department: Department,
    pub scrapped_at: i64,
    pub replacement_order_id: Option<String>,
}

/// Scrap payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapRequest {
    pub reason: String,
    #[serde(default)]
    pub disposition: Option<String>,
    #[serde(default)]
    pub authorized_by: Option<String>,
    /// Open a replacement order in Layup with the same configuration
    #[serde(default)]
    pub create_replacement: bool,
}

impl Order {
    /// Orders are overdue once their due date has passed
    pub fn is_overdue(&self, now: i64) -> bool {
        self.due_date < now
    }
}

/// Save draft payload (create when `order_id` is absent)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    #[serde(default)]
    pub order_id: Option<String>,
    pub customer_id: String,
    pub model_id: String,
    #[serde(default)]
    pub features: BTreeMap<String, FeatureValue>,
    #[serde(default)]
    pub price_override: Option<Decimal>,
    #[serde(default)]
    pub discount: DiscountSelection,
    #[serde(default)]
    pub misc_items: Vec<MiscLineItem>,
    #[serde(default)]
    pub is_flattop: bool,
    #[serde(default)]
    pub order_date: Option<i64>,
    pub due_date: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Order list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub department: Option<Department>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        self.status.is_none_or(|s| order.status == s)
            && self
                .department
                .is_none_or(|d| order.current_department == Some(d))
    }
}
