//! Catalog Model (stock models and priced features)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::discount::{PersistentDiscount, ShortTermSale};

/// Stock model (base product with a list price)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockModel {
    pub id: String,
    pub display_name: String,
    pub base_price: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

/// Feature selection mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    #[default]
    Single,
    Multi,
}

/// One selectable value of a feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureOption {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub price: Decimal,
}

/// Configurable feature with priced options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub selection_mode: SelectionMode,
    #[serde(default)]
    pub options: Vec<FeatureOption>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Feature {
    pub fn option(&self, value: &str) -> Option<&FeatureOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

/// Catalog document (read-only to the order core)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub stock_models: Vec<StockModel>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub persistent_discounts: Vec<PersistentDiscount>,
    #[serde(default)]
    pub short_term_sales: Vec<ShortTermSale>,
}

fn default_true() -> bool {
    true
}
