//! Price Engine
//!
//! `base + features + misc = subtotal`, then one discount, then
//! `total = max(0, subtotal - discount)`.
//!
//! Arithmetic saturates instead of overflowing; a saturated quote carries
//! [`OVERFLOW_REF`](super::OVERFLOW_REF) in its `unknown_refs`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{DiscountSelection, FeatureValue, MiscLineItem, Order, OrderDraft, PriceBreakdown};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::discount_calculator::calculate_discount;
use super::feature_calculator::calculate_features_total;
use super::{add_money, mul_money, round_money, sub_money};
use crate::catalog::CatalogIndex;

/// Borrowed view of the order fields that drive the price
#[derive(Debug, Clone, Copy)]
pub struct PricingInput<'a> {
    pub model_id: &'a str,
    pub features: &'a BTreeMap<String, FeatureValue>,
    pub price_override: Option<Decimal>,
    pub discount: &'a DiscountSelection,
    pub misc_items: &'a [MiscLineItem],
}

impl<'a> From<&'a Order> for PricingInput<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            model_id: &order.model_id,
            features: &order.features,
            price_override: order.price_override,
            discount: &order.discount,
            misc_items: &order.misc_items,
        }
    }
}

impl<'a> From<&'a OrderDraft> for PricingInput<'a> {
    fn from(draft: &'a OrderDraft) -> Self {
        Self {
            model_id: &draft.model_id,
            features: &draft.features,
            price_override: draft.price_override,
            discount: &draft.discount,
            misc_items: &draft.misc_items,
        }
    }
}

/// Quote request payload (an order snapshot mid-edit)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub model_id: String,
    #[serde(default)]
    pub features: BTreeMap<String, FeatureValue>,
    #[serde(default)]
    pub price_override: Option<Decimal>,
    #[serde(default)]
    pub discount: DiscountSelection,
    #[serde(default)]
    pub misc_items: Vec<MiscLineItem>,
}

impl<'a> From<&'a QuoteRequest> for PricingInput<'a> {
    fn from(req: &'a QuoteRequest) -> Self {
        Self {
            model_id: &req.model_id,
            features: &req.features,
            price_override: req.price_override,
            discount: &req.discount,
            misc_items: &req.misc_items,
        }
    }
}

/// Price engine over one catalog snapshot
#[derive(Debug, Clone)]
pub struct PriceEngine {
    catalog: Arc<CatalogIndex>,
}

impl PriceEngine {
    pub fn new(catalog: Arc<CatalogIndex>) -> Self {
        Self { catalog }
    }

    /// Compute the price breakdown at time `now` (Unix millis)
    pub fn quote<'a>(&self, input: impl Into<PricingInput<'a>>, now: i64) -> PriceBreakdown {
        let input = input.into();
        let mut unknown_refs = Vec::new();

        let base = match input.price_override {
            Some(price) => price,
            None => match self.catalog.stock_model(input.model_id) {
                Some(model) => model.base_price,
                None => {
                    tracing::debug!(model_id = %input.model_id, "Unknown stock model priced as zero");
                    unknown_refs.push(format!("model:{}", input.model_id));
                    Decimal::ZERO
                }
            },
        };

        let features_total =
            calculate_features_total(&self.catalog, input.features, &mut unknown_refs);

        let mut misc_total = Decimal::ZERO;
        for item in input.misc_items {
            let line = mul_money(Decimal::from(item.quantity), item.unit_price, &mut unknown_refs);
            misc_total = add_money(misc_total, line, &mut unknown_refs);
        }

        let subtotal = add_money(base, features_total, &mut unknown_refs);
        let subtotal = add_money(subtotal, misc_total, &mut unknown_refs);

        let discount = calculate_discount(
            &self.catalog,
            input.discount,
            base,
            subtotal,
            now,
            &mut unknown_refs,
        );

        let total = sub_money(subtotal, discount.amount, &mut unknown_refs).max(Decimal::ZERO);

        PriceBreakdown {
            base_price: round_money(base),
            features_total: round_money(features_total),
            misc_total: round_money(misc_total),
            subtotal: round_money(subtotal),
            discount: round_money(discount.amount),
            total: round_money(total),
            discount_label: discount.label,
            unknown_refs,
        }
    }
}
