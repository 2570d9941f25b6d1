//! Feature pricing
//!
//! Generic features add their selected option prices. Bottom metal, paint,
//! rail accessories and other options are priced by their own rules.

use rust_decimal::Decimal;
use shared::models::FeatureValue;
use std::collections::BTreeMap;

use super::add_money;
use crate::catalog::{
    BOTTOM_METAL, CatalogIndex, OTHER_OPTIONS, RAIL_ACCESSORY, is_special_feature, selected_paint,
};

/// Sum of every priced feature selection
pub fn calculate_features_total(
    catalog: &CatalogIndex,
    features: &BTreeMap<String, FeatureValue>,
    unknown_refs: &mut Vec<String>,
) -> Decimal {
    let mut total = Decimal::ZERO;

    // Generic features: single -> one option, multi -> sum of options
    for (feature_id, value) in features {
        if is_special_feature(feature_id) {
            continue;
        }
        let sum = sum_options(catalog, feature_id, &value.values(), unknown_refs);
        total = add_money(total, sum, unknown_refs);
    }

    // Bottom metal: direct lookup of the single selection
    if let Some(value) = features.get(BOTTOM_METAL).and_then(FeatureValue::first) {
        let sum = sum_options(catalog, BOTTOM_METAL, &[value], unknown_refs);
        total = add_money(total, sum, unknown_refs);
    }

    // Paint: indexed lookup over all paint-tagged features
    if let Some((field, value)) = selected_paint(features) {
        match catalog.paint_price(value) {
            Some(price) => total = add_money(total, price, unknown_refs),
            None => miss(unknown_refs, format!("{field}:{value}")),
        }
    }

    // Rail accessories and other options (multi select)
    for family in [RAIL_ACCESSORY, OTHER_OPTIONS] {
        if let Some(value) = features.get(family) {
            let sum = sum_options(catalog, family, &value.values(), unknown_refs);
            total = add_money(total, sum, unknown_refs);
        }
    }

    total
}

fn sum_options(
    catalog: &CatalogIndex,
    feature_id: &str,
    values: &[&str],
    unknown_refs: &mut Vec<String>,
) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let Some(feature) = catalog.feature(feature_id) else {
        miss(unknown_refs, format!("feature:{feature_id}"));
        return Decimal::ZERO;
    };

    let mut sum = Decimal::ZERO;
    for value in values {
        match feature.option(value) {
            Some(option) => sum = add_money(sum, option.price, unknown_refs),
            None => miss(unknown_refs, format!("{feature_id}:{value}")),
        }
    }
    sum
}

fn miss(unknown_refs: &mut Vec<String>, reference: String) {
    tracing::debug!(reference = %reference, "Catalog miss priced as zero");
    unknown_refs.push(reference);
}
