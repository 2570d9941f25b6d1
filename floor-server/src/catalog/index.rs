//! Indexed, read-only view over a [`Catalog`]

use rust_decimal::Decimal;
use shared::models::{
    Catalog, DiscountSelection, Feature, FeatureValue, PersistentDiscount, ShortTermSale,
    StockModel,
};
use std::collections::{BTreeMap, HashMap};

use super::error::CatalogError;

/// Bottom metal (single select, priced by direct lookup)
pub const BOTTOM_METAL: &str = "bottom_metal";
/// Rail accessories (multi select)
pub const RAIL_ACCESSORY: &str = "rail_accessory";
/// Other options (multi select)
pub const OTHER_OPTIONS: &str = "other_options";
/// Order fields that may carry the paint choice, in lookup order
pub const PAINT_FIELDS: [&str; 4] = [
    "paint_options_combined",
    "paint_options",
    "paint",
    "metallic_finishes",
];

const PAINT_TAGS: [&str; 2] = ["paint", "paint_options"];
const PAINT_DISPLAY_HINTS: [&str; 3] = ["Paint", "Cerakote", "Camo"];

/// Features priced outside the generic per-feature sum
pub fn is_special_feature(id: &str) -> bool {
    id == BOTTOM_METAL || id == RAIL_ACCESSORY || id == OTHER_OPTIONS || PAINT_FIELDS.contains(&id)
}

fn is_paint_feature(feature: &Feature) -> bool {
    let tagged = |tag: &Option<String>| {
        tag.as_deref()
            .is_some_and(|t| PAINT_TAGS.iter().any(|p| t.eq_ignore_ascii_case(p)))
    };
    feature.id == "paint_options"
        || tagged(&feature.category)
        || tagged(&feature.sub_category)
        || PAINT_DISPLAY_HINTS
            .iter()
            .any(|hint| feature.display_name.contains(hint))
}

/// Strip the `category:` part of a combined paint value
pub fn paint_value(raw: &str) -> &str {
    raw.split_once(':').map_or(raw, |(_, value)| value).trim()
}

/// Paint choice stored on an order: the first non-empty paint field
pub fn selected_paint(features: &BTreeMap<String, FeatureValue>) -> Option<(&'static str, &str)> {
    PAINT_FIELDS.iter().find_map(|field| {
        features
            .get(*field)
            .and_then(FeatureValue::first)
            .map(paint_value)
            .filter(|v| !v.is_empty() && *v != "none")
            .map(|v| (*field, v))
    })
}

/// Catalog with id lookups and the paint price index
#[derive(Debug, Default)]
pub struct CatalogIndex {
    catalog: Catalog,
    models: HashMap<String, usize>,
    features: HashMap<String, usize>,
    persistent: HashMap<String, usize>,
    short_term: HashMap<String, usize>,
    /// option value -> price over every paint-tagged feature
    paint_prices: HashMap<String, Decimal>,
}

impl CatalogIndex {
    pub fn new(catalog: Catalog) -> Self {
        let models = index_by(&catalog.stock_models, |m| &m.id);
        let features = index_by(&catalog.features, |f| &f.id);
        let persistent = index_by(&catalog.persistent_discounts, |d| &d.id);
        let short_term = index_by(&catalog.short_term_sales, |d| &d.id);
        let paint_prices = build_paint_index(&catalog.features);

        tracing::debug!(
            models = models.len(),
            features = features.len(),
            paint_options = paint_prices.len(),
            "Catalog indexed"
        );

        Self {
            catalog,
            models,
            features,
            persistent,
            short_term,
            paint_prices,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn stock_model(&self, id: &str) -> Option<&StockModel> {
        self.models.get(id).map(|&i| &self.catalog.stock_models[i])
    }

    pub fn feature(&self, id: &str) -> Option<&Feature> {
        self.features.get(id).map(|&i| &self.catalog.features[i])
    }

    pub fn persistent_discount(&self, id: &str) -> Option<&PersistentDiscount> {
        self.persistent
            .get(id)
            .map(|&i| &self.catalog.persistent_discounts[i])
    }

    pub fn short_term_sale(&self, id: &str) -> Option<&ShortTermSale> {
        self.short_term
            .get(id)
            .map(|&i| &self.catalog.short_term_sales[i])
    }

    /// Price of a paint option value
    pub fn paint_price(&self, value: &str) -> Option<Decimal> {
        self.paint_prices.get(value).copied()
    }

    /// Price of `value` on feature `feature_id`
    pub fn option_price(&self, feature_id: &str, value: &str) -> Option<Decimal> {
        self.feature(feature_id)?.option(value).map(|o| o.price)
    }

    /// Reject selections that reference ids the catalog does not know
    pub fn validate_selection(
        &self,
        model_id: &str,
        features: &BTreeMap<String, FeatureValue>,
        discount: &DiscountSelection,
    ) -> Result<(), CatalogError> {
        if self.stock_model(model_id).is_none() {
            return Err(CatalogError::UnknownModel(model_id.to_string()));
        }

        for (feature_id, value) in features {
            if PAINT_FIELDS.contains(&feature_id.as_str()) {
                continue;
            }
            let feature = self
                .feature(feature_id)
                .ok_or_else(|| CatalogError::UnknownFeature(feature_id.clone()))?;
            if let Some(missing) = value.values().into_iter().find(|v| feature.option(v).is_none())
            {
                return Err(CatalogError::UnknownOption {
                    feature: feature_id.clone(),
                    value: missing.to_string(),
                });
            }
        }

        if let Some((field, paint)) = selected_paint(features)
            && self.paint_price(paint).is_none()
        {
            return Err(CatalogError::UnknownOption {
                feature: field.to_string(),
                value: paint.to_string(),
            });
        }

        match discount {
            DiscountSelection::Persistent { id } if self.persistent_discount(id).is_none() => {
                Err(CatalogError::UnknownDiscount(format!("persistent_{id}")))
            }
            DiscountSelection::ShortTerm { id } if self.short_term_sale(id).is_none() => {
                Err(CatalogError::UnknownDiscount(format!("short_term_{id}")))
            }
            _ => Ok(()),
        }
    }
}

fn index_by<T>(items: &[T], key: impl Fn(&T) -> &String) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        index.entry(key(item).clone()).or_insert(i);
    }
    index
}

/// First registration wins; a later duplicate with another price is logged
fn build_paint_index(features: &[Feature]) -> HashMap<String, Decimal> {
    let mut prices: HashMap<String, Decimal> = HashMap::new();
    for feature in features.iter().filter(|f| is_paint_feature(f)) {
        for option in &feature.options {
            match prices.get(&option.value) {
                None => {
                    prices.insert(option.value.clone(), option.price);
                }
                Some(existing) if *existing != option.price => {
                    tracing::warn!(
                        value = %option.value,
                        feature = %feature.id,
                        kept = %existing,
                        ignored = %option.price,
                        "Duplicate paint option with different price"
                    );
                }
                Some(_) => {}
            }
        }
    }
    prices
}
