use super::*;
use shared::models::{
    Catalog, DiscountScope, DiscountValue, Feature, FeatureOption, FeatureValue, KickbackReason,
    MiscLineItem, PersistentDiscount, SelectionMode, StockModel,
};
use std::collections::BTreeMap;

const DAY: i64 = 86_400_000;

fn stock_model(id: &str, display_name: &str, base_price: i64) -> StockModel {
    StockModel {
        id: id.to_string(),
        display_name: display_name.to_string(),
        base_price: Decimal::from(base_price),
        is_active: true,
        sort_order: 0,
    }
}

fn test_catalog() -> Catalog {
    Catalog {
        stock_models: vec![
            stock_model("alpine_hunter", "CF Alpine Hunter", 1000),
            stock_model("ferrata", "FG Ferrata", 800),
            stock_model("armor", "CF Armor", 1200),
        ],
        features: vec![Feature {
            id: "action".to_string(),
            name: "action".to_string(),
            display_name: "Action".to_string(),
            category: None,
            sub_category: None,
            selection_mode: SelectionMode::Single,
            options: vec![FeatureOption {
                value: "rem700".to_string(),
                label: "Remington 700".to_string(),
                price: Decimal::from(50),
            }],
            is_active: true,
        }],
        persistent_discounts: vec![PersistentDiscount {
            id: "1".to_string(),
            code: "MIL".to_string(),
            description: None,
            value: DiscountValue::Percent(Decimal::from(10)),
            applies_to: DiscountScope::StockModelOnly,
            is_active: true,
        }],
        short_term_sales: vec![],
    }
}

fn create_test_manager() -> OrdersManager {
    let storage = OrderStorage::open_in_memory().unwrap();
    let catalog = Arc::new(CatalogService::from_catalog(test_catalog()));
    OrdersManager::with_storage(storage, catalog, 64)
}

fn draft(model_id: &str) -> OrderDraft {
    let mut features = BTreeMap::new();
    features.insert("action".to_string(), FeatureValue::Single("rem700".to_string()));
    OrderDraft {
        order_id: None,
        customer_id: "C-100".to_string(),
        model_id: model_id.to_string(),
        features,
        price_override: None,
        discount: DiscountSelection::None,
        misc_items: vec![],
        is_flattop: false,
        order_date: None,
        due_date: Utc::now().timestamp_millis() + 30 * DAY,
        notes: None,
    }
}

/// Save, confirm and finalize a new order (lands in Layup)
fn finalized_order(manager: &OrdersManager, model_id: &str) -> Order {
    let order = manager.save_draft(draft(model_id), "sales").unwrap();
    manager.confirm(&order.order_id, "sales").unwrap();
    manager.finalize(&order.order_id, "sales").unwrap()
}

/// Finalized order moved to `department`
fn order_in(manager: &OrdersManager, department: Department) -> Order {
    let order = finalized_order(manager, "alpine_hunter");
    if department == Department::Layup {
        return order;
    }
    let outcomes = manager.progress(&[order.order_id.clone()], department, "floor");
    assert!(outcomes[0].success, "{:?}", outcomes[0].error);
    outcomes[0].order.clone().unwrap()
}

fn kickback_request(to: Department, priority: KickbackPriority) -> KickbackCreate {
    KickbackCreate {
        to_department: to,
        reason_code: KickbackReason::MaterialDefect,
        reason_text: Some("dry spot in layup".to_string()),
        priority,
        reported_by: "cnc-lead".to_string(),
    }
}

mod test_kickback;
