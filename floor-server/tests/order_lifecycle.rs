//! End-to-end order lifecycle over a file-backed store and the HTTP API

use axum::body::Body;
use floor_server::orders::ManagerError;
use floor_server::{CatalogService, Config, OrdersManager, ServerState, api};
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use shared::models::{Catalog, DiscountSelection, OrderDraft};
use shared::order_id::is_valid_order_id;
use std::collections::HashSet;
use std::sync::Arc;
use tower::ServiceExt;

const CATALOG: &str = r#"{
    "stock_models": [
        {"id": "alpine_hunter", "display_name": "CF Alpine Hunter", "base_price": 1000},
        {"id": "ferrata", "display_name": "FG Ferrata", "base_price": 800}
    ],
    "features": [
        {"id": "action", "name": "action", "display_name": "Action",
         "options": [{"value": "rem700", "label": "Rem 700", "price": 50}]},
        {"id": "accessories", "name": "accessories", "display_name": "Accessories",
         "selection_mode": "multi",
         "options": [{"value": "sling", "label": "Sling", "price": 20},
                     {"value": "swivel", "label": "Swivel", "price": 30}]},
        {"id": "grip", "name": "grip", "display_name": "Grip",
         "options": [{"value": "vertical", "label": "Vertical", "price": 200}]}
    ],
    "persistent_discounts": [
        {"id": "1", "code": "MIL", "value": {"type": "percent", "value": 10},
         "applies_to": "stock_model_only", "is_active": true},
        {"id": "2", "code": "GOV", "value": {"type": "percent", "value": 10},
         "applies_to": "total_order", "is_active": true}
    ]
}"#;

fn catalog() -> Arc<CatalogService> {
    let catalog: Catalog = serde_json::from_str(CATALOG).unwrap();
    Arc::new(CatalogService::from_catalog(catalog))
}

fn draft(customer: &str) -> OrderDraft {
    OrderDraft {
        order_id: None,
        customer_id: customer.to_string(),
        model_id: "alpine_hunter".to_string(),
        features: Default::default(),
        price_override: None,
        discount: DiscountSelection::None,
        misc_items: vec![],
        is_flattop: false,
        order_date: None,
        due_date: 0,
        notes: None,
    }
}

#[test]
fn concurrent_first_saves_get_unique_ids() {
    let dir = tempfile::tempdir().unwrap();
    let manager = Arc::new(OrdersManager::new(dir.path().join("floor.redb"), catalog(), 16).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let manager = manager.clone();
            std::thread::spawn(move || {
                (0..10)
                    .map(|i| {
                        manager
                            .save_draft(draft(&format!("C-{t}-{i}")), "sales")
                            .unwrap()
                            .order_id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let ids: Vec<String> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    let unique: HashSet<&String> = ids.iter().collect();

    assert_eq!(ids.len(), 80);
    assert_eq!(unique.len(), 80);
    assert!(ids.iter().all(|id| is_valid_order_id(id)));
}

#[test]
fn store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("floor.redb");

    let first_id = {
        let manager = OrdersManager::new(&path, catalog(), 16).unwrap();
        let order = manager.save_draft(draft("C-1"), "sales").unwrap();
        manager.confirm(&order.order_id, "sales").unwrap();
        manager.finalize(&order.order_id, "sales").unwrap();
        order.order_id
    };

    let manager = OrdersManager::new(&path, catalog(), 16).unwrap();
    let order = manager.get_order(&first_id).unwrap();
    assert_eq!(order.current_department, Some(shared::models::Department::Layup));

    let next = manager.save_draft(draft("C-2"), "sales").unwrap();
    assert_ne!(next.order_id, first_id);
    assert!(next.order_id > first_id);

    assert!(matches!(
        manager.get_order("AA999"),
        Err(ManagerError::OrderNotFound(_))
    ));
}

// ========== HTTP API ==========

struct TestApp {
    app: axum::Router,
    _dir: tempfile::TempDir,
}

impl TestApp {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_overrides(dir.path().to_string_lossy(), 0);
        let catalog = catalog();
        let orders = Arc::new(
            OrdersManager::new(config.database_path(), catalog.clone(), 16).unwrap(),
        );
        let state = ServerState::new(config, catalog, orders);
        Self {
            app: api::build_app(state),
            _dir: dir,
        }
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-operator", "tester");
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }
}

#[tokio::test]
async fn api_health() {
    let app = TestApp::new();
    let (status, body) = app.send("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["stock_models"], 2);
}

#[tokio::test]
async fn api_quote_scopes_discount() {
    let app = TestApp::new();
    let mut req = json!({
        "model_id": "alpine_hunter",
        "features": {"grip": "vertical"},
        "discount": {"kind": "persistent", "id": "1"}
    });

    let (status, body) = app.send("POST", "/api/pricing/quote", Some(req.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["subtotal"], 1200.0);
    assert_eq!(body["data"]["discount"], 100.0);
    assert_eq!(body["data"]["total"], 1100.0);

    req["discount"]["id"] = json!("2");
    let (_, body) = app.send("POST", "/api/pricing/quote", Some(req)).await;
    assert_eq!(body["data"]["discount"], 120.0);
    assert_eq!(body["data"]["total"], 1080.0);
}

#[tokio::test]
async fn api_quote_tolerates_unknown_ids() {
    let app = TestApp::new();
    let req = json!({
        "model_id": "ghost",
        "features": {"action": "rem700", "accessories": ["sling", "swivel"]}
    });
    let (status, body) = app.send("POST", "/api/pricing/quote", Some(req)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["subtotal"], 100.0);
    assert_eq!(body["data"]["unknown_refs"][0], "model:ghost");
}

#[tokio::test]
async fn api_full_lifecycle() {
    let app = TestApp::new();

    let (_, preview) = app.send("GET", "/api/orders/next-id", None).await;
    let expected_id = preview["data"]["order_id"].as_str().unwrap().to_string();

    let draft = json!({
        "customer_id": "C-100",
        "model_id": "alpine_hunter",
        "features": {"action": "rem700", "accessories": ["sling", "swivel"]},
        "due_date": 0
    });
    let (status, body) = app.send("POST", "/api/orders", Some(draft)).await;
    assert_eq!(status, StatusCode::OK);
    let order_id = body["data"]["order_id"].as_str().unwrap().to_string();
    assert_eq!(order_id, expected_id);
    assert_eq!(body["data"]["pricing"]["subtotal"], 1100.0);

    let (status, body) = app
        .send("POST", &format!("/api/orders/{order_id}/finalize"), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["order_id"], order_id.as_str());

    app.send("POST", &format!("/api/orders/{order_id}/confirm"), None).await;
    let (status, body) = app
        .send("POST", &format!("/api/orders/{order_id}/finalize"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["current_department"], "Layup");

    let (status, body) = app
        .send(
            "POST",
            "/api/orders/progress-department",
            Some(json!({"order_ids": [order_id, "AA999"], "to_department": "CNC"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["succeeded"], 1);
    assert_eq!(body["data"]["failed"], 1);
    assert_eq!(body["data"]["results"][1]["code"], 4001);

    let (status, body) = app
        .send(
            "POST",
            &format!("/api/orders/{order_id}/kickback"),
            Some(json!({
                "to_department": "Layup",
                "reason_code": "MATERIAL_DEFECT",
                "priority": "CRITICAL",
                "reported_by": "cnc-lead"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["kickback"]["from_department"], "CNC");
    assert_eq!(body["data"]["order"]["current_department"], "Layup");

    let (_, body) = app
        .send("GET", &format!("/api/orders/{order_id}/kickbacks"), None)
        .await;
    assert_eq!(body["data"]["severity"], "CRITICAL");
    assert_eq!(body["data"]["kickbacks"].as_array().unwrap().len(), 1);

    let (_, body) = app.send("GET", "/api/departments/layup/queue", None).await;
    assert_eq!(body["data"][0]["model_name"], "Alpine Hunter");
    assert_eq!(body["data"][0]["entries"][0]["severity"], "CRITICAL");

    let (_, body) = app
        .send(
            "POST",
            &format!("/api/orders/{order_id}/cancel"),
            Some(json!({"reason": "customer request"})),
        )
        .await;
    assert_eq!(body["data"]["status"], "CANCELLED");
    assert_eq!(body["data"]["current_department"], Value::Null);

    let (_, body) = app
        .send("POST", &format!("/api/orders/{order_id}/undo-cancel"), None)
        .await;
    assert_eq!(body["data"]["status"], "FINALIZED");
    assert_eq!(body["data"]["current_department"], "Layup");

    let (_, body) = app.send("GET", "/api/kickbacks/analytics", None).await;
    assert_eq!(body["data"]["total_kickbacks"], 1);
    assert_eq!(body["data"]["by_department"]["CNC"], 1);
}

#[tokio::test]
async fn api_errors_carry_codes() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/api/orders/AG404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);

    let (status, body) = app
        .send(
            "POST",
            "/api/orders",
            Some(json!({"customer_id": "", "model_id": "alpine_hunter", "due_date": 0})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "customer_id");

    let (status, body) = app.send("GET", "/api/departments/welding/queue", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4201);

    let (status, _) = app
        .send(
            "PUT",
            "/api/kickbacks/12345/status",
            Some(json!({"status": "RESOLVED"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_scrap_delete_and_counts() {
    let app = TestApp::new();
    let draft = json!({"customer_id": "C-7", "model_id": "ferrata", "due_date": 0});

    let (_, body) = app.send("POST", "/api/orders", Some(draft.clone())).await;
    let draft_id = body["data"]["order_id"].as_str().unwrap().to_string();
    let (status, _) = app.send("DELETE", &format!("/api/orders/{draft_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send("GET", &format!("/api/orders/{draft_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.send("POST", "/api/orders", Some(draft)).await;
    let order_id = body["data"]["order_id"].as_str().unwrap().to_string();
    app.send("POST", &format!("/api/orders/{order_id}/confirm"), None).await;
    app.send("POST", &format!("/api/orders/{order_id}/finalize"), None).await;

    let (status, _) = app.send("DELETE", &format!("/api/orders/{order_id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .send(
            "POST",
            &format!("/api/orders/{order_id}/scrap"),
            Some(json!({"reason": "cracked receiver area", "create_replacement": true})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["scrapped"]["status"], "SCRAPPED");
    assert_eq!(body["data"]["scrapped"]["scrap"]["department"], "Layup");
    assert_eq!(body["data"]["replacement"]["replaces_order_id"], order_id.as_str());

    let (_, body) = app.send("GET", "/api/orders/pipeline-counts", None).await;
    assert_eq!(body["data"]["Layup"], 1);
    assert_eq!(body["data"]["CNC"], 0);
}
