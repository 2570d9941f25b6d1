//! OrdersManager - order persistence, transitions and event broadcast
//!
//! Every mutating operation runs in a single redb write transaction:
//!
//! ```text
//! operation(order_id, ..)
//!     ├─ 1. Validate input (before any state change)
//!     ├─ 2. Begin write transaction
//!     ├─ 3. Load order (NotFound if missing)
//!     ├─ 4. Apply workflow transition (Conflict if ineligible)
//!     ├─ 5. Persist order (+ kickback record, + id allocation)
//!     ├─ 6. Commit transaction
//!     ├─ 7. Audit log + broadcast LifecycleEvent
//!     └─ 8. Return updated order
//! ```
//!
//! Batch progress commits per order; one failure never rolls back its
//! siblings.

mod error;
pub use error::*;

use super::analytics::{DateRange, KickbackAnalytics, kickback_analytics};
use super::event::{LifecycleAction, LifecycleEvent};
use super::queue::{QueueGroup, build_queue, pipeline_counts};
use super::storage::{OrderStorage, StorageError};
use super::workflow;
use crate::catalog::CatalogService;
use crate::pricing::PriceEngine;
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_NOTE_LEN, MAX_QUANTITY, MAX_SHORT_TEXT_LEN, validate_money,
    validate_optional_text, validate_required_text,
};
use chrono::Utc;
use redb::WriteTransaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    CustomDiscountType, Department, DiscountSelection, Kickback, KickbackCreate, KickbackPriority,
    KickbackStatus, KickbackStatusUpdate, Order, OrderDraft, OrderFilter, OrderStatus,
    ScrapRequest, effective_severity,
};
use shared::order_id::is_valid_order_id;
use shared::util::snowflake_id;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Default event broadcast channel capacity
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Per-order result of a batch progress
#[derive(Debug, Clone, Serialize)]
pub struct ProgressOutcome {
    pub order_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of scrapping an order
#[derive(Debug, Clone, Serialize)]
pub struct ScrapOutcome {
    pub scrapped: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<Order>,
}

/// Kickback list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KickbackFilter {
    pub order_id: Option<String>,
    pub status: Option<KickbackStatus>,
    /// Department the kickback came from
    pub department: Option<Department>,
}

impl KickbackFilter {
    pub fn matches(&self, kickback: &Kickback) -> bool {
        self.order_id
            .as_deref()
            .is_none_or(|id| kickback.order_id == id)
            && self.status.is_none_or(|s| kickback.status == s)
            && self
                .department
                .is_none_or(|d| kickback.from_department == d)
    }
}

/// OrdersManager for the order lifecycle
pub struct OrdersManager {
    storage: OrderStorage,
    catalog: Arc<CatalogService>,
    event_tx: broadcast::Sender<LifecycleEvent>,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("storage", &"<OrderStorage>")
            .field("event_tx", &"<broadcast::Sender>")
            .finish()
    }
}

impl OrdersManager {
    /// Create a new OrdersManager with the given database path
    pub fn new(
        db_path: impl AsRef<Path>,
        catalog: Arc<CatalogService>,
        event_capacity: usize,
    ) -> ManagerResult<Self> {
        let storage = OrderStorage::open(db_path)?;
        Ok(Self::with_storage(storage, catalog, event_capacity))
    }

    /// Create an OrdersManager over existing storage
    pub fn with_storage(
        storage: OrderStorage,
        catalog: Arc<CatalogService>,
        event_capacity: usize,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(event_capacity.max(1));
        Self {
            storage,
            catalog,
            event_tx,
        }
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.event_tx.subscribe()
    }

    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    fn publish(&self, event: LifecycleEvent) {
        // Nobody listening is normal; notification is fire-and-forget
        if self.event_tx.send(event).is_err() {
            tracing::trace!("No lifecycle event subscribers");
        }
    }

    fn record(&self, operator: &str, order: &Order, action: LifecycleAction, now: i64) {
        let details = match &action {
            LifecycleAction::Progressed { from, to } => format!("{from} -> {to}"),
            LifecycleAction::KickedBack {
                kickback_id,
                from,
                to,
            } => format!("{from} -> {to} (kickback {kickback_id})"),
            _ => format!("{:?}", order.status),
        };
        crate::audit_log!(operator, action.name(), order.order_id.as_str(), details.as_str());
        self.publish(LifecycleEvent::new(order, action, now));
    }

    // ========== Queries ==========

    pub fn get_order(&self, order_id: &str) -> ManagerResult<Order> {
        self.storage
            .get_order(order_id)?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))
    }

    /// Orders matching `filter`, newest id first
    pub fn list_orders(&self, filter: &OrderFilter) -> ManagerResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .storage
            .get_all_orders()?
            .into_iter()
            .filter(|o| filter.matches(o))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.order_id.cmp(&a.order_id)));
        Ok(orders)
    }

    /// Id the next first save would receive (not reserved)
    pub fn preview_next_order_id(&self) -> ManagerResult<String> {
        let last = self.storage.last_order_id()?.unwrap_or_default();
        Ok(shared::order_id::next_order_id(&Utc::now(), &last))
    }

    // ========== Draft ==========

    /// Insert a new order (allocating its id) or update an editable one
    pub fn save_draft(&self, draft: OrderDraft, operator: &str) -> ManagerResult<Order> {
        validate_draft(&draft)?;
        let catalog = self.catalog.snapshot();
        catalog.validate_selection(&draft.model_id, &draft.features, &draft.discount)?;

        let clock = Utc::now();
        let now = clock.timestamp_millis();
        let pricing = PriceEngine::new(catalog).quote(&draft, now);

        let txn = self.storage.begin_write()?;
        let (order, action) = match &draft.order_id {
            None => {
                let order_id = self.storage.allocate_order_id(&txn, &clock)?;
                let order = Order {
                    order_id,
                    customer_id: draft.customer_id,
                    model_id: draft.model_id,
                    features: draft.features,
                    price_override: draft.price_override,
                    discount: draft.discount,
                    misc_items: draft.misc_items,
                    status: OrderStatus::Draft,
                    current_department: None,
                    is_flattop: draft.is_flattop,
                    order_date: draft.order_date.unwrap_or(now),
                    due_date: draft.due_date,
                    notes: draft.notes,
                    pricing: Some(pricing),
                    department_completed_at: Default::default(),
                    finalized_at: None,
                    shipped_at: None,
                    cancelled_at: None,
                    cancel_reason: None,
                    pre_cancel_status: None,
                    pre_cancel_department: None,
                    scrap: None,
                    replaces_order_id: None,
                    created_at: now,
                    updated_at: now,
                };
                (order, LifecycleAction::Created)
            }
            Some(order_id) => {
                let mut order = self
                    .storage
                    .get_order_txn(&txn, order_id)?
                    .ok_or_else(|| ManagerError::OrderNotFound(order_id.clone()))?;
                if order.status.is_terminal() {
                    return Err(workflow::WorkflowError::Terminal {
                        order_id: order.order_id,
                        status: order.status,
                    }
                    .into());
                }
                if !order.status.is_editable() {
                    return Err(ManagerError::NotEditable(order.order_id));
                }

                order.customer_id = draft.customer_id;
                order.model_id = draft.model_id;
                order.features = draft.features;
                order.price_override = draft.price_override;
                order.discount = draft.discount;
                order.misc_items = draft.misc_items;
                order.is_flattop = draft.is_flattop;
                if let Some(order_date) = draft.order_date {
                    order.order_date = order_date;
                }
                order.due_date = draft.due_date;
                order.notes = draft.notes;
                order.pricing = Some(pricing);
                order.updated_at = now;
                (order, LifecycleAction::Updated)
            }
        };

        self.storage.store_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::debug!(order_id = %order.order_id, total = %order.pricing.as_ref().map_or(Decimal::ZERO, |p| p.total), "Draft saved");
        self.record(operator, &order, action, now);
        Ok(order)
    }

    // ========== Transitions ==========

    /// Load, transform and persist one order in a single transaction
    fn apply<R>(
        &self,
        order_id: &str,
        f: impl FnOnce(&WriteTransaction, &mut Order, i64) -> ManagerResult<R>,
    ) -> ManagerResult<(Order, R, i64)> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))?;

        let now = Utc::now().timestamp_millis();
        let result = f(&txn, &mut order, now)?;

        self.storage.store_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;
        Ok((order, result, now))
    }

    pub fn confirm(&self, order_id: &str, operator: &str) -> ManagerResult<Order> {
        let (order, _, now) =
            self.apply(order_id, |_, order, now| Ok(workflow::confirm(order, now)?))?;
        self.record(operator, &order, LifecycleAction::Confirmed, now);
        Ok(order)
    }

    pub fn finalize(&self, order_id: &str, operator: &str) -> ManagerResult<Order> {
        let (order, _, now) =
            self.apply(order_id, |_, order, now| Ok(workflow::finalize(order, now)?))?;
        self.record(operator, &order, LifecycleAction::Finalized, now);
        Ok(order)
    }

    fn progress_one(&self, order_id: &str, to: Department, operator: &str) -> ManagerResult<Order> {
        let (order, from, now) = self.apply(order_id, |_, order, now| {
            Ok(workflow::progress(order, to, now)?)
        })?;
        let action = if order.status == OrderStatus::Shipped {
            LifecycleAction::Shipped
        } else {
            LifecycleAction::Progressed { from, to }
        };
        self.record(operator, &order, action, now);
        Ok(order)
    }

    /// Move each order to `to`; every order commits or fails on its own
    pub fn progress(
        &self,
        order_ids: &[String],
        to: Department,
        operator: &str,
    ) -> Vec<ProgressOutcome> {
        order_ids
            .iter()
            .map(|order_id| match self.progress_one(order_id, to, operator) {
                Ok(order) => ProgressOutcome {
                    order_id: order_id.clone(),
                    success: true,
                    order: Some(order),
                    code: None,
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(order_id = %order_id, to = %to, error = %e, "Progress failed");
                    ProgressOutcome {
                        order_id: order_id.clone(),
                        success: false,
                        order: None,
                        code: Some(e.error_code()),
                        error: Some(e.to_string()),
                    }
                }
            })
            .collect()
    }

    /// Progress to the pipeline successor
    pub fn advance(&self, order_id: &str, operator: &str) -> ManagerResult<Order> {
        let (order, (from, to), now) =
            self.apply(order_id, |_, order, now| Ok(workflow::advance(order, now)?))?;
        let action = if order.status == OrderStatus::Shipped {
            LifecycleAction::Shipped
        } else {
            LifecycleAction::Progressed { from, to }
        };
        self.record(operator, &order, action, now);
        Ok(order)
    }

    /// Reroute an order; the kickback record and the order commit together
    pub fn kickback(
        &self,
        order_id: &str,
        request: &KickbackCreate,
    ) -> ManagerResult<(Kickback, Order)> {
        validate_required_text(&request.reported_by, "reported_by", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&request.reason_text, "reason_text", MAX_NOTE_LEN)?;

        let (order, kickback, now) = self.apply(order_id, |txn, order, now| {
            let mut kickback_id = snowflake_id();
            while self.storage.kickback_exists(txn, kickback_id)? {
                kickback_id = snowflake_id();
            }
            let kickback = workflow::kickback(order, request, kickback_id, now)?;
            self.storage.insert_kickback(txn, &kickback)?;
            Ok(kickback)
        })?;

        tracing::info!(
            order_id = %order.order_id,
            kickback_id = kickback.id,
            from = %kickback.from_department,
            to = %kickback.to_department,
            priority = ?kickback.priority,
            "Order kicked back"
        );
        self.record(
            &request.reported_by,
            &order,
            LifecycleAction::KickedBack {
                kickback_id: kickback.id,
                from: kickback.from_department,
                to: kickback.to_department,
            },
            now,
        );
        Ok((kickback, order))
    }

    pub fn cancel(
        &self,
        order_id: &str,
        reason: Option<String>,
        operator: &str,
    ) -> ManagerResult<Order> {
        validate_optional_text(&reason, "reason", MAX_NOTE_LEN)?;
        let (order, _, now) = self.apply(order_id, |_, order, now| {
            Ok(workflow::cancel(order, reason, now)?)
        })?;
        self.record(operator, &order, LifecycleAction::Cancelled, now);
        Ok(order)
    }

    pub fn undo_cancel(&self, order_id: &str, operator: &str) -> ManagerResult<Order> {
        let (order, _, now) =
            self.apply(order_id, |_, order, now| Ok(workflow::undo_cancel(order, now)?))?;
        self.record(operator, &order, LifecycleAction::CancelUndone, now);
        Ok(order)
    }

    pub fn ship(&self, order_id: &str, operator: &str) -> ManagerResult<Order> {
        let (order, _, now) =
            self.apply(order_id, |_, order, now| Ok(workflow::ship(order, now)?))?;
        self.record(operator, &order, LifecycleAction::Shipped, now);
        Ok(order)
    }

    /// Remove a Draft or Confirmed order; its id is not reissued
    pub fn delete_draft(&self, order_id: &str, operator: &str) -> ManagerResult<Order> {
        let txn = self.storage.begin_write()?;
        let order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))?;
        workflow::ensure_deletable(&order)?;
        self.storage.delete_order(&txn, order_id)?;
        txn.commit().map_err(StorageError::from)?;

        self.record(operator, &order, LifecycleAction::Deleted, Utc::now().timestamp_millis());
        Ok(order)
    }

    /// Scrap a floor order, optionally opening its replacement in the same
    /// transaction
    pub fn scrap(
        &self,
        order_id: &str,
        request: &ScrapRequest,
        operator: &str,
    ) -> ManagerResult<ScrapOutcome> {
        validate_required_text(&request.reason, "reason", MAX_NOTE_LEN)?;
        validate_optional_text(&request.disposition, "disposition", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&request.authorized_by, "authorized_by", MAX_SHORT_TEXT_LEN)?;

        let (scrapped, (department, replacement), now) =
            self.apply(order_id, |txn, order, now| {
                let department = workflow::scrap(order, request, now)?;
                if !request.create_replacement {
                    return Ok((department, None));
                }
                let replacement_id = self.storage.allocate_order_id(txn, &Utc::now())?;
                let replacement = workflow::replacement(order, replacement_id, now)?;
                self.storage.store_order(txn, &replacement)?;
                Ok((department, Some(replacement)))
            })?;

        tracing::info!(
            order_id = %scrapped.order_id,
            department = %department,
            replacement = ?replacement.as_ref().map(|o| o.order_id.as_str()),
            "Order scrapped"
        );
        self.record(
            operator,
            &scrapped,
            LifecycleAction::Scrapped {
                department,
                replacement_order_id: replacement.as_ref().map(|o| o.order_id.clone()),
            },
            now,
        );
        if let Some(replacement) = &replacement {
            self.record(
                operator,
                replacement,
                LifecycleAction::ReplacementCreated {
                    replaces_order_id: scrapped.order_id.clone(),
                },
                now,
            );
        }

        Ok(ScrapOutcome {
            scrapped,
            replacement,
        })
    }

    // ========== Kickbacks ==========

    /// Kickbacks matching `filter`, oldest first
    pub fn list_kickbacks(&self, filter: &KickbackFilter) -> ManagerResult<Vec<Kickback>> {
        let records = match &filter.order_id {
            Some(order_id) => self.storage.get_kickbacks_for_order(order_id)?,
            None => self.storage.get_all_kickbacks()?,
        };
        Ok(records.into_iter().filter(|k| filter.matches(k)).collect())
    }

    /// Change a kickback's status; the rest of the record is immutable
    pub fn update_kickback_status(
        &self,
        kickback_id: i64,
        update: &KickbackStatusUpdate,
        operator: &str,
    ) -> ManagerResult<Kickback> {
        validate_optional_text(&update.resolved_by, "resolved_by", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&update.resolution_notes, "resolution_notes", MAX_NOTE_LEN)?;
        validate_optional_text(&update.root_cause, "root_cause", MAX_NOTE_LEN)?;
        validate_optional_text(&update.corrective_action, "corrective_action", MAX_NOTE_LEN)?;

        let txn = self.storage.begin_write()?;
        let mut kickback = self
            .storage
            .get_kickback_txn(&txn, kickback_id)?
            .ok_or(ManagerError::KickbackNotFound(kickback_id))?;

        let now = Utc::now().timestamp_millis();
        workflow::update_kickback_status(&mut kickback, update, now);
        self.storage.update_kickback(&txn, &kickback)?;
        txn.commit().map_err(StorageError::from)?;

        let details = format!("kickback {kickback_id} -> {:?}", kickback.status);
        crate::audit_log!(
            operator,
            "kickback_status_updated",
            kickback.order_id.as_str(),
            details.as_str()
        );
        Ok(kickback)
    }

    /// Highest priority among the order's open kickbacks
    pub fn severity(&self, order_id: &str) -> ManagerResult<Option<KickbackPriority>> {
        self.get_order(order_id)?;
        let records = self.storage.get_kickbacks_for_order(order_id)?;
        Ok(effective_severity(&records))
    }

    pub fn kickback_analytics(&self, range: DateRange) -> ManagerResult<KickbackAnalytics> {
        let records = self.storage.get_all_kickbacks()?;
        Ok(kickback_analytics(&records, range))
    }

    // ========== Department view ==========

    /// Live order count for every production department
    pub fn pipeline_counts(&self) -> ManagerResult<BTreeMap<Department, usize>> {
        let orders = self.storage.get_all_orders()?;
        Ok(pipeline_counts(&orders))
    }

    /// Orders currently in `department`, grouped for the floor
    pub fn department_queue(&self, department: Department) -> ManagerResult<Vec<QueueGroup>> {
        let filter = OrderFilter {
            status: None,
            department: Some(department),
        };
        let orders = self.list_orders(&filter)?;
        let kickbacks = self.storage.get_all_kickbacks()?;
        let catalog = self.catalog.snapshot();
        Ok(build_queue(
            orders,
            &kickbacks,
            &catalog,
            Utc::now().timestamp_millis(),
        ))
    }
}

/// Field checks run before any state change
fn validate_draft(draft: &OrderDraft) -> Result<(), AppError> {
    validate_required_text(&draft.customer_id, "customer_id", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&draft.model_id, "model_id", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&draft.notes, "notes", MAX_NOTE_LEN)?;

    if let Some(order_id) = &draft.order_id
        && !is_valid_order_id(order_id)
    {
        return Err(AppError::with_message(
            ErrorCode::OrderIdInvalid,
            format!("Malformed order id: {order_id}"),
        )
        .with_detail("field", "order_id"));
    }

    if let Some(price) = draft.price_override {
        validate_money(price, "price_override")?;
    }

    if let DiscountSelection::Custom { custom_type, value } = &draft.discount {
        validate_money(*value, "discount")?;
        if *custom_type == CustomDiscountType::Percent && *value > Decimal::ONE_HUNDRED {
            return Err(AppError::out_of_range(
                "discount",
                format!("custom discount percent {value} is over 100"),
            ));
        }
    }

    for (i, item) in draft.misc_items.iter().enumerate() {
        let field = format!("misc_items[{i}]");
        validate_required_text(&item.description, &field, MAX_DESCRIPTION_LEN)?;
        if !(0..=MAX_QUANTITY).contains(&item.quantity) {
            return Err(AppError::out_of_range(
                format!("{field}.quantity"),
                format!("{field}: quantity must be between 0 and {MAX_QUANTITY}"),
            ));
        }
        validate_money(item.unit_price, &format!("{field}.unit_price"))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests;
