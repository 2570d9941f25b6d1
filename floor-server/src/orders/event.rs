//! Lifecycle events broadcast after each committed change

use serde::{Deserialize, Serialize};
use shared::models::{Department, Order, OrderStatus};

/// What happened to the order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleAction {
    Created,
    Updated,
    Confirmed,
    Finalized,
    Progressed { from: Department, to: Department },
    KickedBack { kickback_id: i64, from: Department, to: Department },
    Cancelled,
    CancelUndone,
    Shipped,
    Scrapped { department: Department, replacement_order_id: Option<String> },
    ReplacementCreated { replaces_order_id: String },
    Deleted,
}

impl LifecycleAction {
    /// Name used in audit records
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created => "order_created",
            Self::Updated => "order_updated",
            Self::Confirmed => "order_confirmed",
            Self::Finalized => "order_finalized",
            Self::Progressed { .. } => "order_progressed",
            Self::KickedBack { .. } => "order_kicked_back",
            Self::Cancelled => "order_cancelled",
            Self::CancelUndone => "order_cancel_undone",
            Self::Shipped => "order_shipped",
            Self::Scrapped { .. } => "order_scrapped",
            Self::ReplacementCreated { .. } => "order_replacement_created",
            Self::Deleted => "order_deleted",
        }
    }
}

/// Event published on the manager's broadcast channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub order_id: String,
    pub action: LifecycleAction,
    /// Status after the change
    pub status: OrderStatus,
    /// Department after the change
    pub department: Option<Department>,
    pub timestamp: i64,
}

impl LifecycleEvent {
    pub fn new(order: &Order, action: LifecycleAction, timestamp: i64) -> Self {
        Self {
            order_id: order.order_id.clone(),
            action,
            status: order.status,
            department: order.current_department,
            timestamp,
        }
    }
}
