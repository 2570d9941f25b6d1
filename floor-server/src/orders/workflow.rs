//! Department workflow transitions
//!
//! Every function here mutates an [`Order`] in memory and either succeeds
//! completely or leaves the order untouched. Persistence, id allocation and
//! event broadcast live in the manager.

use shared::models::{
    Department, Kickback, KickbackCreate, KickbackStatus, KickbackStatusUpdate, Order,
    OrderStatus, ScrapRecord, ScrapRequest,
};
use thiserror::Error;

/// Transition errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Order {order_id} is {status:?} and can no longer change")]
    Terminal { order_id: String, status: OrderStatus },

    #[error("Order {order_id}: {message}")]
    InvalidTransition { order_id: String, message: String },

    #[error("Order {0} is not on the production floor")]
    NotOnFloor(String),

    #[error("Kickback target {0} is not a production department")]
    KickbackTarget(Department),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

fn ensure_not_terminal(order: &Order) -> WorkflowResult<()> {
    if order.status.is_terminal() {
        return Err(WorkflowError::Terminal {
            order_id: order.order_id.clone(),
            status: order.status,
        });
    }
    Ok(())
}

fn ensure_on_floor(order: &Order) -> WorkflowResult<Department> {
    ensure_not_terminal(order)?;
    order
        .current_department
        .ok_or_else(|| WorkflowError::NotOnFloor(order.order_id.clone()))
}

fn invalid(order: &Order, message: impl Into<String>) -> WorkflowError {
    WorkflowError::InvalidTransition {
        order_id: order.order_id.clone(),
        message: message.into(),
    }
}

/// `Draft → Confirmed`
pub fn confirm(order: &mut Order, now: i64) -> WorkflowResult<()> {
    ensure_not_terminal(order)?;
    if order.status != OrderStatus::Draft {
        return Err(invalid(order, format!("cannot confirm from {:?}", order.status)));
    }
    order.status = OrderStatus::Confirmed;
    order.updated_at = now;
    Ok(())
}

/// `Confirmed → Finalized`, entering Layup
pub fn finalize(order: &mut Order, now: i64) -> WorkflowResult<()> {
    ensure_not_terminal(order)?;
    if order.status != OrderStatus::Confirmed {
        return Err(invalid(order, format!("cannot finalize from {:?}", order.status)));
    }
    order.status = OrderStatus::Finalized;
    order.current_department = Some(Department::Layup);
    order.finalized_at = Some(now);
    order.updated_at = now;
    Ok(())
}

/// Move an order on the floor to `to`
///
/// Adjacency is not enforced. Targeting `Shipped` ships the order and is
/// subject to the same rules as [`ship`]. Returns the department left.
pub fn progress(order: &mut Order, to: Department, now: i64) -> WorkflowResult<Department> {
    let from = ensure_on_floor(order)?;
    if to == Department::Shipped {
        ship(order, now)?;
        return Ok(from);
    }
    order.department_completed_at.insert(from, now);
    order.current_department = Some(to);
    order.updated_at = now;
    Ok(from)
}

/// Pipeline successor of the current department
///
/// Flat-top stocks have no CNC stage.
pub fn next_department(order: &Order) -> Option<Department> {
    let next = order.current_department?.successor()?;
    if next == Department::Cnc && order.is_flattop {
        return next.successor();
    }
    Some(next)
}

/// Progress to the pipeline successor; returns `(from, to)`
pub fn advance(order: &mut Order, now: i64) -> WorkflowResult<(Department, Department)> {
    ensure_on_floor(order)?;
    let to = next_department(order)
        .ok_or_else(|| invalid(order, "no further department in the pipeline"))?;
    let from = progress(order, to, now)?;
    Ok((from, to))
}

/// Reroute an order and build its audit record
///
/// The target may be any production department, earlier or later.
pub fn kickback(
    order: &mut Order,
    request: &KickbackCreate,
    kickback_id: i64,
    now: i64,
) -> WorkflowResult<Kickback> {
    let from = ensure_on_floor(order)?;
    if request.to_department.is_terminal() {
        return Err(WorkflowError::KickbackTarget(request.to_department));
    }

    order.current_department = Some(request.to_department);
    order.updated_at = now;

    Ok(Kickback {
        id: kickback_id,
        order_id: order.order_id.clone(),
        from_department: from,
        to_department: request.to_department,
        reason_code: request.reason_code,
        reason_text: request.reason_text.clone(),
        priority: request.priority,
        reported_by: request.reported_by.clone(),
        created_at: now,
        status: KickbackStatus::Open,
        resolved_at: None,
        resolved_by: None,
        resolution_notes: None,
        root_cause: None,
        corrective_action: None,
    })
}

/// Any non-terminal status → Cancelled, remembering where the order was
pub fn cancel(order: &mut Order, reason: Option<String>, now: i64) -> WorkflowResult<()> {
    ensure_not_terminal(order)?;
    order.pre_cancel_status = Some(order.status);
    order.pre_cancel_department = order.current_department.take();
    order.status = OrderStatus::Cancelled;
    order.cancelled_at = Some(now);
    order.cancel_reason = reason;
    order.updated_at = now;
    Ok(())
}

/// Cancelled → the status and department held before cancelling
pub fn undo_cancel(order: &mut Order, now: i64) -> WorkflowResult<()> {
    if order.status != OrderStatus::Cancelled {
        return Err(invalid(order, "order is not cancelled"));
    }

    let department = order.pre_cancel_department.take();
    // Records written without a saved status fall back on the department
    let status = order.pre_cancel_status.take().unwrap_or(if department.is_some() {
        OrderStatus::Finalized
    } else {
        OrderStatus::Draft
    });

    order.status = status;
    order.current_department = department;
    order.cancelled_at = None;
    order.cancel_reason = None;
    order.updated_at = now;
    Ok(())
}

/// `QC | Shipping → Shipped`
pub fn ship(order: &mut Order, now: i64) -> WorkflowResult<()> {
    let from = ensure_on_floor(order)?;
    if !from.can_ship_from() {
        return Err(invalid(order, format!("cannot ship from {from}")));
    }
    order.department_completed_at.insert(from, now);
    order.status = OrderStatus::Shipped;
    order.current_department = None;
    order.shipped_at = Some(now);
    order.updated_at = now;
    Ok(())
}

/// Only orders that never reached the floor may be deleted
pub fn ensure_deletable(order: &Order) -> WorkflowResult<()> {
    ensure_not_terminal(order)?;
    if !order.status.is_editable() {
        return Err(invalid(order, format!("cannot delete a {:?} order", order.status)));
    }
    Ok(())
}

/// Floor order → Scrapped; returns the department it was scrapped in
pub fn scrap(order: &mut Order, request: &ScrapRequest, now: i64) -> WorkflowResult<Department> {
    let from = ensure_on_floor(order)?;
    order.scrap = Some(ScrapRecord {
        reason: request.reason.clone(),
        disposition: request.disposition.clone(),
        authorized_by: request.authorized_by.clone(),
        department: from,
        scrapped_at: now,
        replacement_order_id: None,
    });
    order.status = OrderStatus::Scrapped;
    order.current_department = None;
    order.updated_at = now;
    Ok(from)
}

/// Build the replacement for a scrapped order and link the two
///
/// The replacement keeps the configuration, price and due date, and starts
/// over in Layup.
pub fn replacement(scrapped: &mut Order, order_id: String, now: i64) -> WorkflowResult<Order> {
    let Some(record) = scrapped.scrap.as_mut() else {
        return Err(invalid(scrapped, "order is not scrapped"));
    };
    record.replacement_order_id = Some(order_id.clone());

    Ok(Order {
        order_id,
        customer_id: scrapped.customer_id.clone(),
        model_id: scrapped.model_id.clone(),
        features: scrapped.features.clone(),
        price_override: scrapped.price_override,
        discount: scrapped.discount.clone(),
        misc_items: scrapped.misc_items.clone(),
        status: OrderStatus::Finalized,
        current_department: Some(Department::Layup),
        is_flattop: scrapped.is_flattop,
        order_date: now,
        due_date: scrapped.due_date,
        notes: scrapped.notes.clone(),
        pricing: scrapped.pricing.clone(),
        department_completed_at: Default::default(),
        finalized_at: Some(now),
        shipped_at: None,
        cancelled_at: None,
        cancel_reason: None,
        pre_cancel_status: None,
        pre_cancel_department: None,
        scrap: None,
        replaces_order_id: Some(scrapped.order_id.clone()),
        created_at: now,
        updated_at: now,
    })
}

/// Apply a status change to a kickback record
///
/// Resolution metadata is only written when the record is resolved or closed.
pub fn update_kickback_status(kickback: &mut Kickback, update: &KickbackStatusUpdate, now: i64) {
    kickback.status = update.status;
    if update.status.is_open() {
        return;
    }

    kickback.resolved_at.get_or_insert(now);
    if update.resolved_by.is_some() {
        kickback.resolved_by = update.resolved_by.clone();
    }
    if update.resolution_notes.is_some() {
        kickback.resolution_notes = update.resolution_notes.clone();
    }
    if update.root_cause.is_some() {
        kickback.root_cause = update.root_cause.clone();
    }
    if update.corrective_action.is_some() {
        kickback.corrective_action = update.corrective_action.clone();
    }
}
