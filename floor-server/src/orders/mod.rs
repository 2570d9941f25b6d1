//! Order lifecycle
//!
//! - **workflow**: pure department transitions on an [`Order`](shared::models::Order)
//! - **storage**: redb persistence for orders, kickbacks and the id sequence
//! - **manager**: transactional operations, audit logging, event broadcast
//! - **queue**: per-department work view and pipeline counts
//! - **analytics**: kickback statistics
//!
//! # Architecture
//!
//! ```text
//! Request → OrdersManager → workflow transition → Storage (redb, one txn)
//!                 ↓
//!          LifecycleEvent broadcast → subscribers
//! ```

pub mod analytics;
pub mod event;
pub mod manager;
pub mod queue;
pub mod storage;
pub mod workflow;

// Re-exports
pub use analytics::{DateRange, KickbackAnalytics};
pub use event::{LifecycleAction, LifecycleEvent};
pub use manager::{
    KickbackFilter, ManagerError, ManagerResult, OrdersManager, ProgressOutcome, ScrapOutcome,
};
pub use queue::{QueueEntry, QueueGroup};
pub use storage::{OrderStorage, StorageError};
pub use workflow::WorkflowError;
