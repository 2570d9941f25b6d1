//! Kickback Model
//!
//! A kickback is an audited reroute of an order to another department.
//! Records are append-only; only the status and its resolution metadata
//! change after creation.

use serde::{Deserialize, Serialize};

use super::department::Department;

/// Kickback reason code
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KickbackReason {
    MaterialDefect,
    OperatorError,
    MachineFailure,
    DesignIssue,
    QualityIssue,
    ProcessIssue,
    SupplierIssue,
    Other,
}

/// Kickback priority, ordered `Low < Medium < High < Critical`
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KickbackPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// Kickback status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KickbackStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl KickbackStatus {
    /// Open and in-progress kickbacks count towards severity
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }
}

/// Kickback audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kickback {
    pub id: i64,
    pub order_id: String,
    /// Department the order was in when kicked back
    pub from_department: Department,
    pub to_department: Department,
    pub reason_code: KickbackReason,
    pub reason_text: Option<String>,
    pub priority: KickbackPriority,
    pub reported_by: String,
    pub created_at: i64,
    pub status: KickbackStatus,
    pub resolved_at: Option<i64>,
    pub resolved_by: Option<String>,
    pub resolution_notes: Option<String>,
    pub root_cause: Option<String>,
    pub corrective_action: Option<String>,
}

/// Kickback request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KickbackCreate {
    pub to_department: Department,
    pub reason_code: KickbackReason,
    #[serde(default)]
    pub reason_text: Option<String>,
    #[serde(default)]
    pub priority: KickbackPriority,
    pub reported_by: String,
}

/// Kickback status update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KickbackStatusUpdate {
    pub status: KickbackStatus,
    #[serde(default)]
    pub resolved_by: Option<String>,
    #[serde(default)]
    pub resolution_notes: Option<String>,
    #[serde(default)]
    pub root_cause: Option<String>,
    #[serde(default)]
    pub corrective_action: Option<String>,
}

/// Highest priority among the open kickbacks, `None` if none are open
pub fn effective_severity<'a>(
    kickbacks: impl IntoIterator<Item = &'a Kickback>,
) -> Option<KickbackPriority> {
    kickbacks
        .into_iter()
        .filter(|k| k.status.is_open())
        .map(|k| k.priority)
        .max()
}
