//! Kickback analytics

use serde::{Deserialize, Serialize};
use shared::models::{Department, Kickback, KickbackPriority, KickbackReason, KickbackStatus};
use std::collections::{BTreeMap, HashMap};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Optional `created_at` window, both ends inclusive
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl DateRange {
    pub fn contains(&self, timestamp: i64) -> bool {
        self.start.is_none_or(|s| timestamp >= s) && self.end.is_none_or(|e| timestamp <= e)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KickbackAnalytics {
    pub total_kickbacks: u64,
    /// Counted by the department the kickback came from
    pub by_department: BTreeMap<Department, u64>,
    pub by_reason_code: HashMap<KickbackReason, u64>,
    pub by_status: HashMap<KickbackStatus, u64>,
    pub by_priority: BTreeMap<KickbackPriority, u64>,
    /// Resolved or closed
    pub resolved_kickbacks: u64,
    pub average_resolution_days: Option<f64>,
}

pub fn kickback_analytics<'a>(
    kickbacks: impl IntoIterator<Item = &'a Kickback>,
    range: DateRange,
) -> KickbackAnalytics {
    let mut analytics = KickbackAnalytics::default();
    let mut resolution_total: i64 = 0;
    let mut resolution_count: u32 = 0;

    for kickback in kickbacks.into_iter().filter(|k| range.contains(k.created_at)) {
        analytics.total_kickbacks += 1;
        *analytics
            .by_department
            .entry(kickback.from_department)
            .or_default() += 1;
        *analytics
            .by_reason_code
            .entry(kickback.reason_code)
            .or_default() += 1;
        *analytics.by_status.entry(kickback.status).or_default() += 1;
        *analytics.by_priority.entry(kickback.priority).or_default() += 1;

        if !kickback.status.is_open() {
            analytics.resolved_kickbacks += 1;
            if let Some(resolved_at) = kickback.resolved_at {
                resolution_total += resolved_at - kickback.created_at;
                resolution_count += 1;
            }
        }
    }

    if resolution_count > 0 {
        analytics.average_resolution_days =
            Some(resolution_total as f64 / f64::from(resolution_count) / MILLIS_PER_DAY);
    }
    analytics
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400_000;

    fn kickback(
        from: Department,
        priority: KickbackPriority,
        status: KickbackStatus,
        created_at: i64,
        resolved_at: Option<i64>,
    ) -> Kickback {
        Kickback {
            id: created_at,
            order_id: "AG001".to_string(),
            from_department: from,
            to_department: Department::Layup,
            reason_code: KickbackReason::OperatorError,
            reason_text: None,
            priority,
            reported_by: "lead".to_string(),
            created_at,
            status,
            resolved_at,
            resolved_by: None,
            resolution_notes: None,
            root_cause: None,
            corrective_action: None,
        }
    }

    fn sample() -> Vec<Kickback> {
        vec![
            kickback(Department::Cnc, KickbackPriority::High, KickbackStatus::Open, 0, None),
            kickback(Department::Cnc, KickbackPriority::Low, KickbackStatus::Resolved, DAY, Some(3 * DAY)),
            kickback(Department::Paint, KickbackPriority::High, KickbackStatus::Closed, 2 * DAY, Some(6 * DAY)),
            kickback(Department::Qc, KickbackPriority::Critical, KickbackStatus::Closed, 10 * DAY, None),
        ]
    }

    #[test]
    fn test_counts_and_average() {
        let records = sample();
        let analytics = kickback_analytics(&records, DateRange::default());

        assert_eq!(analytics.total_kickbacks, 4);
        assert_eq!(analytics.by_department.get(&Department::Cnc), Some(&2));
        assert_eq!(analytics.by_priority.get(&KickbackPriority::High), Some(&2));
        assert_eq!(analytics.by_status.get(&KickbackStatus::Closed), Some(&2));
        assert_eq!(analytics.by_reason_code.get(&KickbackReason::OperatorError), Some(&4));
        assert_eq!(analytics.resolved_kickbacks, 3);
        // (2 + 4) / 2, the closed record without a timestamp is not averaged
        assert_eq!(analytics.average_resolution_days, Some(3.0));
    }

    #[test]
    fn test_date_range_filter() {
        let records = sample();
        let range = DateRange {
            start: Some(DAY),
            end: Some(2 * DAY),
        };
        let analytics = kickback_analytics(&records, range);
        assert_eq!(analytics.total_kickbacks, 2);
        assert_eq!(analytics.by_department.get(&Department::Qc), None);
    }

    #[test]
    fn test_empty_has_no_average() {
        let analytics = kickback_analytics(&Vec::<Kickback>::new(), DateRange::default());
        assert_eq!(analytics.total_kickbacks, 0);
        assert_eq!(analytics.average_resolution_days, None);
    }
}
