//! Per-department work queue
//!
//! Orders in one department, grouped by stock model display name with the
//! material prefix removed, overdue work first. Also the floor-wide
//! per-department counts.

use serde::Serialize;
use shared::models::{Department, Kickback, KickbackPriority, Order, effective_severity};
use std::collections::{BTreeMap, HashMap};

use crate::catalog::CatalogIndex;

/// Leading material markers, stripped in this order
const MATERIAL_PREFIXES: [&str; 4] = ["CF", "FG", "M1A", "APR"];

/// Action brand removed wherever it first appears
const ACTION_MARKER: &str = "tikka";

/// One order in a queue group
#[derive(Debug, Clone, Serialize)]
pub struct QueueEntry {
    pub order: Order,
    pub is_overdue: bool,
    /// Highest open kickback priority
    pub severity: Option<KickbackPriority>,
}

/// Orders sharing a model name
#[derive(Debug, Clone, Serialize)]
pub struct QueueGroup {
    pub model_name: String,
    pub entries: Vec<QueueEntry>,
}

fn strip_leading_marker<'a>(name: &'a str, marker: &str) -> &'a str {
    let Some(head) = name.get(..marker.len()) else {
        return name;
    };
    let rest = &name[marker.len()..];
    if head.eq_ignore_ascii_case(marker) && rest.starts_with(char::is_whitespace) {
        rest.trim_start()
    } else {
        name
    }
}

fn strip_action_marker(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    let mut search_from = 0;
    while let Some(pos) = lower[search_from..].find(ACTION_MARKER) {
        let start = search_from + pos;
        let end = start + ACTION_MARKER.len();
        let spaces = name[end..]
            .chars()
            .take_while(|c| c.is_whitespace())
            .map(char::len_utf8)
            .sum::<usize>();
        if spaces > 0 {
            return format!("{}{}", &name[..start], &name[end + spaces..]);
        }
        search_from = end;
    }
    name.to_string()
}

/// Display name without material prefixes (`CF`, `FG`, `M1A`, `APR`, `Tikka`)
pub fn queue_model_name(display_name: &str) -> String {
    let name = MATERIAL_PREFIXES
        .iter()
        .fold(display_name.trim(), |name, marker| strip_leading_marker(name, marker));
    strip_action_marker(name)
}

/// Overdue first, then due date descending
fn queue_order(a: &QueueEntry, b: &QueueEntry) -> std::cmp::Ordering {
    b.is_overdue
        .cmp(&a.is_overdue)
        .then_with(|| b.order.due_date.cmp(&a.order.due_date))
        .then_with(|| a.order.order_id.cmp(&b.order.order_id))
}

/// Group `orders` into queue groups, sorted by model name
pub fn build_queue(
    orders: Vec<Order>,
    kickbacks: &[Kickback],
    catalog: &CatalogIndex,
    now: i64,
) -> Vec<QueueGroup> {
    let mut by_order: HashMap<&str, Vec<&Kickback>> = HashMap::new();
    for kickback in kickbacks {
        by_order
            .entry(kickback.order_id.as_str())
            .or_default()
            .push(kickback);
    }

    let mut groups: BTreeMap<String, Vec<QueueEntry>> = BTreeMap::new();
    for order in orders {
        let display_name = catalog
            .stock_model(&order.model_id)
            .map_or(order.model_id.as_str(), |m| m.display_name.as_str());
        let model_name = queue_model_name(display_name);
        let severity = by_order
            .get(order.order_id.as_str())
            .and_then(|records| effective_severity(records.iter().copied()));

        groups.entry(model_name).or_default().push(QueueEntry {
            is_overdue: order.is_overdue(now),
            severity,
            order,
        });
    }

    groups
        .into_iter()
        .map(|(model_name, mut entries)| {
            entries.sort_by(queue_order);
            QueueGroup {
                model_name,
                entries,
            }
        })
        .collect()
}

/// Live orders per production department; empty departments count zero
pub fn pipeline_counts<'a>(
    orders: impl IntoIterator<Item = &'a Order>,
) -> BTreeMap<Department, usize> {
    let mut counts: BTreeMap<Department, usize> = Department::PIPELINE
        .iter()
        .filter(|d| !d.is_terminal())
        .map(|d| (*d, 0))
        .collect();
    for order in orders {
        if order.status.is_terminal() {
            continue;
        }
        if let Some(count) = order.current_department.and_then(|d| counts.get_mut(&d)) {
            *count += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_model_name_strips_prefixes() {
        assert_eq!(queue_model_name("CF Alpine Hunter"), "Alpine Hunter");
        assert_eq!(queue_model_name("fg Ferrata"), "Ferrata");
        assert_eq!(queue_model_name("M1A Sportsman"), "Sportsman");
        assert_eq!(queue_model_name("APR Tikka Hunter"), "Hunter");
        assert_eq!(queue_model_name("CF Tikka Alpine"), "Alpine");
        assert_eq!(queue_model_name("CFR Chalk"), "CFR Chalk");
        assert_eq!(queue_model_name("Armor"), "Armor");
    }

    #[test]
    fn test_queue_model_name_keeps_embedded_words() {
        assert_eq!(queue_model_name("Tikkanen"), "Tikkanen");
        assert_eq!(queue_model_name("CF"), "CF");
    }
}
