use super::*;

#[test]
fn test_kickback_creates_one_record_and_moves_order() {
    let manager = create_test_manager();
    let order = order_in(&manager, Department::Cnc);

    let (kickback, updated) = manager
        .kickback(
            &order.order_id,
            &kickback_request(Department::Layup, KickbackPriority::High),
        )
        .unwrap();

    assert_eq!(kickback.from_department, Department::Cnc);
    assert_eq!(kickback.to_department, Department::Layup);
    assert_eq!(kickback.status, KickbackStatus::Open);
    assert_eq!(updated.current_department, Some(Department::Layup));

    let records = manager
        .list_kickbacks(&KickbackFilter {
            order_id: Some(order.order_id.clone()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, kickback.id);
    assert_eq!(
        manager.get_order(&order.order_id).unwrap().current_department,
        Some(Department::Layup)
    );
}

#[test]
fn test_kickback_on_shipped_order_is_conflict() {
    let manager = create_test_manager();
    let order = order_in(&manager, Department::Qc);
    manager.ship(&order.order_id, "floor").unwrap();

    let err = manager
        .kickback(
            &order.order_id,
            &kickback_request(Department::Layup, KickbackPriority::Low),
        )
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::OrderTerminal);

    let stored = manager.get_order(&order.order_id).unwrap();
    assert_eq!(stored.current_department, None);
    assert!(manager.list_kickbacks(&KickbackFilter::default()).unwrap().is_empty());
}

#[test]
fn test_kickback_target_shipped_rejected() {
    let manager = create_test_manager();
    let order = order_in(&manager, Department::Qc);
    let err: AppError = manager
        .kickback(
            &order.order_id,
            &kickback_request(Department::Shipped, KickbackPriority::Low),
        )
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::KickbackTargetInvalid);
}

#[test]
fn test_kickback_requires_reporter() {
    let manager = create_test_manager();
    let order = order_in(&manager, Department::Cnc);
    let mut request = kickback_request(Department::Layup, KickbackPriority::Low);
    request.reported_by = String::new();
    assert!(matches!(
        manager.kickback(&order.order_id, &request),
        Err(ManagerError::Validation(_))
    ));
    assert_eq!(
        manager.get_order(&order.order_id).unwrap().current_department,
        Some(Department::Cnc)
    );
}

#[test]
fn test_severity_is_highest_open_priority() {
    let manager = create_test_manager();
    let order = order_in(&manager, Department::Paint);
    assert_eq!(manager.severity(&order.order_id).unwrap(), None);

    manager
        .kickback(
            &order.order_id,
            &kickback_request(Department::Finish, KickbackPriority::Medium),
        )
        .unwrap();
    let (critical, _) = manager
        .kickback(
            &order.order_id,
            &kickback_request(Department::Layup, KickbackPriority::Critical),
        )
        .unwrap();
    assert_eq!(
        manager.severity(&order.order_id).unwrap(),
        Some(KickbackPriority::Critical)
    );

    manager
        .update_kickback_status(
            critical.id,
            &KickbackStatusUpdate {
                status: KickbackStatus::Resolved,
                resolved_by: Some("qc-lead".to_string()),
                resolution_notes: Some("re-laid".to_string()),
                root_cause: None,
                corrective_action: None,
            },
            "qc-lead",
        )
        .unwrap();
    assert_eq!(
        manager.severity(&order.order_id).unwrap(),
        Some(KickbackPriority::Medium)
    );
}

#[test]
fn test_update_kickback_status_keeps_record() {
    let manager = create_test_manager();
    let order = order_in(&manager, Department::Cnc);
    let (kickback, _) = manager
        .kickback(
            &order.order_id,
            &kickback_request(Department::Layup, KickbackPriority::High),
        )
        .unwrap();

    let updated = manager
        .update_kickback_status(
            kickback.id,
            &KickbackStatusUpdate {
                status: KickbackStatus::Closed,
                resolved_by: Some("lead".to_string()),
                resolution_notes: None,
                root_cause: Some("resin batch".to_string()),
                corrective_action: Some("supplier audit".to_string()),
            },
            "lead",
        )
        .unwrap();
    assert_eq!(updated.status, KickbackStatus::Closed);
    assert!(updated.resolved_at.is_some());
    assert_eq!(updated.from_department, Department::Cnc);
    assert_eq!(updated.priority, KickbackPriority::High);

    let closed = manager
        .list_kickbacks(&KickbackFilter {
            status: Some(KickbackStatus::Closed),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(closed.len(), 1);

    assert!(matches!(
        manager.update_kickback_status(42, &KickbackStatusUpdate {
            status: KickbackStatus::Closed,
            resolved_by: None,
            resolution_notes: None,
            root_cause: None,
            corrective_action: None,
        }, "lead"),
        Err(ManagerError::KickbackNotFound(42))
    ));
}

#[test]
fn test_list_kickbacks_by_department() {
    let manager = create_test_manager();
    let cnc = order_in(&manager, Department::Cnc);
    let paint = order_in(&manager, Department::Paint);
    manager
        .kickback(&cnc.order_id, &kickback_request(Department::Layup, KickbackPriority::Low))
        .unwrap();
    manager
        .kickback(&paint.order_id, &kickback_request(Department::Finish, KickbackPriority::Low))
        .unwrap();

    let from_paint = manager
        .list_kickbacks(&KickbackFilter {
            department: Some(Department::Paint),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(from_paint.len(), 1);
    assert_eq!(from_paint[0].order_id, paint.order_id);
    assert_eq!(manager.list_kickbacks(&KickbackFilter::default()).unwrap().len(), 2);

    let analytics = manager.kickback_analytics(DateRange::default()).unwrap();
    assert_eq!(analytics.total_kickbacks, 2);
    assert_eq!(analytics.by_department.get(&Department::Cnc), Some(&1));
}

#[test]
fn test_department_queue_groups_and_orders() {
    let manager = create_test_manager();
    let now = Utc::now().timestamp_millis();

    let mut overdue = draft("alpine_hunter");
    overdue.due_date = now - DAY;
    let mut later = draft("alpine_hunter");
    later.due_date = now + 20 * DAY;
    let mut sooner = draft("alpine_hunter");
    sooner.due_date = now + 5 * DAY;

    let mut ids = vec![];
    for d in [sooner, overdue, later] {
        let order = manager.save_draft(d, "sales").unwrap();
        manager.confirm(&order.order_id, "sales").unwrap();
        manager.finalize(&order.order_id, "sales").unwrap();
        ids.push(order.order_id);
    }
    let ferrata = finalized_order(&manager, "ferrata");
    manager
        .kickback(&ids[2], &kickback_request(Department::Layup, KickbackPriority::High))
        .unwrap();

    let groups = manager.department_queue(Department::Layup).unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].model_name, "Alpine Hunter");
    assert_eq!(groups[1].model_name, "Ferrata");
    assert_eq!(groups[1].entries[0].order.order_id, ferrata.order_id);

    let order_ids: Vec<&str> = groups[0]
        .entries
        .iter()
        .map(|e| e.order.order_id.as_str())
        .collect();
    // overdue, then due date descending
    assert_eq!(order_ids, vec![ids[1].as_str(), ids[2].as_str(), ids[0].as_str()]);
    assert!(groups[0].entries[0].is_overdue);
    assert_eq!(groups[0].entries[1].severity, Some(KickbackPriority::High));
    assert_eq!(groups[0].entries[2].severity, None);
}
