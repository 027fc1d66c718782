use logitrack_core::{
    audit::{
        AuditRequest, Auditor, CommandAuditWriter, OrderCounts, OPERATOR_AUDIT_FALLBACK,
        TEAM_AUDIT_FALLBACK,
    },
    error::{TrackError, TrackResult},
    model::{Operator, OrderStatus, PickingRecord, RecordSet},
    stats::{aggregate, OperatorMetrics},
};
use logitrack_core::config::TrackConfig;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

fn team() -> (Vec<OperatorMetrics>, Vec<PickingRecord>) {
    let ops = vec![Operator::new("Juan", ""), Operator::new("Maria", "")];
    let picking = vec![
        PickingRecord::new("2024-01-01", "DOC-1", "Juan", 10, 100, 60)
            .with_status(OrderStatus::Processed)
            .packed_by("Maria", 20),
        PickingRecord::new("2024-01-01", "DOC-2", "Juan", 4, 8, 20),
    ];
    let records = RecordSet {
        picking: picking.clone(),
        ..RecordSet::default()
    };
    (aggregate(&ops, &records), picking)
}

fn failing_auditor() -> Auditor {
    Auditor::new(Box::new(|_: &AuditRequest| -> TrackResult<String> {
        Err(TrackError::Audit("offline".into()))
    }))
}

#[test]
fn team_audit_falls_back_on_failure() {
    let (metrics, picking) = team();
    let text = failing_auditor().team_audit(&metrics, &picking, None);
    assert_eq!(text, TEAM_AUDIT_FALLBACK);
}

#[test]
fn operator_audit_falls_back_on_failure() {
    let (metrics, _) = team();
    let text = failing_auditor().operator_audit("Juan", &metrics);
    assert_eq!(text, OPERATOR_AUDIT_FALLBACK);
}

#[test]
fn unknown_operator_gets_fallback_without_calling_writer() {
    let (metrics, _) = team();
    let calls = Rc::new(RefCell::new(0));
    let seen = Rc::clone(&calls);
    let auditor = Auditor::new(Box::new(move |_: &AuditRequest| -> TrackResult<String> {
        *seen.borrow_mut() += 1;
        Ok("report".into())
    }));
    assert_eq!(auditor.operator_audit("Ghost", &metrics), OPERATOR_AUDIT_FALLBACK);
    assert_eq!(*calls.borrow(), 0);
}

#[test]
fn writer_receives_the_dashboard_figures() {
    let (metrics, picking) = team();
    let auditor = Auditor::new(Box::new(|request: &AuditRequest| -> TrackResult<String> {
        match request {
            AuditRequest::Team { metrics, orders, .. } => {
                Ok(format!("{} operators, {} orders", metrics.len(), orders.total_orders))
            }
            AuditRequest::Operator { name, metrics } => {
                Ok(format!("{name}: {:.1} L/H", metrics.pick_efficiency))
            }
        }
    }));
    assert_eq!(auditor.team_audit(&metrics, &picking, None), "2 operators, 2 orders");
    assert_eq!(auditor.operator_audit(" Juan ", &metrics), "Juan: 10.5 L/H");
}

#[test]
fn order_counts_tally_statuses() {
    let (_, picking) = team();
    let counts = OrderCounts::from_picking(&picking);
    assert_eq!(counts.total_orders, 2);
    assert_eq!(counts.processed_picking, 1);
    assert_eq!(counts.processed_packing, 0);
    assert_eq!(counts.total_lines, 14);
    assert_eq!(counts.total_units, 108);
}

#[test]
fn request_payload_is_tagged_by_scope() {
    let (metrics, _) = team();
    let request = AuditRequest::Operator {
        name: "Juan".into(),
        metrics: metrics[0].clone(),
    };
    let json = serde_json::to_value(&request).expect("serialize");
    assert_eq!(json["scope"], "operator");
    assert_eq!(json["metrics"]["totalLines"], 14);
}

#[cfg(unix)]
#[test]
fn command_writer_pipes_the_request() {
    let (metrics, picking) = team();
    let writer = CommandAuditWriter::from_command(&["cat".to_string()]).expect("command");
    let text = Auditor::new(Box::new(writer)).team_audit(&metrics, &picking, None);
    let echoed: serde_json::Value = serde_json::from_str(&text).expect("echoed json");
    assert_eq!(echoed["scope"], "team");
    assert_eq!(echoed["orders"]["totalOrders"], 2);
}

#[cfg(unix)]
#[test]
fn command_writer_failure_uses_fallback() {
    let (metrics, _) = team();
    let writer = CommandAuditWriter::from_command(&["false".to_string()]).expect("command");
    let text = Auditor::new(Box::new(writer)).operator_audit("Maria", &metrics);
    assert_eq!(text, OPERATOR_AUDIT_FALLBACK);
}

#[test]
fn empty_command_disables_the_writer() {
    assert!(CommandAuditWriter::from_command(&[]).is_none());
}

#[cfg(unix)]
#[test]
fn hung_command_is_killed_at_the_timeout() {
    let (metrics, picking) = team();
    let writer = CommandAuditWriter::from_command(&["sleep".to_string(), "30".to_string()])
        .expect("command")
        .with_timeout(Duration::from_millis(200));

    let started = Instant::now();
    let text = Auditor::new(Box::new(writer)).team_audit(&metrics, &picking, None);
    assert_eq!(text, TEAM_AUDIT_FALLBACK);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[cfg(unix)]
#[test]
fn timed_out_command_reports_an_audit_error() {
    let writer = CommandAuditWriter::from_command(&["sleep".to_string(), "30".to_string()])
        .expect("command")
        .with_timeout(Duration::from_millis(100));
    let request = AuditRequest::Operator {
        name: "Juan".into(),
        metrics: OperatorMetrics::default(),
    };
    assert!(matches!(
        logitrack_core::audit::AuditWriter::write(&writer, &request),
        Err(TrackError::Audit(_))
    ));
}

#[test]
fn config_builds_writer_with_its_timeout() {
    let mut config = TrackConfig::default_test();
    assert!(config.audit_writer().is_none());
    assert_eq!(config.audit_timeout_secs, 60);

    config.audit_command = vec!["cat".into()];
    assert!(config.audit_writer().is_some());

    let parsed: TrackConfig = serde_json::from_str(r#"{"audit_command": ["cat"]}"#).expect("config");
    assert_eq!(parsed.audit_timeout_secs, 60);
    assert_eq!(parsed.db_path, "logitrack.db");
}
