//! Backup import and export, including the legacy key-value layout.

use logitrack_core::{
    model::{Operator, OrderStatus, PickingRecord, StorageRecord},
    snapshot::WorkspaceSnapshot,
    stats::aggregate,
};
use serde_json::{json, Value};
use std::collections::HashMap;

#[test]
fn native_snapshot_json_roundtrip() {
    let snapshot = WorkspaceSnapshot {
        operators: vec![Operator::new("Ana", "Picking")],
        picking: vec![PickingRecord::new("2024-01-01", "DOC-1", "Ana", 10, 100, 60)
            .packed_by("Ana", 15)
            .with_packing_status(OrderStatus::Processed)],
        storage: vec![StorageRecord::new("2024-01-01", "Ana", 5, 5).between("A-1", "B-2")],
        ..WorkspaceSnapshot::default()
    }
    .stamped(chrono::Utc::now());

    let raw = snapshot.to_json().expect("serialize");
    let parsed = WorkspaceSnapshot::parse_any(&raw).expect("parse");
    assert_eq!(parsed.operators, snapshot.operators);
    assert_eq!(parsed.picking, snapshot.picking);
    assert_eq!(parsed.storage, snapshot.storage);
    assert!(parsed.last_sync.is_some());
}

#[test]
fn legacy_keys_with_spanish_fields_load() {
    let orders = json!([{
        "id": 1700000000000u64,
        "fecha": "2024-01-05",
        "documento": "DOC-55",
        "cliente": "RETAIL",
        "operador": "Juan",
        "status": "Procesado",
        "lineas": "12",
        "cantidad": 40,
        "duracionMinutos": 30,
        "operadorPacking": "Maria",
        "statusPacking": "Pendiente",
        "lineasPacking": null,
        "duracionPackingMinutos": "15"
    }]);
    let raw = json!({
        "logitrak_ops": [{ "id": "op-1", "name": "Juan", "role": "Picking" }],
        // The browser store kept each collection as a JSON string.
        "logitrak_orders": orders.to_string(),
        "logitrak_storage": [{
            "id": "s-1", "fecha": "2024-01-05", "operador": "Juan",
            "ubicacionEntrada": "A-1", "ubicacionSalida": "B-2",
            "cantidad": -4, "duracionMinutos": 10
        }],
        "logitrak_master": [{ "documento": "DOC-55", "cliente": "RETAIL", "lineas": 12, "cantidad": 40 }]
    })
    .to_string();

    let snapshot = WorkspaceSnapshot::parse_any(&raw).expect("parse legacy");
    assert_eq!(snapshot.operators.len(), 1);
    assert!(snapshot.operators[0].active);

    let order = &snapshot.picking[0];
    assert_eq!(order.id, "1700000000000");
    assert_eq!(order.document, "DOC-55");
    assert_eq!(order.status, OrderStatus::Processed);
    assert_eq!(order.lines, 12);
    assert_eq!(order.quantity, 40);
    assert_eq!(order.packer(), Some("Maria"));
    assert_eq!(order.packing_status, Some(OrderStatus::Pending));
    assert_eq!(order.packing_lines, None);
    assert_eq!(order.effective_packing_lines(), 12);
    assert_eq!(order.packing_duration_minutes, Some(15));

    let movement = &snapshot.storage[0];
    assert_eq!(movement.entry_location, "A-1");
    assert_eq!(movement.quantity, 0);

    assert_eq!(snapshot.master_orders[0].document, "DOC-55");
    assert!(snapshot.reception.is_empty());
    assert!(snapshot.articles.is_empty());

    let metrics = aggregate(&snapshot.operators, &snapshot.records());
    let juan = &metrics[0];
    assert_eq!(juan.pick_records, 1);
    assert_eq!(juan.total_lines, 12);
    assert_eq!(juan.pick_efficiency, 24.0);
    assert_eq!(juan.storage_records, 1);
}

#[test]
fn malformed_legacy_key_yields_empty_collection() {
    let mut entries: HashMap<String, Value> = HashMap::new();
    entries.insert("logitrak_orders".into(), Value::String("{not json".into()));
    entries.insert("logitrak_receptions".into(), json!({ "not": "an array" }));
    entries.insert(
        "logitrak_ops".into(),
        json!([{ "id": "op-1", "name": "Ana" }]),
    );

    let snapshot = WorkspaceSnapshot::from_key_value(&entries);
    assert!(snapshot.picking.is_empty());
    assert!(snapshot.reception.is_empty());
    assert_eq!(snapshot.operators[0].name, "Ana");
}

#[test]
fn unrelated_object_is_read_as_native_snapshot() {
    let snapshot = WorkspaceSnapshot::parse_any("{}").expect("parse");
    assert_eq!(snapshot, WorkspaceSnapshot::default());
    assert!(WorkspaceSnapshot::parse_any("[1, 2").is_err());
}

#[test]
fn records_view_matches_collections() {
    let snapshot = WorkspaceSnapshot {
        picking: vec![PickingRecord::new("2024-01-01", "DOC-1", "Ana", 1, 1, 1)],
        storage: vec![StorageRecord::new("2024-01-01", "Ana", 1, 1)],
        ..WorkspaceSnapshot::default()
    };
    let records = snapshot.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records.picking, snapshot.picking);
}
