//! Workspace writes: optimistic updates, rollback, reload from the store.

use logitrack_core::{
    config::TrackConfig,
    error::TrackError,
    filter::DateRange,
    model::{ArticleMaster, MasterOrder, Operator, PickingRecord, ReceptionRecord, StorageRecord},
    snapshot::WorkspaceSnapshot,
    store::{Collection, TrackStore},
    workspace::{MergeOutcome, Workspace},
};

fn fresh_workspace() -> Workspace {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = TrackStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    Workspace::load(store).expect("load workspace")
}

/// A workspace whose store has no tables: every write fails.
fn broken_workspace(snapshot: WorkspaceSnapshot) -> Workspace {
    let store = TrackStore::in_memory().expect("in-memory store");
    Workspace::seeded(store, snapshot)
}

#[test]
fn saved_records_survive_a_reload() {
    let mut ws = fresh_workspace();
    ws.add_operator("Ana", "Picking").expect("add operator");
    ws.save_picking(PickingRecord::new("2024-01-01", "DOC-1", "Ana", 10, 100, 60))
        .expect("save picking");
    ws.save_picking(PickingRecord::new("2024-01-02", "DOC-2", "Ana", 5, 50, 30).packed_by("Ana", 10))
        .expect("save picking");
    ws.save_reception(ReceptionRecord::new("2024-01-01", "Ana", 5, 20, 30))
        .expect("save reception");
    ws.mark_synced(chrono::Utc::now()).expect("mark synced");

    let reloaded = ws.store().load_snapshot().expect("reload");
    assert_eq!(reloaded.operators, ws.roster());
    assert_eq!(reloaded.picking, ws.records().picking);
    assert_eq!(reloaded.reception, ws.records().reception);
    assert_eq!(reloaded.picking[0].document, "DOC-2");
    assert_eq!(
        reloaded.last_sync.map(|t| t.timestamp()),
        ws.last_sync().map(|t| t.timestamp())
    );
}

#[test]
fn saving_an_existing_id_replaces_in_place() {
    let mut ws = fresh_workspace();
    let id = ws
        .save_storage(StorageRecord::new("2024-01-01", "Ana", 10, 10))
        .expect("save");
    ws.save_storage(StorageRecord::new("2024-01-02", "Luis", 5, 5))
        .expect("save");

    let mut edited = StorageRecord::new("2024-01-01", "Ana", 99, 10);
    edited.id = id.clone();
    ws.save_storage(edited).expect("save");

    let storage = &ws.records().storage;
    assert_eq!(storage.len(), 2);
    assert_eq!(storage[1].id, id);
    assert_eq!(storage[1].quantity, 99);
    assert_eq!(ws.store().count(Collection::Storage).expect("count"), 2);
}

#[test]
fn blank_ids_are_assigned() {
    let mut ws = fresh_workspace();
    let mut record = PickingRecord::new("2024-01-01", "DOC-1", "Ana", 1, 1, 1);
    record.id = "  ".into();
    let id = ws.save_picking(record).expect("save");
    assert!(!id.trim().is_empty());
    assert_eq!(ws.records().picking[0].id, id);
}

#[test]
fn failed_write_rolls_back_memory() {
    let existing = PickingRecord::new("2024-01-01", "DOC-1", "Ana", 10, 10, 10);
    let snapshot = WorkspaceSnapshot {
        operators: vec![Operator::new("Ana", "")],
        picking: vec![existing.clone()],
        ..WorkspaceSnapshot::default()
    };
    let mut ws = broken_workspace(snapshot.clone());

    let result = ws.save_picking(PickingRecord::new("2024-01-02", "DOC-2", "Ana", 1, 1, 1));
    assert!(matches!(result, Err(TrackError::Database(_))));
    assert_eq!(ws.records().picking, vec![existing.clone()]);

    let mut edited = existing.clone();
    edited.lines = 500;
    assert!(ws.save_picking(edited).is_err());
    assert_eq!(ws.records().picking[0].lines, 10);

    assert!(ws.delete(Collection::Picking, &existing.id).is_err());
    assert_eq!(ws.records().picking.len(), 1);

    assert!(ws.add_operator("Luis", "").is_err());
    assert_eq!(ws.roster().len(), 1);

    assert!(ws.replace_master_orders(vec![MasterOrder::new("D1", "", 1, 1)]).is_err());
    assert!(ws.master_orders().is_empty());

    assert!(ws.merge_picking_by_document(vec![PickingRecord::new("2024-01-03", "DOC-9", "Ana", 1, 1, 1)]).is_err());
    assert_eq!(ws.records().picking, vec![existing]);
}

#[test]
fn deleting_a_missing_record_is_an_error() {
    let mut ws = fresh_workspace();
    let err = ws.delete(Collection::Reception, "nope").unwrap_err();
    assert!(matches!(err, TrackError::RecordNotFound { .. }));
}

#[test]
fn delete_removes_from_memory_and_store() {
    let mut ws = fresh_workspace();
    let id = ws
        .save_reception(ReceptionRecord::new("2024-01-01", "Ana", 1, 1, 1))
        .expect("save");
    ws.delete(Collection::Reception, &id).expect("delete");
    assert!(ws.records().reception.is_empty());
    assert_eq!(ws.store().count(Collection::Reception).expect("count"), 0);
}

#[test]
fn master_lists_are_not_deleted_one_by_one() {
    let mut ws = fresh_workspace();
    assert!(ws.delete(Collection::MasterOrders, "D1").is_err());
}

#[test]
fn operators_can_be_added_and_removed() {
    let mut ws = fresh_workspace();
    let ana = ws.add_operator("  Ana  ", "").expect("add");
    assert_eq!(ana.name, "Ana");
    assert_eq!(ana.role, "Logistics Operator");

    assert!(matches!(
        ws.add_operator("   ", "Picking"),
        Err(TrackError::InvalidOperator { .. })
    ));

    let removed = ws.remove_operator(&ana.id).expect("remove");
    assert_eq!(removed.id, ana.id);
    assert!(ws.roster().is_empty());
    assert_eq!(ws.store().count(Collection::Operators).expect("count"), 0);
}

/// Removing an operator keeps their records; they simply stop aggregating.
#[test]
fn removed_operator_records_are_kept() {
    let mut ws = fresh_workspace();
    let ana = ws.add_operator("Ana", "").expect("add");
    ws.add_operator("Luis", "").expect("add");
    ws.save_picking(PickingRecord::new("2024-01-01", "DOC-1", "Ana", 10, 10, 60))
        .expect("save");

    ws.remove_operator(&ana.id).expect("remove");
    assert_eq!(ws.records().picking.len(), 1);
    let metrics = ws.metrics(None);
    assert_eq!(metrics.len(), 1);
    assert!(metrics[0].is_idle());
}

#[test]
fn merge_by_document_keeps_existing_ids() {
    let mut ws = fresh_workspace();
    let original_id = ws
        .save_picking(PickingRecord::new("2024-01-01", "DOC-1", "Ana", 10, 10, 60))
        .expect("save");

    let outcome = ws
        .merge_picking_by_document(vec![
            PickingRecord::new("2024-01-01", " doc-1 ", "Ana", 12, 12, 60).packed_by("Luis", 20),
            PickingRecord::new("2024-01-02", "DOC-2", "Luis", 3, 3, 10),
            PickingRecord::new("2024-01-02", "   ", "Luis", 3, 3, 10),
        ])
        .expect("merge");

    assert_eq!(outcome, MergeOutcome { inserted: 1, updated: 1 });
    let picking = &ws.records().picking;
    assert_eq!(picking.len(), 2);
    assert_eq!(picking[0].document, "DOC-2");
    assert_eq!(picking[1].id, original_id);
    assert_eq!(picking[1].lines, 12);
    assert_eq!(picking[1].packer(), Some("Luis"));

    let stored = ws.store().load_snapshot().expect("reload");
    assert_eq!(stored.picking, *picking);
}

/// A new document carrying an id already in use gets a fresh one, so
/// memory and the store keep the same set of records.
#[test]
fn merge_never_reuses_an_existing_id() {
    let mut ws = fresh_workspace();
    let mut first = PickingRecord::new("2024-01-01", "DOC-1", "Ana", 1, 1, 1);
    first.id = "X".into();
    ws.save_picking(first).expect("save");

    let mut clash = PickingRecord::new("2024-01-02", "DOC-2", "Ana", 2, 2, 2);
    clash.id = "X".into();
    let outcome = ws.merge_picking_by_document(vec![clash]).expect("merge");
    assert_eq!(outcome, MergeOutcome { inserted: 1, updated: 0 });

    let picking = &ws.records().picking;
    assert_eq!(picking.len(), 2);
    assert_eq!(picking[0].document, "DOC-2");
    assert_ne!(picking[0].id, "X");
    assert_eq!(picking[1].id, "X");
    assert_eq!(picking[1].document, "DOC-1");

    let stored = ws.store().load_snapshot().expect("reload");
    assert_eq!(stored.picking, *picking);
}

#[test]
fn storage_movements_take_descriptions_from_article_master() {
    let mut ws = fresh_workspace();
    ws.replace_articles(vec![
        ArticleMaster::new("SKU-9", "Pallet wrap"),
        ArticleMaster::new("  ", "ignored"),
    ])
    .expect("articles");
    assert_eq!(ws.articles().len(), 1);

    let mut linked = StorageRecord::new("2024-01-01", "Ana", 5, 5);
    linked.product_code = Some(" sku-9 ".into());
    ws.save_storage(linked).expect("save");
    assert_eq!(
        ws.records().storage[0].product_description.as_deref(),
        Some("Pallet wrap")
    );

    let unknown = StorageRecord::new("2024-01-01", "Ana", 5, 5).of_product("SKU-404", "Typed by hand");
    ws.save_storage(unknown).expect("save");
    assert_eq!(
        ws.records().storage[0].product_description.as_deref(),
        Some("Typed by hand")
    );

    let stored = ws.store().load_snapshot().expect("reload");
    assert_eq!(stored.storage, ws.records().storage);
}

#[test]
fn metrics_and_dashboard_follow_the_window() {
    let mut ws = fresh_workspace();
    ws.add_operator("Ana", "").expect("add");
    ws.replace_master_orders(vec![
        MasterOrder::new("DOC-1", "", 1, 1),
        MasterOrder::new("DOC-2", "", 1, 1),
        MasterOrder::new(" ", "", 1, 1),
    ])
    .expect("masters");
    assert_eq!(ws.master_orders().len(), 2);

    ws.save_picking(PickingRecord::new("2024-01-01", "DOC-1", "Ana", 10, 10, 60).packed_by("Ana", 30))
        .expect("save");
    ws.save_picking(PickingRecord::new("2024-02-01", "DOC-2", "Ana", 20, 20, 60))
        .expect("save");

    let january = DateRange::new("2024-01-01", "2024-01-31").expect("range");
    let ana = ws.operator_metrics("Ana", Some(&january)).expect("Ana");
    assert_eq!(ana.total_lines, 10);
    assert_eq!(ws.operator_metrics("Ana", None).expect("Ana").total_lines, 30);
    assert!(ws.operator_metrics("Nobody", None).is_none());

    assert_eq!(ws.dashboard(Some(&january)).total_orders, 1);
    assert_eq!(ws.dashboard(None).total_orders, 2);
    assert_eq!(ws.compliance(), 50.0);
}

#[test]
fn restore_replaces_everything() {
    let mut ws = fresh_workspace();
    ws.add_operator("Old", "").expect("add");
    ws.save_picking(PickingRecord::new("2024-01-01", "OLD-1", "Old", 1, 1, 1))
        .expect("save");

    let snapshot = WorkspaceSnapshot {
        operators: vec![Operator::new("Ana", ""), Operator::new("Luis", "")],
        picking: vec![
            PickingRecord::new("2024-03-02", "NEW-2", "Luis", 2, 2, 2),
            PickingRecord::new("2024-03-01", "NEW-1", "Ana", 1, 1, 1),
        ],
        master_orders: vec![MasterOrder::new("NEW-1", "", 1, 1)],
        ..WorkspaceSnapshot::default()
    };
    ws.restore(snapshot.clone()).expect("restore");

    assert_eq!(ws.roster(), snapshot.operators.as_slice());
    assert_eq!(ws.records().picking, snapshot.picking);
    let stored = ws.store().load_snapshot().expect("reload");
    assert_eq!(stored.picking, snapshot.picking);
    assert_eq!(stored.operators, snapshot.operators);
    assert_eq!(stored.master_orders, snapshot.master_orders);
}

#[test]
fn failed_restore_leaves_memory_alone() {
    let snapshot = WorkspaceSnapshot {
        operators: vec![Operator::new("Ana", "")],
        ..WorkspaceSnapshot::default()
    };
    let mut ws = broken_workspace(snapshot.clone());
    assert!(ws.restore(WorkspaceSnapshot::default()).is_err());
    assert_eq!(ws.roster(), snapshot.operators.as_slice());
}

#[test]
fn config_seeds_only_an_empty_workspace() {
    let config = TrackConfig::default_test();
    let mut ws = fresh_workspace();

    assert_eq!(config.seed(&mut ws).expect("seed"), 2);
    assert_eq!(ws.roster().len(), 2);
    assert_eq!(ws.master_orders().len(), 2);

    assert_eq!(config.seed(&mut ws).expect("seed again"), 0);
    assert_eq!(ws.roster().len(), 2);
}
