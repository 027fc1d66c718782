//! The workspace: in-memory collections backed by the store.
//!
//! RULES:
//!   - Writes are optimistic: memory is updated first, then the store.
//!   - A failed store write restores the prior in-memory value and
//!     returns the error. Nothing is retried.
//!   - Metrics are never cached; every read recomputes from scratch.

use crate::{
    compliance::compliance,
    dashboard::DashboardSummary,
    error::{TrackError, TrackResult},
    filter::DateRange,
    model::{
        ArticleMaster, ConditioningRecord, MasterOrder, Operator, PickingRecord, ReceptionRecord,
        RecordSet, StorageRecord,
    },
    snapshot::WorkspaceSnapshot,
    stats::{aggregate, metrics_for, OperatorMetrics},
    store::{Collection, TrackStore},
    types::RecordId,
};
use chrono::{DateTime, Utc};

/// Records addressable by a string key.
pub trait Keyed {
    fn key(&self) -> &str;
    fn set_key(&mut self, key: RecordId);
}

macro_rules! impl_keyed_by_id {
    ($($ty:ty),* $(,)?) => {
        $(impl Keyed for $ty {
            fn key(&self) -> &str {
                &self.id
            }
            fn set_key(&mut self, key: RecordId) {
                self.id = key;
            }
        })*
    };
}

impl_keyed_by_id!(
    Operator,
    PickingRecord,
    ReceptionRecord,
    ConditioningRecord,
    StorageRecord
);

/// Result of a document-keyed picking import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub inserted: usize,
    pub updated: usize,
}

pub struct Workspace {
    store: TrackStore,
    roster: Vec<Operator>,
    records: RecordSet,
    master_orders: Vec<MasterOrder>,
    articles: Vec<ArticleMaster>,
    last_sync: Option<DateTime<Utc>>,
}

impl Workspace {
    /// Load every collection from the store.
    pub fn load(store: TrackStore) -> TrackResult<Self> {
        let snapshot = store.load_snapshot()?;
        log::info!(
            "workspace: loaded {} operators and {} records",
            snapshot.operators.len(),
            snapshot.records().len()
        );
        Ok(Self::seeded(store, snapshot))
    }

    /// Build a workspace from a snapshot without touching the store.
    pub fn seeded(store: TrackStore, snapshot: WorkspaceSnapshot) -> Self {
        let records = snapshot.records();
        Self {
            store,
            roster: snapshot.operators,
            records,
            master_orders: snapshot.master_orders,
            articles: snapshot.articles,
            last_sync: snapshot.last_sync,
        }
    }

    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    pub fn roster(&self) -> &[Operator] {
        &self.roster
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn master_orders(&self) -> &[MasterOrder] {
        &self.master_orders
    }

    pub fn articles(&self) -> &[ArticleMaster] {
        &self.articles
    }

    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.last_sync
    }

    // ── Derived views ──────────────────────────────────────────────

    pub fn metrics(&self, range: Option<&DateRange>) -> Vec<OperatorMetrics> {
        match range {
            Some(range) => aggregate(&self.roster, &self.records.within(range)),
            None => aggregate(&self.roster, &self.records),
        }
    }

    pub fn operator_metrics(&self, name: &str, range: Option<&DateRange>) -> Option<OperatorMetrics> {
        metrics_for(&self.metrics(range), name).cloned()
    }

    pub fn dashboard(&self, range: Option<&DateRange>) -> DashboardSummary {
        let windowed;
        let records = match range {
            Some(range) => {
                windowed = self.records.within(range);
                &windowed
            }
            None => &self.records,
        };
        let metrics = aggregate(&self.roster, records);
        DashboardSummary::build(records, &self.master_orders, &metrics)
    }

    pub fn compliance(&self) -> f64 {
        compliance(&self.records.picking, &self.master_orders)
    }

    // ── Roster ─────────────────────────────────────────────────────

    pub fn add_operator(&mut self, name: &str, role: &str) -> TrackResult<Operator> {
        if name.trim().is_empty() {
            return Err(TrackError::InvalidOperator {
                reason: "name must not be blank".to_string(),
            });
        }
        let op = Operator::new(name, role);
        if self.roster.iter().any(|o| o.name.trim() == op.name) {
            log::warn!("workspace: operator name '{}' already on the roster", op.name);
        }
        self.roster.push(op.clone());
        if let Err(e) = self.store.upsert_operator(&op) {
            self.roster.pop();
            log::warn!("workspace: add operator '{}' rolled back: {e}", op.name);
            return Err(e);
        }
        Ok(op)
    }

    pub fn remove_operator(&mut self, id: &str) -> TrackResult<Operator> {
        let store = &self.store;
        optimistic_delete(&mut self.roster, Collection::Operators, id, |key| {
            store.delete(Collection::Operators, key)
        })
    }

    // ── Process records ────────────────────────────────────────────

    pub fn save_picking(&mut self, record: PickingRecord) -> TrackResult<RecordId> {
        let store = &self.store;
        optimistic_upsert(&mut self.records.picking, record, |r| store.upsert_picking(r))
    }

    pub fn save_reception(&mut self, record: ReceptionRecord) -> TrackResult<RecordId> {
        let store = &self.store;
        optimistic_upsert(&mut self.records.reception, record, |r| store.upsert_reception(r))
    }

    pub fn save_conditioning(&mut self, record: ConditioningRecord) -> TrackResult<RecordId> {
        let store = &self.store;
        optimistic_upsert(&mut self.records.conditioning, record, |r| {
            store.upsert_conditioning(r)
        })
    }

    /// Product descriptions are filled from the article master by code.
    pub fn save_storage(&mut self, mut record: StorageRecord) -> TrackResult<RecordId> {
        if record.link_article(&self.articles) {
            log::debug!("workspace: storage movement linked to article master");
        }
        let store = &self.store;
        optimistic_upsert(&mut self.records.storage, record, |r| store.upsert_storage(r))
    }

    /// Delete one record from any process collection.
    pub fn delete(&mut self, collection: Collection, id: &str) -> TrackResult<()> {
        let store = &self.store;
        let write = |key: &str| store.delete(collection, key);
        match collection {
            Collection::Picking => {
                optimistic_delete(&mut self.records.picking, collection, id, write).map(drop)
            }
            Collection::Reception => {
                optimistic_delete(&mut self.records.reception, collection, id, write).map(drop)
            }
            Collection::Conditioning => {
                optimistic_delete(&mut self.records.conditioning, collection, id, write).map(drop)
            }
            Collection::Storage => {
                optimistic_delete(&mut self.records.storage, collection, id, write).map(drop)
            }
            Collection::Operators => self.remove_operator(id).map(drop),
            Collection::MasterOrders | Collection::Articles => {
                Err(TrackError::Other(anyhow::anyhow!(
                    "{} are replaced as a whole, not deleted one by one",
                    collection.table()
                )))
            }
        }
    }

    /// Import picking records keyed by document.
    ///
    /// An incoming record whose trimmed, case-insensitive document matches
    /// an existing record replaces it but keeps the existing id. Records
    /// without a document are skipped. New documents go to the front.
    pub fn merge_picking_by_document(
        &mut self,
        incoming: Vec<PickingRecord>,
    ) -> TrackResult<MergeOutcome> {
        let prior = self.records.picking.clone();
        let mut outcome = MergeOutcome::default();
        let mut touched = Vec::with_capacity(incoming.len());

        for mut record in incoming {
            let doc = record.document.trim().to_lowercase();
            if doc.is_empty() {
                continue;
            }
            let existing = self
                .records
                .picking
                .iter()
                .position(|o| o.document.trim().to_lowercase() == doc);
            match existing {
                Some(i) => {
                    record.id = self.records.picking[i].id.clone();
                    self.records.picking[i] = record.clone();
                    outcome.updated += 1;
                }
                None => {
                    // A new document never takes over another record's id.
                    let taken = self.records.picking.iter().any(|o| o.id == record.id);
                    if record.id.trim().is_empty() || taken {
                        record.set_key(uuid::Uuid::new_v4().to_string());
                    }
                    self.records.picking.insert(0, record.clone());
                    outcome.inserted += 1;
                }
            }
            touched.push(record);
        }

        if let Err(e) = self.store.upsert_picking_batch(&touched) {
            self.records.picking = prior;
            log::warn!("workspace: picking import rolled back: {e}");
            return Err(e);
        }
        log::info!(
            "workspace: picking import inserted {} updated {}",
            outcome.inserted,
            outcome.updated
        );
        Ok(outcome)
    }

    // ── Masters ────────────────────────────────────────────────────

    /// Replace the expected-orders list. Blank documents are dropped.
    pub fn replace_master_orders(&mut self, orders: Vec<MasterOrder>) -> TrackResult<usize> {
        let orders: Vec<MasterOrder> = orders
            .into_iter()
            .filter(|m| !m.document.trim().is_empty())
            .collect();
        let prior = std::mem::replace(&mut self.master_orders, orders);
        if let Err(e) = self.store.replace_master_orders(&self.master_orders) {
            self.master_orders = prior;
            return Err(e);
        }
        Ok(self.master_orders.len())
    }

    /// Replace the article master. Blank codes are dropped.
    pub fn replace_articles(&mut self, articles: Vec<ArticleMaster>) -> TrackResult<usize> {
        let articles: Vec<ArticleMaster> = articles
            .into_iter()
            .filter(|a| !a.code.trim().is_empty())
            .collect();
        let prior = std::mem::replace(&mut self.articles, articles);
        if let Err(e) = self.store.replace_articles(&self.articles) {
            self.articles = prior;
            return Err(e);
        }
        Ok(self.articles.len())
    }

    // ── Backup ─────────────────────────────────────────────────────

    pub fn snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            operators: self.roster.clone(),
            picking: self.records.picking.clone(),
            reception: self.records.reception.clone(),
            conditioning: self.records.conditioning.clone(),
            storage: self.records.storage.clone(),
            master_orders: self.master_orders.clone(),
            articles: self.articles.clone(),
            last_sync: self.last_sync,
        }
    }

    /// Replace everything with `snapshot`. The store is written first;
    /// memory only changes once the write has committed.
    pub fn restore(&mut self, snapshot: WorkspaceSnapshot) -> TrackResult<()> {
        self.store.replace_all(&snapshot)?;
        self.records = snapshot.records();
        self.roster = snapshot.operators;
        self.master_orders = snapshot.master_orders;
        self.articles = snapshot.articles;
        self.last_sync = snapshot.last_sync;
        Ok(())
    }

    pub fn mark_synced(&mut self, at: DateTime<Utc>) -> TrackResult<()> {
        self.store.record_sync(at)?;
        self.last_sync = Some(at);
        Ok(())
    }
}

enum Prior<T> {
    Inserted,
    Replaced(usize, T),
}

/// Insert or replace `record` in memory, then persist it with `write`.
/// New records go to the front; a blank id is replaced by a fresh one.
fn optimistic_upsert<T, W>(items: &mut Vec<T>, mut record: T, write: W) -> TrackResult<RecordId>
where
    T: Keyed + Clone,
    W: FnOnce(&T) -> TrackResult<()>,
{
    if record.key().trim().is_empty() {
        record.set_key(uuid::Uuid::new_v4().to_string());
    }
    let id = record.key().to_string();

    let prior = match items.iter().position(|x| x.key() == id) {
        Some(i) => Prior::Replaced(i, std::mem::replace(&mut items[i], record.clone())),
        None => {
            items.insert(0, record.clone());
            Prior::Inserted
        }
    };

    if let Err(e) = write(&record) {
        match prior {
            Prior::Replaced(i, old) => items[i] = old,
            Prior::Inserted => {
                items.remove(0);
            }
        }
        log::warn!("workspace: write of {id} rolled back: {e}");
        return Err(e);
    }
    Ok(id)
}

/// Remove the record keyed `id` from memory, then from the store.
fn optimistic_delete<T, W>(
    items: &mut Vec<T>,
    collection: Collection,
    id: &str,
    write: W,
) -> TrackResult<T>
where
    T: Keyed + Clone,
    W: FnOnce(&str) -> TrackResult<()>,
{
    let index = items
        .iter()
        .position(|x| x.key() == id)
        .ok_or_else(|| TrackError::RecordNotFound {
            collection: collection.table().to_string(),
            key: id.to_string(),
        })?;
    let removed = items.remove(index);
    if let Err(e) = write(id) {
        items.insert(index, removed);
        log::warn!("workspace: delete of {id} rolled back: {e}");
        return Err(e);
    }
    Ok(removed)
}
