//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The workspace calls store methods and never executes SQL directly.

use crate::{
    error::{TrackError, TrackResult},
    snapshot::WorkspaceSnapshot,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

mod conditioning;
mod master;
mod picking;
mod reception;
mod roster;
mod storage;

pub struct TrackStore {
    conn: Connection,
}

/// Every persisted collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Operators,
    Picking,
    Reception,
    Conditioning,
    Storage,
    MasterOrders,
    Articles,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Self::Operators,
        Self::Picking,
        Self::Reception,
        Self::Conditioning,
        Self::Storage,
        Self::MasterOrders,
        Self::Articles,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            Self::Operators => "operator",
            Self::Picking => "picking_record",
            Self::Reception => "reception_record",
            Self::Conditioning => "conditioning_record",
            Self::Storage => "storage_record",
            Self::MasterOrders => "master_order",
            Self::Articles => "article_master",
        }
    }

    /// The column upserts and deletes match on.
    pub fn key_column(&self) -> &'static str {
        match self {
            Self::MasterOrders => "document",
            Self::Articles => "code",
            _ => "id",
        }
    }

    /// Key under which the browser key-value store kept this collection.
    pub fn legacy_key(&self) -> &'static str {
        match self {
            Self::Operators => "logitrak_ops",
            Self::Picking => "logitrak_orders",
            Self::Reception => "logitrak_receptions",
            Self::Conditioning => "logitrak_conditioning",
            Self::Storage => "logitrak_storage",
            Self::MasterOrders => "logitrak_master",
            Self::Articles => "logitrak_articles",
        }
    }
}

impl TrackStore {
    pub fn open(path: &str) -> TrackResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only matters for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> TrackResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> TrackResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Generic ────────────────────────────────────────────────

    /// Delete one record by its key. Missing keys are an error so callers
    /// can tell a stale view from a successful delete.
    pub fn delete(&self, collection: Collection, key: &str) -> TrackResult<()> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?1",
            collection.table(),
            collection.key_column()
        );
        let affected = self.conn.execute(&sql, params![key])?;
        if affected == 0 {
            return Err(TrackError::RecordNotFound {
                collection: collection.table().to_string(),
                key: key.to_string(),
            });
        }
        Ok(())
    }

    pub fn count(&self, collection: Collection) -> TrackResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", collection.table());
        let n = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(n)
    }

    // ── Snapshot ───────────────────────────────────────────────

    /// Load every collection at once.
    pub fn load_snapshot(&self) -> TrackResult<WorkspaceSnapshot> {
        Ok(WorkspaceSnapshot {
            operators: self.list_operators()?,
            picking: self.list_picking()?,
            reception: self.list_reception()?,
            conditioning: self.list_conditioning()?,
            storage: self.list_storage()?,
            master_orders: self.list_master_orders()?,
            articles: self.list_articles()?,
            last_sync: self.last_sync()?,
        })
    }

    /// Replace every collection with the snapshot's contents, atomically.
    pub fn replace_all(&self, snapshot: &WorkspaceSnapshot) -> TrackResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for collection in Collection::ALL {
            tx.execute(&format!("DELETE FROM {}", collection.table()), [])?;
        }
        tx.execute("DELETE FROM sync_state", [])?;
        // Process lists are newest first; insert oldest first so rowid order matches.
        for op in &snapshot.operators {
            self.upsert_operator(op)?;
        }
        for o in snapshot.picking.iter().rev() {
            self.upsert_picking(o)?;
        }
        for r in snapshot.reception.iter().rev() {
            self.upsert_reception(r)?;
        }
        for c in snapshot.conditioning.iter().rev() {
            self.upsert_conditioning(c)?;
        }
        for s in snapshot.storage.iter().rev() {
            self.upsert_storage(s)?;
        }
        for m in &snapshot.master_orders {
            self.upsert_master_order(m)?;
        }
        for a in &snapshot.articles {
            self.upsert_article(a)?;
        }
        if let Some(at) = snapshot.last_sync {
            self.record_sync(at)?;
        }
        tx.commit()?;
        log::info!(
            "store: replaced all collections ({} operators, {} picking, {} reception, {} vas, {} storage)",
            snapshot.operators.len(),
            snapshot.picking.len(),
            snapshot.reception.len(),
            snapshot.conditioning.len(),
            snapshot.storage.len(),
        );
        Ok(())
    }

    pub fn record_sync(&self, at: DateTime<Utc>) -> TrackResult<()> {
        self.conn.execute(
            "INSERT INTO sync_state (id, last_sync) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET last_sync = excluded.last_sync",
            params![at.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn last_sync(&self) -> TrackResult<Option<DateTime<Utc>>> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT last_sync FROM sync_state WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(raw
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }
}
