use super::TrackStore;
use crate::{error::TrackResult, model::Operator};
use rusqlite::params;

impl TrackStore {
    // ── Roster ─────────────────────────────────────────────────────

    pub fn upsert_operator(&self, op: &Operator) -> TrackResult<()> {
        self.conn.execute(
            "INSERT INTO operator (id, name, role, active) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name, role = excluded.role, active = excluded.active",
            params![&op.id, &op.name, &op.role, if op.active { 1i32 } else { 0i32 }],
        )?;
        Ok(())
    }

    /// Roster in insertion order.
    pub fn list_operators(&self) -> TrackResult<Vec<Operator>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, role, active FROM operator ORDER BY rowid ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(Operator {
                id: row.get(0)?,
                name: row.get(1)?,
                role: row.get(2)?,
                active: row.get::<_, i32>(3)? != 0,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
