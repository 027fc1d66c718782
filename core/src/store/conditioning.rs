use super::TrackStore;
use crate::{error::TrackResult, model::ConditioningRecord};
use rusqlite::params;

impl TrackStore {
    // ── Conditioning (VAS) ─────────────────────────────────────────

    pub fn upsert_conditioning(&self, c: &ConditioningRecord) -> TrackResult<()> {
        self.conn.execute(
            "INSERT INTO conditioning_record (
                id, date, kind, operator, client, document, start_time, end_time,
                lines, quantity, duration_minutes
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(id) DO UPDATE SET
                date = excluded.date, kind = excluded.kind, operator = excluded.operator,
                client = excluded.client, document = excluded.document,
                start_time = excluded.start_time, end_time = excluded.end_time,
                lines = excluded.lines, quantity = excluded.quantity,
                duration_minutes = excluded.duration_minutes",
            params![
                &c.id,
                &c.date,
                &c.kind,
                &c.operator,
                &c.client,
                &c.document,
                &c.start_time,
                &c.end_time,
                c.lines as i64,
                c.quantity as i64,
                c.duration_minutes as i64,
            ],
        )?;
        Ok(())
    }

    pub fn list_conditioning(&self) -> TrackResult<Vec<ConditioningRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, kind, operator, client, document, start_time, end_time,
                    lines, quantity, duration_minutes
             FROM conditioning_record ORDER BY rowid DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ConditioningRecord {
                id: row.get(0)?,
                date: row.get(1)?,
                kind: row.get(2)?,
                operator: row.get(3)?,
                client: row.get(4)?,
                document: row.get(5)?,
                start_time: row.get(6)?,
                end_time: row.get(7)?,
                lines: row.get::<_, i64>(8)?.max(0) as u64,
                quantity: row.get::<_, i64>(9)?.max(0) as u64,
                duration_minutes: row.get::<_, i64>(10)?.max(0) as u32,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
