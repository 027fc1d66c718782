use super::TrackStore;
use crate::{error::TrackResult, model::ReceptionRecord};
use rusqlite::params;

impl TrackStore {
    // ── Reception ──────────────────────────────────────────────────

    pub fn upsert_reception(&self, r: &ReceptionRecord) -> TrackResult<()> {
        self.conn.execute(
            "INSERT INTO reception_record (
                id, date, kind, document, supplier, operator, start_time, end_time,
                lines, quantity, duration_minutes, photo_evidence
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(id) DO UPDATE SET
                date = excluded.date, kind = excluded.kind, document = excluded.document,
                supplier = excluded.supplier, operator = excluded.operator,
                start_time = excluded.start_time, end_time = excluded.end_time,
                lines = excluded.lines, quantity = excluded.quantity,
                duration_minutes = excluded.duration_minutes,
                photo_evidence = excluded.photo_evidence",
            params![
                &r.id,
                &r.date,
                &r.kind,
                &r.document,
                &r.supplier,
                &r.operator,
                &r.start_time,
                &r.end_time,
                r.lines as i64,
                r.quantity as i64,
                r.duration_minutes as i64,
                r.photo_evidence.as_deref(),
            ],
        )?;
        Ok(())
    }

    pub fn list_reception(&self) -> TrackResult<Vec<ReceptionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, kind, document, supplier, operator, start_time, end_time,
                    lines, quantity, duration_minutes, photo_evidence
             FROM reception_record ORDER BY rowid DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ReceptionRecord {
                id: row.get(0)?,
                date: row.get(1)?,
                kind: row.get(2)?,
                document: row.get(3)?,
                supplier: row.get(4)?,
                operator: row.get(5)?,
                start_time: row.get(6)?,
                end_time: row.get(7)?,
                lines: row.get::<_, i64>(8)?.max(0) as u64,
                quantity: row.get::<_, i64>(9)?.max(0) as u64,
                duration_minutes: row.get::<_, i64>(10)?.max(0) as u32,
                photo_evidence: row.get(11)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
