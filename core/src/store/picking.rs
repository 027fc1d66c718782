use super::TrackStore;
use crate::{
    error::TrackResult,
    model::{OrderStatus, PickingRecord},
};
use rusqlite::params;

fn picking_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<PickingRecord> {
    Ok(PickingRecord {
        id: row.get(0)?,
        date: row.get(1)?,
        document: row.get(2)?,
        client: row.get(3)?,
        list_type: row.get(4)?,
        operator: row.get(5)?,
        start_time: row.get(6)?,
        end_time: row.get(7)?,
        status: OrderStatus::from_db(&row.get::<_, String>(8)?),
        lines: row.get::<_, i64>(9)?.max(0) as u64,
        quantity: row.get::<_, i64>(10)?.max(0) as u64,
        duration_minutes: row.get::<_, i64>(11)?.max(0) as u32,
        document_date: row.get(12)?,
        generated_at: row.get(13)?,
        packing_operator: row.get(14)?,
        packing_start_time: row.get(15)?,
        packing_end_time: row.get(16)?,
        packing_status: row
            .get::<_, Option<String>>(17)?
            .map(|s| OrderStatus::from_db(&s)),
        packing_lines: row.get::<_, Option<i64>>(18)?.map(|n| n.max(0) as u64),
        packing_quantity: row.get::<_, Option<i64>>(19)?.map(|n| n.max(0) as u64),
        packing_duration_minutes: row.get::<_, Option<i64>>(20)?.map(|n| n.max(0) as u32),
        batch_reference: row.get(21)?,
    })
}

impl TrackStore {
    // ── Picking / packing ──────────────────────────────────────────

    pub fn upsert_picking(&self, o: &PickingRecord) -> TrackResult<()> {
        self.conn.execute(
            "INSERT INTO picking_record (
                id, date, document, client, list_type, operator, start_time, end_time,
                status, lines, quantity, duration_minutes, document_date, generated_at,
                packing_operator, packing_start_time, packing_end_time, packing_status,
                packing_lines, packing_quantity, packing_duration_minutes, batch_reference
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                       ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22)
             ON CONFLICT(id) DO UPDATE SET
                date = excluded.date, document = excluded.document,
                client = excluded.client, list_type = excluded.list_type,
                operator = excluded.operator, start_time = excluded.start_time,
                end_time = excluded.end_time, status = excluded.status,
                lines = excluded.lines, quantity = excluded.quantity,
                duration_minutes = excluded.duration_minutes,
                document_date = excluded.document_date,
                generated_at = excluded.generated_at,
                packing_operator = excluded.packing_operator,
                packing_start_time = excluded.packing_start_time,
                packing_end_time = excluded.packing_end_time,
                packing_status = excluded.packing_status,
                packing_lines = excluded.packing_lines,
                packing_quantity = excluded.packing_quantity,
                packing_duration_minutes = excluded.packing_duration_minutes,
                batch_reference = excluded.batch_reference",
            params![
                &o.id,
                &o.date,
                &o.document,
                &o.client,
                &o.list_type,
                &o.operator,
                &o.start_time,
                &o.end_time,
                o.status.as_str(),
                o.lines as i64,
                o.quantity as i64,
                o.duration_minutes as i64,
                o.document_date.as_deref(),
                o.generated_at.as_deref(),
                o.packing_operator.as_deref(),
                o.packing_start_time.as_deref(),
                o.packing_end_time.as_deref(),
                o.packing_status.map(|s| s.as_str()),
                o.packing_lines.map(|n| n as i64),
                o.packing_quantity.map(|n| n as i64),
                o.packing_duration_minutes.map(|n| n as i64),
                o.batch_reference.as_deref(),
            ],
        )?;
        Ok(())
    }

    /// Upsert many picking records in one transaction.
    pub fn upsert_picking_batch(&self, records: &[PickingRecord]) -> TrackResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for o in records {
            self.upsert_picking(o)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Newest first, matching the in-memory order.
    pub fn list_picking(&self) -> TrackResult<Vec<PickingRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, document, client, list_type, operator, start_time, end_time,
                    status, lines, quantity, duration_minutes, document_date, generated_at,
                    packing_operator, packing_start_time, packing_end_time, packing_status,
                    packing_lines, packing_quantity, packing_duration_minutes, batch_reference
             FROM picking_record ORDER BY rowid DESC",
        )?;
        let rows = stmt.query_map([], picking_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
