use super::TrackStore;
use crate::{error::TrackResult, model::StorageRecord};
use rusqlite::params;

impl TrackStore {
    // ── Storage movements ──────────────────────────────────────────

    pub fn upsert_storage(&self, s: &StorageRecord) -> TrackResult<()> {
        self.conn.execute(
            "INSERT INTO storage_record (
                id, date, entry_location, exit_location, operator, start_time, end_time,
                warehouse_type, quantity, duration_minutes, product_code, product_description
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(id) DO UPDATE SET
                date = excluded.date, entry_location = excluded.entry_location,
                exit_location = excluded.exit_location, operator = excluded.operator,
                start_time = excluded.start_time, end_time = excluded.end_time,
                warehouse_type = excluded.warehouse_type, quantity = excluded.quantity,
                duration_minutes = excluded.duration_minutes,
                product_code = excluded.product_code,
                product_description = excluded.product_description",
            params![
                &s.id,
                &s.date,
                &s.entry_location,
                &s.exit_location,
                &s.operator,
                &s.start_time,
                &s.end_time,
                &s.warehouse_type,
                s.quantity as i64,
                s.duration_minutes as i64,
                s.product_code.as_deref(),
                s.product_description.as_deref(),
            ],
        )?;
        Ok(())
    }

    pub fn list_storage(&self) -> TrackResult<Vec<StorageRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, entry_location, exit_location, operator, start_time, end_time,
                    warehouse_type, quantity, duration_minutes, product_code, product_description
             FROM storage_record ORDER BY rowid DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StorageRecord {
                id: row.get(0)?,
                date: row.get(1)?,
                entry_location: row.get(2)?,
                exit_location: row.get(3)?,
                operator: row.get(4)?,
                start_time: row.get(5)?,
                end_time: row.get(6)?,
                warehouse_type: row.get(7)?,
                quantity: row.get::<_, i64>(8)?.max(0) as u64,
                duration_minutes: row.get::<_, i64>(9)?.max(0) as u32,
                product_code: row.get(10)?,
                product_description: row.get(11)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
