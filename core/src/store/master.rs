use super::TrackStore;
use crate::{
    error::TrackResult,
    model::{ArticleMaster, MasterOrder},
};
use rusqlite::params;

impl TrackStore {
    // ── Expected orders ────────────────────────────────────────────

    /// Master orders are keyed by document, not by id.
    pub fn upsert_master_order(&self, m: &MasterOrder) -> TrackResult<()> {
        self.conn.execute(
            "INSERT INTO master_order (document, client, lines, quantity)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(document) DO UPDATE SET
                client = excluded.client, lines = excluded.lines, quantity = excluded.quantity",
            params![&m.document, &m.client, m.lines as i64, m.quantity as i64],
        )?;
        Ok(())
    }

    pub fn list_master_orders(&self) -> TrackResult<Vec<MasterOrder>> {
        let mut stmt = self.conn.prepare(
            "SELECT document, client, lines, quantity FROM master_order ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(MasterOrder {
                document: row.get(0)?,
                client: row.get(1)?,
                lines: row.get::<_, i64>(2)?.max(0) as u64,
                quantity: row.get::<_, i64>(3)?.max(0) as u64,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Replace the whole master list in one transaction.
    pub fn replace_master_orders(&self, orders: &[MasterOrder]) -> TrackResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM master_order", [])?;
        for m in orders {
            self.upsert_master_order(m)?;
        }
        tx.commit()?;
        Ok(())
    }

    // ── Articles ───────────────────────────────────────────────────

    pub fn upsert_article(&self, a: &ArticleMaster) -> TrackResult<()> {
        self.conn.execute(
            "INSERT INTO article_master (code, description) VALUES (?1, ?2)
             ON CONFLICT(code) DO UPDATE SET description = excluded.description",
            params![&a.code, &a.description],
        )?;
        Ok(())
    }

    pub fn list_articles(&self) -> TrackResult<Vec<ArticleMaster>> {
        let mut stmt = self
            .conn
            .prepare("SELECT code, description FROM article_master ORDER BY rowid ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(ArticleMaster {
                code: row.get(0)?,
                description: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn replace_articles(&self, articles: &[ArticleMaster]) -> TrackResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM article_master", [])?;
        for a in articles {
            self.upsert_article(a)?;
        }
        tx.commit()?;
        Ok(())
    }
}
