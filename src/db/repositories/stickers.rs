use anyhow::{anyhow, Context, Result};
use rusqlite::{params, OptionalExtension};

use crate::db::{
    helpers::{row_to_sticker, to_u64},
    models::Sticker,
    Database,
};

impl Database {
    /// Inserts `sticker` and returns the stored row with its assigned id.
    ///
    /// Any id on the input is ignored; SQLite allocates a fresh one.
    pub async fn insert_sticker(&self, sticker: &Sticker) -> Result<Sticker> {
        let record = sticker.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO stickers (name, emoji, earned_at_ms) VALUES (?1, ?2, ?3)",
                params![record.name, record.emoji, record.earned_at_ms],
            )
            .context("failed to insert sticker")?;

            let sticker_id = conn.last_insert_rowid();

            let stored = conn
                .query_row(
                    "SELECT id, name, emoji, earned_at_ms FROM stickers WHERE id = ?1",
                    params![sticker_id],
                    row_to_sticker,
                )
                .optional()?
                .ok_or_else(|| anyhow!("sticker {sticker_id} not found after insert"))?;

            Ok(stored)
        })
        .await
    }

    /// All stickers, newest first.
    pub async fn list_stickers(&self) -> Result<Vec<Sticker>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, emoji, earned_at_ms
                 FROM stickers
                 ORDER BY earned_at_ms DESC, id DESC",
            )?;

            let stickers = stmt
                .query_map([], row_to_sticker)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(stickers)
        })
        .await
    }

    pub async fn count_stickers(&self) -> Result<u64> {
        self.execute(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM stickers", [], |row| row.get(0))?;
            to_u64(count, "sticker count")
        })
        .await
    }
}
