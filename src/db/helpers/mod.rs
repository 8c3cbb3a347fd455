use std::convert::TryFrom;

use anyhow::{anyhow, Result};
use rusqlite::Row;

use crate::db::models::Sticker;

pub fn to_u64(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("{field} contains negative value {value}"))
}

pub fn row_to_sticker(row: &Row) -> Result<Sticker, rusqlite::Error> {
    Ok(Sticker {
        id: row.get("id")?,
        name: row.get("name")?,
        emoji: row.get("emoji")?,
        earned_at_ms: row.get("earned_at_ms")?,
    })
}
