//! Sticker record as stored in the `stickers` table.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A collectible sticker earned by completing a focus session.
///
/// `id` is `0` until the sticker has been persisted; the store assigns the
/// durable id on insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Sticker {
    pub id: i64,
    pub name: String,
    pub emoji: String,
    pub earned_at_ms: i64,
}

impl Sticker {
    pub fn unsaved(emoji: &str, name: &str, earned_at_ms: i64) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            emoji: emoji.to_string(),
            earned_at_ms,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }

    pub fn earned_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.earned_at_ms).single()
    }
}

/// Newest first; equal timestamps fall back to the higher id.
pub fn sort_newest_first(stickers: &mut [Sticker]) {
    stickers.sort_by(|a, b| {
        b.earned_at_ms
            .cmp(&a.earned_at_ms)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsaved_sticker_has_sentinel_id() {
        let sticker = Sticker::unsaved("🚀", "Rocket", 1_700_000_000_000);
        assert_eq!(sticker.id, 0);
        assert!(!sticker.is_persisted());
        assert_eq!(
            sticker.earned_at().map(|dt| dt.timestamp_millis()),
            Some(1_700_000_000_000)
        );
    }

    #[test]
    fn newest_first_breaks_ties_by_id() {
        let mut stickers = vec![
            Sticker { id: 1, ..Sticker::unsaved("⭐", "Star", 10) },
            Sticker { id: 2, ..Sticker::unsaved("🔥", "Fire", 30) },
            Sticker { id: 3, ..Sticker::unsaved("👑", "Crown", 30) },
        ];
        sort_newest_first(&mut stickers);
        let ids: Vec<i64> = stickers.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn serializes_camel_case() {
        let sticker = Sticker { id: 7, ..Sticker::unsaved("🧠", "Brain", 42) };
        let json = serde_json::to_value(&sticker).unwrap();
        assert_eq!(json["earnedAtMs"], 42);
        assert_eq!(json["emoji"], "🧠");
    }
}
