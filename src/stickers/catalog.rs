use rand::{seq::SliceRandom, Rng};

use crate::db::Sticker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub emoji: &'static str,
    pub name: &'static str,
}

const fn entry(emoji: &'static str, name: &'static str) -> CatalogEntry {
    CatalogEntry { emoji, name }
}

/// Every sticker that can be earned.
pub const CATALOG: &[CatalogEntry] = &[
    entry("⭐", "Star"),
    entry("🎉", "Party"),
    entry("🏆", "Trophy"),
    entry("💎", "Diamond"),
    entry("🔥", "Fire"),
    entry("⚡", "Lightning"),
    entry("🌟", "Sparkles"),
    entry("👑", "Crown"),
    entry("🎯", "Target"),
    entry("🚀", "Rocket"),
    entry("💪", "Strong"),
    entry("🧠", "Brain"),
    entry("🎨", "Art"),
    entry("🌈", "Rainbow"),
    entry("🦄", "Unicorn"),
    entry("🐉", "Dragon"),
    entry("🎭", "Theater"),
    entry("🎪", "Circus"),
    entry("🎸", "Guitar"),
    entry("🎮", "Gaming"),
];

/// Picks one entry uniformly at random. Repeats across draws are allowed.
pub fn draw_entry<R: Rng + ?Sized>(rng: &mut R) -> CatalogEntry {
    // CATALOG is a non-empty constant, the fallback only keeps this total.
    CATALOG.choose(rng).copied().unwrap_or(CATALOG_FALLBACK)
}

const CATALOG_FALLBACK: CatalogEntry = entry("⭐", "Star");

/// Draws an unsaved sticker stamped with `earned_at_ms`.
pub fn draw_sticker<R: Rng + ?Sized>(rng: &mut R, earned_at_ms: i64) -> Sticker {
    let picked = draw_entry(rng);
    Sticker::unsaved(picked.emoji, picked.name, earned_at_ms)
}

pub fn find_by_name(name: &str) -> Option<CatalogEntry> {
    CATALOG.iter().copied().find(|entry| entry.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    #[test]
    fn catalog_entries_are_unique() {
        let names: HashSet<_> = CATALOG.iter().map(|e| e.name).collect();
        let emojis: HashSet<_> = CATALOG.iter().map(|e| e.emoji).collect();
        assert_eq!(names.len(), CATALOG.len());
        assert_eq!(emojis.len(), CATALOG.len());
        assert_eq!(CATALOG.len(), 20);
    }

    #[test]
    fn draw_returns_catalog_member_with_sentinel_id() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let sticker = draw_sticker(&mut rng, 99);
            assert_eq!(sticker.id, 0);
            assert_eq!(sticker.earned_at_ms, 99);
            let entry = find_by_name(&sticker.name).expect("drawn name is in catalog");
            assert_eq!(entry.emoji, sticker.emoji);
        }
    }

    #[test]
    fn draw_covers_the_catalog() {
        let mut rng = StdRng::seed_from_u64(42);
        let seen: HashSet<_> = (0..2_000).map(|_| draw_entry(&mut rng).name).collect();
        assert_eq!(seen.len(), CATALOG.len());
    }
}
