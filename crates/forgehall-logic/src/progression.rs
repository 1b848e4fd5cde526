//! Craft-count driven progression: item levels, next-level thresholds, and
//! unlock gating for item kinds.

use serde::{Deserialize, Serialize};

use crate::catalog::{ItemKind, LEVEL_THRESHOLDS};

/// Cumulative craft counts per item kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftCounts {
    pub sword: u32,
    pub potion: u32,
    pub armor: u32,
    pub ring: u32,
    pub bow: u32,
}

impl CraftCounts {
    pub fn get(&self, kind: ItemKind) -> u32 {
        match kind {
            ItemKind::Sword => self.sword,
            ItemKind::Potion => self.potion,
            ItemKind::Armor => self.armor,
            ItemKind::Ring => self.ring,
            ItemKind::Bow => self.bow,
        }
    }

    pub fn set(&mut self, kind: ItemKind, count: u32) {
        match kind {
            ItemKind::Sword => self.sword = count,
            ItemKind::Potion => self.potion = count,
            ItemKind::Armor => self.armor = count,
            ItemKind::Ring => self.ring = count,
            ItemKind::Bow => self.bow = count,
        }
    }

    pub fn increment(&mut self, kind: ItemKind) {
        let count = self.get(kind);
        self.set(kind, count.saturating_add(1));
    }

    pub fn total(&self) -> u64 {
        ItemKind::ALL.iter().map(|k| self.get(*k) as u64).sum()
    }
}

/// 1-based item level for a craft count, from the shared thresholds
/// [0, 10, 25, 50, 100]. Monotone non-decreasing, capped at 5.
pub fn item_level(craft_count: u32) -> u8 {
    let level = LEVEL_THRESHOLDS
        .iter()
        .filter(|t| craft_count >= **t)
        .count() as u8;
    level.max(1)
}

/// The smallest level threshold still ahead of the craft count, or `None`
/// once the top level is reached.
pub fn next_level_threshold(craft_count: u32) -> Option<u32> {
    LEVEL_THRESHOLDS[1..]
        .iter()
        .copied()
        .find(|t| craft_count < *t)
}

/// Kinds the player may currently craft: those with no unlock requirement,
/// plus those whose prerequisite craft count is met.
pub fn unlocked_item_kinds(counts: &CraftCounts) -> Vec<ItemKind> {
    ItemKind::ALL
        .iter()
        .copied()
        .filter(|kind| match kind.definition().unlock {
            None => true,
            Some(req) => counts.get(req.prerequisite) >= req.min_craft_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_fixtures() {
        assert_eq!(item_level(0), 1);
        assert_eq!(item_level(10), 2);
        assert_eq!(item_level(25), 3);
        assert_eq!(item_level(50), 4);
        assert_eq!(item_level(100), 5);
    }

    #[test]
    fn level_between_thresholds() {
        assert_eq!(item_level(9), 1);
        assert_eq!(item_level(24), 2);
        assert_eq!(item_level(49), 3);
        assert_eq!(item_level(99), 4);
        assert_eq!(item_level(100_000), 5);
    }

    #[test]
    fn level_monotone_and_bounded() {
        let mut previous = 0;
        for count in 0..200 {
            let level = item_level(count);
            assert!(level >= previous);
            assert!((1..=5).contains(&level));
            previous = level;
        }
    }

    #[test]
    fn next_threshold_fixtures() {
        assert_eq!(next_level_threshold(0), Some(10));
        assert_eq!(next_level_threshold(9), Some(10));
        assert_eq!(next_level_threshold(10), Some(25));
        assert_eq!(next_level_threshold(99), Some(100));
        assert_eq!(next_level_threshold(100), None);
        assert_eq!(next_level_threshold(u32::MAX), None);
    }

    #[test]
    fn base_kinds_start_unlocked() {
        let unlocked = unlocked_item_kinds(&CraftCounts::default());
        assert!(unlocked.contains(&ItemKind::Sword));
        assert!(unlocked.contains(&ItemKind::Potion));
        assert!(!unlocked.contains(&ItemKind::Armor));
        assert!(!unlocked.contains(&ItemKind::Bow));
    }

    #[test]
    fn prerequisite_count_unlocks_kind() {
        let mut counts = CraftCounts::default();
        counts.sword = 4;
        assert!(!unlocked_item_kinds(&counts).contains(&ItemKind::Armor));
        counts.sword = 5;
        assert!(unlocked_item_kinds(&counts).contains(&ItemKind::Armor));
        counts.sword = 15;
        assert!(unlocked_item_kinds(&counts).contains(&ItemKind::Bow));
    }

    #[test]
    fn increment_saturates() {
        let mut counts = CraftCounts::default();
        counts.ring = u32::MAX;
        counts.increment(ItemKind::Ring);
        assert_eq!(counts.get(ItemKind::Ring), u32::MAX);
    }
}
