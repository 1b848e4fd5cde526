//! Static item and tier catalog.
//!
//! One [`ItemDefinition`] per craftable kind: base value, base craft time,
//! level thresholds, optional unlock requirement, and the trait-weight table
//! used by quality scoring (weights above 1.0 mark a kind's signature trait).
//! Tiers are quality brackets gated by craft count; each carries a minimum
//! resource-cost floor and a value multiplier.

use serde::{Deserialize, Serialize};

use crate::traits::TraitKind;

/// The craftable item kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Sword,
    Potion,
    Armor,
    Ring,
    Bow,
}

impl ItemKind {
    /// All kinds in display order.
    pub const ALL: [ItemKind; 5] = [
        ItemKind::Sword,
        ItemKind::Potion,
        ItemKind::Armor,
        ItemKind::Ring,
        ItemKind::Bow,
    ];

    /// Static definition for this kind.
    pub fn definition(&self) -> &'static ItemDefinition {
        match self {
            ItemKind::Sword => &SWORD,
            ItemKind::Potion => &POTION,
            ItemKind::Armor => &ARMOR,
            ItemKind::Ring => &RING,
            ItemKind::Bow => &BOW,
        }
    }

    /// Tier data for a 1-based tier number. Out-of-range tiers (including 0)
    /// fall back to tier 1 rather than failing.
    pub fn tier_info(&self, tier: u8) -> &'static TierDef {
        let index = tier.saturating_sub(1) as usize;
        TIERS.get(index).unwrap_or(&TIERS[0])
    }

    /// The prefix of tiers unlocked at the given craft count. Tier 1 is
    /// always included.
    pub fn available_tiers(&self, craft_count: u32) -> &'static [TierDef] {
        let unlocked = TIERS
            .iter()
            .take_while(|t| t.unlock_count <= craft_count)
            .count();
        &TIERS[..unlocked.max(1)]
    }

    pub fn label(&self) -> &'static str {
        self.definition().name
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Gate on an item kind: it becomes craftable only once the prerequisite
/// kind has been crafted often enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockRequirement {
    pub prerequisite: ItemKind,
    pub min_craft_count: u32,
}

/// Per-kind trait importance, used only by quality scoring, never by cost.
#[derive(Debug, Clone, Copy)]
pub struct TraitWeights {
    pub quality: f64,
    pub speed: f64,
    pub durability: f64,
    pub style: f64,
}

impl TraitWeights {
    pub fn weight(&self, kind: TraitKind) -> f64 {
        match kind {
            TraitKind::Quality => self.quality,
            TraitKind::Speed => self.speed,
            TraitKind::Durability => self.durability,
            TraitKind::Style => self.style,
        }
    }
}

/// Static definition of one item kind.
#[derive(Debug, Clone, Copy)]
pub struct ItemDefinition {
    pub kind: ItemKind,
    pub name: &'static str,
    pub base_value: u32,
    pub base_craft_ms: u64,
    /// Craft-count thresholds for levels 1 through 5.
    pub level_thresholds: [u32; 5],
    pub unlock: Option<UnlockRequirement>,
    pub weights: TraitWeights,
}

/// Craft-count thresholds shared by every kind's level track.
pub const LEVEL_THRESHOLDS: [u32; 5] = [0, 10, 25, 50, 100];

static SWORD: ItemDefinition = ItemDefinition {
    kind: ItemKind::Sword,
    name: "Sword",
    base_value: 10,
    base_craft_ms: 5000,
    level_thresholds: LEVEL_THRESHOLDS,
    unlock: None,
    weights: TraitWeights {
        quality: 1.2,
        speed: 0.8,
        durability: 1.5,
        style: 0.7,
    },
};

static POTION: ItemDefinition = ItemDefinition {
    kind: ItemKind::Potion,
    name: "Potion",
    base_value: 8,
    base_craft_ms: 3000,
    level_thresholds: LEVEL_THRESHOLDS,
    unlock: None,
    weights: TraitWeights {
        quality: 1.5,
        speed: 1.2,
        durability: 0.5,
        style: 0.9,
    },
};

static ARMOR: ItemDefinition = ItemDefinition {
    kind: ItemKind::Armor,
    name: "Armor",
    base_value: 15,
    base_craft_ms: 8000,
    level_thresholds: LEVEL_THRESHOLDS,
    unlock: Some(UnlockRequirement {
        prerequisite: ItemKind::Sword,
        min_craft_count: 5,
    }),
    weights: TraitWeights {
        quality: 1.1,
        speed: 0.6,
        durability: 1.6,
        style: 0.8,
    },
};

static RING: ItemDefinition = ItemDefinition {
    kind: ItemKind::Ring,
    name: "Ring",
    base_value: 12,
    base_craft_ms: 6000,
    level_thresholds: LEVEL_THRESHOLDS,
    unlock: Some(UnlockRequirement {
        prerequisite: ItemKind::Potion,
        min_craft_count: 10,
    }),
    weights: TraitWeights {
        quality: 1.3,
        speed: 0.7,
        durability: 0.8,
        style: 1.5,
    },
};

static BOW: ItemDefinition = ItemDefinition {
    kind: ItemKind::Bow,
    name: "Bow",
    base_value: 11,
    base_craft_ms: 7000,
    level_thresholds: LEVEL_THRESHOLDS,
    unlock: Some(UnlockRequirement {
        prerequisite: ItemKind::Sword,
        min_craft_count: 15,
    }),
    weights: TraitWeights {
        quality: 1.0,
        speed: 1.5,
        durability: 1.1,
        style: 0.9,
    },
};

/// One quality tier. `min_cost` is the floor on total trait points for a
/// craft at this tier; `unlock_count` gates selectability by craft count.
#[derive(Debug, Clone, Copy)]
pub struct TierDef {
    pub tier: u8,
    pub name: &'static str,
    pub min_cost: u32,
    pub value_multiplier: f64,
    pub time_factor: f64,
    pub unlock_count: u32,
}

/// The tier ladder, shared by all item kinds.
pub const TIERS: [TierDef; 4] = [
    TierDef {
        tier: 1,
        name: "Standard",
        min_cost: 0,
        value_multiplier: 1.0,
        time_factor: 1.0,
        unlock_count: 0,
    },
    TierDef {
        tier: 2,
        name: "Fine",
        min_cost: 60,
        value_multiplier: 1.5,
        time_factor: 1.35,
        unlock_count: 10,
    },
    TierDef {
        tier: 3,
        name: "Superior",
        min_cost: 120,
        value_multiplier: 2.25,
        time_factor: 1.8,
        unlock_count: 25,
    },
    TierDef {
        tier: 4,
        name: "Masterwork",
        min_cost: 200,
        value_multiplier: 3.5,
        time_factor: 2.4,
        unlock_count: 50,
    },
];
