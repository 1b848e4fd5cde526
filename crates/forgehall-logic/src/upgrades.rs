//! Upgrade tier tables for the six permanent shop upgrades.
//!
//! Each upgrade steps through a static ordered table. Level 1 is the free
//! starting tier; purchases are strictly sequential and a level can never
//! be skipped or repeated.

use serde::{Deserialize, Serialize};

/// The purchasable upgrade tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    ResourceRate,
    Capacity,
    CraftSpeed,
    Inventory,
    CraftingSlots,
    SpawnRate,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 6] = [
        UpgradeKind::ResourceRate,
        UpgradeKind::Capacity,
        UpgradeKind::CraftSpeed,
        UpgradeKind::Inventory,
        UpgradeKind::CraftingSlots,
        UpgradeKind::SpawnRate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            UpgradeKind::ResourceRate => "Resource production",
            UpgradeKind::Capacity => "Resource capacity",
            UpgradeKind::CraftSpeed => "Craft speed",
            UpgradeKind::Inventory => "Inventory",
            UpgradeKind::CraftingSlots => "Crafting slots",
            UpgradeKind::SpawnRate => "Customer traffic",
        }
    }

    /// Highest level defined for this track.
    pub fn max_level(&self) -> u8 {
        match self {
            UpgradeKind::ResourceRate => RESOURCE_RATE_TIERS.len() as u8,
            UpgradeKind::Capacity => CAPACITY_TIERS.len() as u8,
            UpgradeKind::CraftSpeed => CRAFT_SPEED_TIERS.len() as u8,
            UpgradeKind::Inventory => INVENTORY_TIERS.len() as u8,
            UpgradeKind::CraftingSlots => CRAFTING_SLOT_TIERS.len() as u8,
            UpgradeKind::SpawnRate => SPAWN_RATE_TIERS.len() as u8,
        }
    }

    /// Coin cost of the given level, if the track defines it.
    pub fn cost_of(&self, level: u8) -> Option<u64> {
        match self {
            UpgradeKind::ResourceRate => resource_rate_tier(level).map(|t| t.cost),
            UpgradeKind::Capacity => capacity_tier(level).map(|t| t.cost),
            UpgradeKind::CraftSpeed => craft_speed_tier(level).map(|t| t.cost),
            UpgradeKind::Inventory => inventory_tier(level).map(|t| t.cost),
            UpgradeKind::CraftingSlots => crafting_slot_tier(level).map(|t| t.cost),
            UpgradeKind::SpawnRate => spawn_rate_tier(level).map(|t| t.cost),
        }
    }
}

impl std::fmt::Display for UpgradeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResourceRateTier {
    pub level: u8,
    pub regen_rate: f64,
    pub cost: u64,
}

pub const RESOURCE_RATE_TIERS: [ResourceRateTier; 8] = [
    ResourceRateTier { level: 1, regen_rate: 1.0, cost: 0 },
    ResourceRateTier { level: 2, regen_rate: 2.0, cost: 50 },
    ResourceRateTier { level: 3, regen_rate: 3.0, cost: 150 },
    ResourceRateTier { level: 4, regen_rate: 5.0, cost: 300 },
    ResourceRateTier { level: 5, regen_rate: 8.0, cost: 600 },
    ResourceRateTier { level: 6, regen_rate: 12.0, cost: 1200 },
    ResourceRateTier { level: 7, regen_rate: 18.0, cost: 2500 },
    ResourceRateTier { level: 8, regen_rate: 25.0, cost: 5000 },
];

#[derive(Debug, Clone, Copy)]
pub struct CapacityTier {
    pub level: u8,
    pub max_resources: f64,
    pub cost: u64,
}

pub const CAPACITY_TIERS: [CapacityTier; 8] = [
    CapacityTier { level: 1, max_resources: 100.0, cost: 0 },
    CapacityTier { level: 2, max_resources: 150.0, cost: 40 },
    CapacityTier { level: 3, max_resources: 250.0, cost: 120 },
    CapacityTier { level: 4, max_resources: 400.0, cost: 250 },
    CapacityTier { level: 5, max_resources: 650.0, cost: 500 },
    CapacityTier { level: 6, max_resources: 1000.0, cost: 1000 },
    CapacityTier { level: 7, max_resources: 1500.0, cost: 2000 },
    CapacityTier { level: 8, max_resources: 2500.0, cost: 4000 },
];

#[derive(Debug, Clone, Copy)]
pub struct CraftSpeedTier {
    pub level: u8,
    pub speed_multiplier: f64,
    pub cost: u64,
}

pub const CRAFT_SPEED_TIERS: [CraftSpeedTier; 8] = [
    CraftSpeedTier { level: 1, speed_multiplier: 1.0, cost: 0 },
    CraftSpeedTier { level: 2, speed_multiplier: 0.9, cost: 60 },
    CraftSpeedTier { level: 3, speed_multiplier: 0.8, cost: 180 },
    CraftSpeedTier { level: 4, speed_multiplier: 0.7, cost: 400 },
    CraftSpeedTier { level: 5, speed_multiplier: 0.6, cost: 800 },
    CraftSpeedTier { level: 6, speed_multiplier: 0.5, cost: 1600 },
    CraftSpeedTier { level: 7, speed_multiplier: 0.4, cost: 3200 },
    CraftSpeedTier { level: 8, speed_multiplier: 0.3, cost: 6400 },
];

#[derive(Debug, Clone, Copy)]
pub struct InventoryTier {
    pub level: u8,
    pub max_slots: u32,
    pub cost: u64,
}

pub const INVENTORY_TIERS: [InventoryTier; 8] = [
    InventoryTier { level: 1, max_slots: 50, cost: 0 },
    InventoryTier { level: 2, max_slots: 75, cost: 80 },
    InventoryTier { level: 3, max_slots: 100, cost: 200 },
    InventoryTier { level: 4, max_slots: 150, cost: 450 },
    InventoryTier { level: 5, max_slots: 200, cost: 900 },
    InventoryTier { level: 6, max_slots: 300, cost: 1800 },
    InventoryTier { level: 7, max_slots: 500, cost: 3600 },
    InventoryTier { level: 8, max_slots: 1000, cost: 7200 },
];

#[derive(Debug, Clone, Copy)]
pub struct CraftingSlotTier {
    pub level: u8,
    pub slots: u32,
    pub cost: u64,
}

pub const CRAFTING_SLOT_TIERS: [CraftingSlotTier; 6] = [
    CraftingSlotTier { level: 1, slots: 1, cost: 0 },
    CraftingSlotTier { level: 2, slots: 2, cost: 100 },
    CraftingSlotTier { level: 3, slots: 3, cost: 250 },
    CraftingSlotTier { level: 4, slots: 4, cost: 600 },
    CraftingSlotTier { level: 5, slots: 6, cost: 1400 },
    CraftingSlotTier { level: 6, slots: 8, cost: 3000 },
];

/// Spawn delay bounds in milliseconds; a fresh uniform delay is drawn from
/// [min, max] after every arrival-timer firing.
#[derive(Debug, Clone, Copy)]
pub struct SpawnRateTier {
    pub level: u8,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub cost: u64,
}

pub const SPAWN_RATE_TIERS: [SpawnRateTier; 6] = [
    SpawnRateTier { level: 1, min_delay_ms: 20_000, max_delay_ms: 40_000, cost: 0 },
    SpawnRateTier { level: 2, min_delay_ms: 16_000, max_delay_ms: 32_000, cost: 120 },
    SpawnRateTier { level: 3, min_delay_ms: 12_000, max_delay_ms: 26_000, cost: 350 },
    SpawnRateTier { level: 4, min_delay_ms: 9_000, max_delay_ms: 20_000, cost: 800 },
    SpawnRateTier { level: 5, min_delay_ms: 6_000, max_delay_ms: 15_000, cost: 1800 },
    SpawnRateTier { level: 6, min_delay_ms: 4_000, max_delay_ms: 10_000, cost: 4000 },
];

pub fn resource_rate_tier(level: u8) -> Option<&'static ResourceRateTier> {
    RESOURCE_RATE_TIERS.iter().find(|t| t.level == level)
}

pub fn capacity_tier(level: u8) -> Option<&'static CapacityTier> {
    CAPACITY_TIERS.iter().find(|t| t.level == level)
}

pub fn craft_speed_tier(level: u8) -> Option<&'static CraftSpeedTier> {
    CRAFT_SPEED_TIERS.iter().find(|t| t.level == level)
}

pub fn inventory_tier(level: u8) -> Option<&'static InventoryTier> {
    INVENTORY_TIERS.iter().find(|t| t.level == level)
}

pub fn crafting_slot_tier(level: u8) -> Option<&'static CraftingSlotTier> {
    CRAFTING_SLOT_TIERS.iter().find(|t| t.level == level)
}

pub fn spawn_rate_tier(level: u8) -> Option<&'static SpawnRateTier> {
    SPAWN_RATE_TIERS.iter().find(|t| t.level == level)
}
