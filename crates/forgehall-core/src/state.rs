//! The game-state aggregate and the dynamic crafting entities.
//!
//! `GameState` is the single aggregate root: every mutation flows through
//! the engine's tick and command handlers, and everything here serializes
//! for the save file. Visible customers are deliberately absent: they are
//! ephemeral per visit and do not survive a reload.

use serde::{Deserialize, Serialize};

use forgehall_logic::catalog::ItemKind;
use forgehall_logic::progression::CraftCounts;
use forgehall_logic::traits::TraitVector;
use forgehall_logic::upgrades::{
    capacity_tier, crafting_slot_tier, inventory_tier, resource_rate_tier, UpgradeKind,
    CAPACITY_TIERS, CRAFTING_SLOT_TIERS, INVENTORY_TIERS, RESOURCE_RATE_TIERS,
};

use crate::customers::PatronLedger;

/// Wall-clock milliseconds. Timestamps, never tick counts, are the source
/// of truth for every time-based quantity.
pub type Millis = u64;

/// Starting resource pool and capacity.
pub const INITIAL_RESOURCES: f64 = 100.0;

/// Fallback spawn delay used before the arrival timer has ever fired.
pub const DEFAULT_SPAWN_DELAY_MS: u64 = 30_000;

/// Clamp a float to a finite, non-negative value.
pub(crate) fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        fallback
    }
}

/// A finished item sitting in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftedItem {
    pub id: u64,
    pub kind: ItemKind,
    pub traits: TraitVector,
    pub tier: u8,
    pub level: u8,
    pub crafted_at: Millis,
}

/// A crafting job in the FIFO queue. `started_at` stays `None` until the
/// job enters the slot window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftingJob {
    pub id: u64,
    pub kind: ItemKind,
    pub traits: TraitVector,
    pub tier: u8,
    pub level: u8,
    pub enqueued_at: Millis,
    pub started_at: Option<Millis>,
    pub duration_ms: u64,
}

impl CraftingJob {
    /// Whether the job's full duration has elapsed. Unstarted jobs are
    /// never complete.
    pub fn is_complete(&self, now: Millis) -> bool {
        match self.started_at {
            Some(started) => now.saturating_sub(started) >= self.duration_ms,
            None => false,
        }
    }

    /// Completion fraction in [0, 1] for display.
    pub fn progress(&self, now: Millis) -> f64 {
        match self.started_at {
            Some(started) if self.duration_ms > 0 => {
                let elapsed = now.saturating_sub(started) as f64;
                (elapsed / self.duration_ms as f64).min(1.0)
            }
            Some(_) => 1.0,
            None => 0.0,
        }
    }

    /// Milliseconds until completion; zero for finished or unstarted jobs
    /// report the full duration.
    pub fn remaining_ms(&self, now: Millis) -> u64 {
        match self.started_at {
            Some(started) => self
                .duration_ms
                .saturating_sub(now.saturating_sub(started)),
            None => self.duration_ms,
        }
    }
}

/// The aggregate game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub resources: f64,
    pub max_resources: f64,
    pub coins: u64,
    pub inventory: Vec<CraftedItem>,
    pub crafting_queue: Vec<CraftingJob>,
    pub craft_counts: CraftCounts,
    pub last_update: Millis,
    pub resource_regen_rate: f64,
    pub resource_upgrade_level: u8,
    pub capacity_upgrade_level: u8,
    pub craft_speed_upgrade_level: u8,
    pub inventory_upgrade_level: u8,
    pub crafting_slot_upgrade_level: u8,
    pub spawn_rate_upgrade_level: u8,
    pub max_inventory_slots: u32,
    pub max_crafting_slots: u32,
    pub next_customer_at: Millis,
    pub next_id: u64,
    pub patrons: PatronLedger,
}

impl GameState {
    /// A fresh first-run state anchored at `now`.
    pub fn new(now: Millis) -> Self {
        Self {
            resources: INITIAL_RESOURCES,
            max_resources: INITIAL_RESOURCES,
            coins: 0,
            inventory: Vec::new(),
            crafting_queue: Vec::new(),
            craft_counts: CraftCounts::default(),
            last_update: now,
            resource_regen_rate: 1.0,
            resource_upgrade_level: 1,
            capacity_upgrade_level: 1,
            craft_speed_upgrade_level: 1,
            inventory_upgrade_level: 1,
            crafting_slot_upgrade_level: 1,
            spawn_rate_upgrade_level: 1,
            max_inventory_slots: INVENTORY_TIERS[0].max_slots,
            max_crafting_slots: CRAFTING_SLOT_TIERS[0].slots,
            next_customer_at: now + DEFAULT_SPAWN_DELAY_MS,
            next_id: 1,
            patrons: PatronLedger::default(),
        }
    }

    /// Allocate the next entity id (shared by jobs, items, and customers).
    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Slots consumed by finished items plus pending jobs.
    pub fn used_inventory_slots(&self) -> usize {
        self.inventory.len() + self.crafting_queue.len()
    }

    pub fn upgrade_level(&self, kind: UpgradeKind) -> u8 {
        match kind {
            UpgradeKind::ResourceRate => self.resource_upgrade_level,
            UpgradeKind::Capacity => self.capacity_upgrade_level,
            UpgradeKind::CraftSpeed => self.craft_speed_upgrade_level,
            UpgradeKind::Inventory => self.inventory_upgrade_level,
            UpgradeKind::CraftingSlots => self.crafting_slot_upgrade_level,
            UpgradeKind::SpawnRate => self.spawn_rate_upgrade_level,
        }
    }

    /// Repair a state that may have come from stale or tampered storage.
    ///
    /// Non-finite or negative numerics reset to safe defaults, upgrade
    /// levels clamp to their tables (and re-derive the caps they control),
    /// and start times on jobs parked beyond the slot window are cleared so
    /// the slot invariant holds from the first tick.
    pub fn sanitize(&mut self) {
        self.resource_upgrade_level = self
            .resource_upgrade_level
            .clamp(1, RESOURCE_RATE_TIERS.len() as u8);
        self.capacity_upgrade_level = self
            .capacity_upgrade_level
            .clamp(1, CAPACITY_TIERS.len() as u8);
        self.craft_speed_upgrade_level = self
            .craft_speed_upgrade_level
            .clamp(1, forgehall_logic::upgrades::CRAFT_SPEED_TIERS.len() as u8);
        self.inventory_upgrade_level = self
            .inventory_upgrade_level
            .clamp(1, INVENTORY_TIERS.len() as u8);
        self.crafting_slot_upgrade_level = self
            .crafting_slot_upgrade_level
            .clamp(1, CRAFTING_SLOT_TIERS.len() as u8);
        self.spawn_rate_upgrade_level = self
            .spawn_rate_upgrade_level
            .clamp(1, forgehall_logic::upgrades::SPAWN_RATE_TIERS.len() as u8);

        // Levels are authoritative for the caps they control.
        if let Some(tier) = resource_rate_tier(self.resource_upgrade_level) {
            self.resource_regen_rate = tier.regen_rate;
        }
        if let Some(tier) = capacity_tier(self.capacity_upgrade_level) {
            self.max_resources = tier.max_resources;
        }
        if let Some(tier) = inventory_tier(self.inventory_upgrade_level) {
            self.max_inventory_slots = tier.max_slots;
        }
        if let Some(tier) = crafting_slot_tier(self.crafting_slot_upgrade_level) {
            self.max_crafting_slots = tier.slots;
        }

        self.max_resources = finite_or(self.max_resources, INITIAL_RESOURCES).max(1.0);
        self.resources = finite_or(self.resources, 0.0).min(self.max_resources);
        self.resource_regen_rate = finite_or(self.resource_regen_rate, 1.0);

        let window = self.max_crafting_slots.max(1) as usize;
        for job in self.crafting_queue.iter_mut().skip(window) {
            job.started_at = None;
        }

        let highest = self
            .inventory
            .iter()
            .map(|i| i.id)
            .chain(self.crafting_queue.iter().map(|j| j.id))
            .max()
            .unwrap_or(0);
        if self.next_id <= highest {
            self.next_id = highest + 1;
        }
    }
}
