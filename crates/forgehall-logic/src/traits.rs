//! Trait identifiers and point allocations.
//!
//! Every crafting action distributes resource points across the four item
//! traits. The sum of an allocation is exactly the resource cost charged
//! for that action (one resource per trait point).

use serde::{Deserialize, Serialize};

/// The four craftable traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraitKind {
    Quality,
    Speed,
    Durability,
    Style,
}

impl TraitKind {
    /// All traits in display order.
    pub const ALL: [TraitKind; 4] = [
        TraitKind::Quality,
        TraitKind::Speed,
        TraitKind::Durability,
        TraitKind::Style,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            TraitKind::Quality => "Quality",
            TraitKind::Speed => "Speed",
            TraitKind::Durability => "Durability",
            TraitKind::Style => "Style",
        }
    }
}

impl std::fmt::Display for TraitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A point allocation across the four traits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitVector {
    pub quality: u32,
    pub speed: u32,
    pub durability: u32,
    pub style: u32,
}

impl TraitVector {
    pub fn new(quality: u32, speed: u32, durability: u32, style: u32) -> Self {
        Self {
            quality,
            speed,
            durability,
            style,
        }
    }

    /// Get the points allocated to one trait.
    pub fn get(&self, kind: TraitKind) -> u32 {
        match kind {
            TraitKind::Quality => self.quality,
            TraitKind::Speed => self.speed,
            TraitKind::Durability => self.durability,
            TraitKind::Style => self.style,
        }
    }

    /// Set the points allocated to one trait.
    pub fn set(&mut self, kind: TraitKind, value: u32) {
        match kind {
            TraitKind::Quality => self.quality = value,
            TraitKind::Speed => self.speed = value,
            TraitKind::Durability => self.durability = value,
            TraitKind::Style => self.style = value,
        }
    }

    /// Add points to one trait (saturating).
    pub fn add(&mut self, kind: TraitKind, amount: u32) {
        let current = self.get(kind);
        self.set(kind, current.saturating_add(amount));
    }

    /// Total points across all traits: the resource cost of this allocation.
    pub fn total(&self) -> u64 {
        self.quality as u64 + self.speed as u64 + self.durability as u64 + self.style as u64
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
