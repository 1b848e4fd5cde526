//! Valuation, quality scoring, tier selection, and allocation planning.
//!
//! All functions here are pure. The one probabilistic operation,
//! [`item_tier`], takes a pre-drawn uniform roll instead of an RNG so the
//! crate stays dependency-free and a fixed roll yields a fixed outcome.

use serde::{Deserialize, Serialize};

use crate::catalog::ItemKind;
use crate::traits::{TraitKind, TraitVector};

/// Hard floor on any craft duration, in milliseconds.
pub const MIN_CRAFT_MS: u64 = 100;

/// Coin value of an item: base value scaled by the tier multiplier, plus
/// half a coin per trait point, plus a 30% bonus on the preferred trait's
/// points when a buyer's preference is known. Never negative.
pub fn item_value(
    kind: ItemKind,
    tier: u8,
    traits: &TraitVector,
    preferred: Option<TraitKind>,
) -> u64 {
    let def = kind.definition();
    let tier_def = kind.tier_info(tier);
    let mut value = def.base_value as f64 * tier_def.value_multiplier + traits.total() as f64 * 0.5;
    if let Some(p) = preferred {
        value += traits.get(p) as f64 * 0.3;
    }
    if !value.is_finite() {
        return 0;
    }
    value.max(0.0).floor() as u64
}

/// Quality score: the dot product of trait points and the kind's trait
/// weights. Emphasizes the kind's signature trait.
pub fn weighted_quality(kind: ItemKind, traits: &TraitVector) -> f64 {
    let weights = kind.definition().weights;
    let score: f64 = TraitKind::ALL
        .iter()
        .map(|t| traits.get(*t) as f64 * weights.weight(*t))
        .sum();
    if score.is_finite() {
        score.max(0.0)
    } else {
        0.0
    }
}

/// Pick a tier for a finished craft. Candidates are the tiers unlocked at
/// the craft count whose cost floor is met by the trait total. Tier 1 keeps
/// a fixed baseline weight of 1.0; tier k ≥ 2 is weighted by
/// `weighted_quality / cost_floor(k)`, so investing in well-weighted traits
/// shifts the expected tier upward while the draw stays probabilistic.
///
/// `roll` is a uniform sample in [0, 1); out-of-domain rolls clamp.
pub fn item_tier(kind: ItemKind, traits: &TraitVector, craft_count: u32, roll: f64) -> u8 {
    let total = traits.total();
    let candidates: Vec<_> = kind
        .available_tiers(craft_count)
        .iter()
        .filter(|t| t.min_cost as u64 <= total)
        .collect();
    if candidates.len() <= 1 {
        return 1;
    }

    let quality = weighted_quality(kind, traits);
    let weights: Vec<f64> = candidates
        .iter()
        .map(|t| {
            if t.tier == 1 {
                1.0
            } else {
                quality / t.min_cost.max(1) as f64
            }
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return 1;
    }

    let roll = if roll.is_finite() {
        roll.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut threshold = roll * sum;
    for (tier, weight) in candidates.iter().zip(&weights) {
        threshold -= weight;
        if threshold <= 0.0 {
            return tier.tier;
        }
    }
    candidates.last().map(|t| t.tier).unwrap_or(1)
}

/// Discrete quality bands over total trait points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityBand {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl QualityBand {
    pub fn label(&self) -> &'static str {
        match self {
            QualityBand::Common => "Common",
            QualityBand::Uncommon => "Uncommon",
            QualityBand::Rare => "Rare",
            QualityBand::Legendary => "Legendary",
        }
    }
}

impl std::fmt::Display for QualityBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Band for a total trait-point count. Cutoffs are strict greater-than:
/// 100 points is still Common, 101 is Uncommon.
pub fn quality_band(total_points: u64) -> QualityBand {
    if total_points > 200 {
        QualityBand::Legendary
    } else if total_points > 150 {
        QualityBand::Rare
    } else if total_points > 100 {
        QualityBand::Uncommon
    } else {
        QualityBand::Common
    }
}

/// What a customer demands of an item: one preferred trait with a minimum,
/// and possibly secondary minimums on other traits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandProfile {
    pub preferred: TraitKind,
    pub min_preferred: u32,
    pub secondary: Vec<(TraitKind, u32)>,
}

/// A planned trait allocation and its true resource cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPlan {
    pub traits: TraitVector,
    pub total_cost: u64,
}

/// Plan an allocation that comfortably satisfies a demand profile:
/// 1.5× the preferred minimum, 1.2× each secondary minimum, any remaining
/// budget spread evenly across untouched traits, and the preferred trait
/// padded up to the tier's cost floor if the plan falls short of it.
///
/// Never fails: with zero or negative budget the minimum viable allocation
/// is returned with its true cost, which may exceed what the caller can
/// afford; affordability is the caller's check.
pub fn optimal_traits(
    demand: &DemandProfile,
    available: f64,
    kind: ItemKind,
    tier: u8,
) -> AllocationPlan {
    let tier_def = kind.tier_info(tier);
    let mut traits = TraitVector::default();

    traits.set(demand.preferred, demand.min_preferred.saturating_mul(3) / 2);
    for (trait_kind, minimum) in &demand.secondary {
        if *trait_kind == demand.preferred {
            continue;
        }
        traits.set(*trait_kind, minimum.saturating_mul(6) / 5);
    }

    let available = if available.is_finite() && available > 0.0 {
        available.floor() as u64
    } else {
        0
    };
    let surplus = available.saturating_sub(traits.total());
    let unallocated: Vec<TraitKind> = TraitKind::ALL
        .iter()
        .copied()
        .filter(|t| traits.get(*t) == 0)
        .collect();
    if surplus > 0 && !unallocated.is_empty() {
        let share = (surplus / unallocated.len() as u64).min(u32::MAX as u64) as u32;
        if share > 0 {
            for trait_kind in unallocated {
                traits.add(trait_kind, share);
            }
        }
    }

    let total = traits.total();
    if total < tier_def.min_cost as u64 {
        traits.add(demand.preferred, (tier_def.min_cost as u64 - total) as u32);
    }

    AllocationPlan {
        total_cost: traits.total(),
        traits,
    }
}

/// Craft-speed bonus from item level: 10% faster per level, floored at half
/// the base time.
pub fn level_bonus(level: u8) -> f64 {
    (1.0 - level.saturating_sub(1) as f64 * 0.1).max(0.5)
}

/// Craft duration for a kind at a given level and tier under a speed
/// multiplier. Higher levels craft faster, higher tiers slower; the result
/// never drops below [`MIN_CRAFT_MS`] no matter how extreme the inputs.
pub fn craft_duration_ms(kind: ItemKind, level: u8, tier: u8, speed_multiplier: f64) -> u64 {
    let def = kind.definition();
    let tier_def = kind.tier_info(tier);
    let speed = if speed_multiplier.is_finite() && speed_multiplier > 0.0 {
        speed_multiplier
    } else {
        1.0
    };
    let duration = def.base_craft_ms as f64 * tier_def.time_factor * speed * level_bonus(level);
    if !duration.is_finite() {
        return MIN_CRAFT_MS;
    }
    (duration.floor() as u64).max(MIN_CRAFT_MS)
}
