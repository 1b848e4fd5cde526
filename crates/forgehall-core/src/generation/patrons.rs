//! Customer generation.
//!
//! Customers are drawn from the unlocked item kinds and the name roster,
//! with demands that scale with the visiting patron's persistent level.
//! Generation never fails: every intermediate is clamped to a finite,
//! non-negative value so corrupt persisted records degrade to safe
//! defaults instead of propagating.

use rand::seq::SliceRandom;
use rand::Rng;

use forgehall_logic::catalog::ItemKind;
use forgehall_logic::patrons::MAX_PATRON_LEVEL;
use forgehall_logic::progression::{unlocked_item_kinds, CraftCounts};
use forgehall_logic::traits::TraitKind;

use crate::customers::{Customer, PatronLedger};
use crate::generation::names::ROSTER;
use crate::state::{finite_or, Millis};

/// How long a customer browses before leaving unsold.
pub const CUSTOMER_PATIENCE_MS: u64 = 45_000;

/// Chance of preferring a roster name that has never visited before.
/// Tunable; the remaining 30% re-rolls over the whole roster, which is
/// what makes repeat visitors possible.
pub const NEW_FACE_BIAS: f64 = 0.7;

/// Generate one customer. The caller supplies the entity id and owns the
/// population cap; the patron record is created or fetched here so the
/// customer always carries a live snapshot of its level and experience.
pub fn generate_customer(
    counts: &CraftCounts,
    ledger: &mut PatronLedger,
    id: u64,
    now: Millis,
    rng: &mut impl Rng,
) -> Customer {
    // Unlocked kinds drive demand; before anything is unlocked (a ledger
    // from a save predating the unlock table) fall back to the full set.
    let unlocked = unlocked_item_kinds(counts);
    let kinds: &[ItemKind] = if unlocked.is_empty() {
        &ItemKind::ALL
    } else {
        &unlocked
    };
    let kind = kinds[rng.gen_range(0..kinds.len())];
    let preferred = TraitKind::ALL[rng.gen_range(0..TraitKind::ALL.len())];

    let fresh: Vec<&'static str> = ROSTER
        .iter()
        .copied()
        .filter(|n| !ledger.contains_name(n))
        .collect();
    let name = if !fresh.is_empty() && rng.gen_bool(NEW_FACE_BIAS) {
        fresh[rng.gen_range(0..fresh.len())]
    } else {
        ROSTER[rng.gen_range(0..ROSTER.len())]
    };

    let patron = ledger.create_or_fetch(name);
    let (level, experience) = match ledger.get(patron) {
        Some(record) => (
            record.level.clamp(1, MAX_PATRON_LEVEL),
            finite_or(record.experience, 0.0),
        ),
        None => (1, 0.0),
    };

    let min_trait_value = preferred_minimum(level, rng);
    let secondary_demands = secondary_minimums(level, preferred, rng);
    let reward = reward_for(kind, level, min_trait_value, secondary_demands.len());

    Customer {
        id,
        patron,
        name: name.to_string(),
        kind,
        preferred_trait: preferred,
        min_trait_value,
        secondary_demands,
        reward,
        patience_ms: CUSTOMER_PATIENCE_MS,
        max_patience_ms: CUSTOMER_PATIENCE_MS,
        arrived_at: now,
        level,
        experience,
    }
}

/// floor(20 + level×5 + uniform(0, 10 + level×2))
fn preferred_minimum(level: u32, rng: &mut impl Rng) -> u32 {
    let level = level as f64;
    let spread = 10.0 + level * 2.0;
    let value = 20.0 + level * 5.0 + rng.gen_range(0.0..spread);
    finite_or(value, 20.0).floor() as u32
}

/// No secondary demands below level 3, one through level 6, two beyond;
/// each minimum is floor(15 + level×3 + uniform(0, 10)) on a distinct
/// non-preferred trait.
fn secondary_minimums(
    level: u32,
    preferred: TraitKind,
    rng: &mut impl Rng,
) -> Vec<(TraitKind, u32)> {
    let wanted = match level {
        0..=2 => 0,
        3..=6 => 1,
        _ => 2,
    };
    if wanted == 0 {
        return Vec::new();
    }

    let others: Vec<TraitKind> = TraitKind::ALL
        .iter()
        .copied()
        .filter(|t| *t != preferred)
        .collect();
    others
        .choose_multiple(rng, wanted)
        .map(|t| {
            let value = 15.0 + level as f64 * 3.0 + rng.gen_range(0.0..10.0);
            (*t, finite_or(value, 15.0).floor() as u32)
        })
        .collect()
}

/// floor(base × (1 + level×0.2) × (1 + min/50) × (1 + 0.3×secondaries)),
/// never below one coin.
fn reward_for(kind: ItemKind, level: u32, min_trait_value: u32, secondaries: usize) -> u64 {
    let base = kind.definition().base_value as f64;
    let reward = base
        * (1.0 + level as f64 * 0.2)
        * (1.0 + min_trait_value as f64 / 50.0)
        * (1.0 + 0.3 * secondaries as f64);
    finite_or(reward, 1.0).floor().max(1.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn fresh_ledger_yields_level_one_customers() {
        let mut rng = seeded();
        let mut ledger = PatronLedger::new();
        let customer = generate_customer(&CraftCounts::default(), &mut ledger, 1, 5_000, &mut rng);
        assert_eq!(customer.level, 1);
        assert!(customer.secondary_demands.is_empty());
        assert_eq!(customer.patience_ms, CUSTOMER_PATIENCE_MS);
        assert_eq!(customer.arrived_at, 5_000);
        assert!(customer.reward >= 1);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn only_unlocked_kinds_are_demanded() {
        let mut rng = seeded();
        let mut ledger = PatronLedger::new();
        for i in 0..200 {
            let c = generate_customer(&CraftCounts::default(), &mut ledger, i, 0, &mut rng);
            assert!(matches!(c.kind, ItemKind::Sword | ItemKind::Potion));
        }
    }

    #[test]
    fn unlock_progress_widens_demand() {
        let mut rng = seeded();
        let mut ledger = PatronLedger::new();
        let mut counts = CraftCounts::default();
        counts.sword = 20;
        counts.potion = 20;
        let kinds: std::collections::HashSet<_> = (0..500)
            .map(|i| generate_customer(&counts, &mut ledger, i, 0, &mut rng).kind)
            .collect();
        assert!(kinds.contains(&ItemKind::Armor));
        assert!(kinds.contains(&ItemKind::Bow));
        assert!(kinds.contains(&ItemKind::Ring));
    }

    #[test]
    fn preferred_minimum_scales_with_level() {
        let mut rng = seeded();
        // Level 1: 20 + 5 + [0, 12) => [25, 37)
        for _ in 0..200 {
            let min = preferred_minimum(1, &mut rng);
            assert!((25..37).contains(&min));
        }
        // Level 10: 20 + 50 + [0, 30) => [70, 100)
        for _ in 0..200 {
            let min = preferred_minimum(10, &mut rng);
            assert!((70..100).contains(&min));
        }
    }

    #[test]
    fn secondary_demands_follow_level_bands() {
        let mut rng = seeded();
        for _ in 0..50 {
            assert!(secondary_minimums(1, TraitKind::Quality, &mut rng).is_empty());
            assert_eq!(secondary_minimums(3, TraitKind::Quality, &mut rng).len(), 1);
            assert_eq!(secondary_minimums(6, TraitKind::Quality, &mut rng).len(), 1);
            assert_eq!(secondary_minimums(7, TraitKind::Quality, &mut rng).len(), 2);
        }
    }

    #[test]
    fn secondary_demands_avoid_the_preferred_trait() {
        let mut rng = seeded();
        for preferred in TraitKind::ALL {
            for _ in 0..50 {
                let demands = secondary_minimums(9, preferred, &mut rng);
                assert_eq!(demands.len(), 2);
                assert_ne!(demands[0].0, demands[1].0);
                for (t, min) in demands {
                    assert_ne!(t, preferred);
                    assert!(min >= 15);
                }
            }
        }
    }

    #[test]
    fn reward_scales_with_demands() {
        let base = reward_for(ItemKind::Sword, 1, 25, 0);
        let higher_level = reward_for(ItemKind::Sword, 5, 25, 0);
        let pickier = reward_for(ItemKind::Sword, 1, 50, 0);
        let fussier = reward_for(ItemKind::Sword, 1, 25, 2);
        assert!(higher_level > base);
        assert!(pickier > base);
        assert!(fussier > base);
        assert!(reward_for(ItemKind::Potion, 0, 0, 0) >= 1);
    }

    #[test]
    fn repeat_names_accumulate_in_one_record() {
        let mut rng = seeded();
        let mut ledger = PatronLedger::new();
        for i in 0..400 {
            generate_customer(&CraftCounts::default(), &mut ledger, i, 0, &mut rng);
        }
        // The roster is finite, so the ledger saturates at roster size.
        assert!(ledger.len() <= ROSTER.len());
        assert!(ledger.len() > ROSTER.len() / 2);
    }

    #[test]
    fn snapshot_reflects_ledger_record() {
        let mut rng = seeded();
        let mut ledger = PatronLedger::new();
        // Seed every roster name so generation always picks a known patron.
        let ids: Vec<_> = ROSTER.iter().map(|n| ledger.create_or_fetch(n)).collect();
        for id in &ids {
            ledger.record_sale(*id, 150.0);
        }
        let customer = generate_customer(&CraftCounts::default(), &mut ledger, 1, 0, &mut rng);
        assert_eq!(customer.level, 2);
        assert!(customer.experience > 0.0);
        assert_eq!(customer.secondary_demands.len(), 0);
    }
}
