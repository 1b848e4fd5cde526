//! Forgehall Headless Simulation Harness
//!
//! Validates the pure logic crate and the live engine without any UI
//! shell. Runs entirely in-process: no files beyond the bundled balance
//! manifest, no timers, no rendering.
//!
//! Usage:
//!   cargo run -p forgehall-simtest
//!   cargo run -p forgehall-simtest -- --verbose

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

use forgehall_core::clock::ManualClock;
use forgehall_core::engine::GameEngine;
use forgehall_core::generation::{generate_customer, ROSTER};
use forgehall_core::customers::PatronLedger;
use forgehall_core::persistence::{load_game, save_game};
use forgehall_core::state::GameState;
use forgehall_core::systems::running_job_count;
use forgehall_logic::catalog::{ItemKind, TIERS};
use forgehall_logic::patrons::customer_level;
use forgehall_logic::progression::{item_level, next_level_threshold, CraftCounts};
use forgehall_logic::traits::{TraitKind, TraitVector};
use forgehall_logic::valuation::{
    craft_duration_ms, item_tier, item_value, quality_band, QualityBand,
};

// ── Balance manifest (the tuning sheet the catalog must agree with) ─────
const MANIFEST_JSON: &str = include_str!("../../../data/balance_manifest.json");

#[derive(Debug, Deserialize)]
struct BalanceSpec {
    kind: String,
    base_value: u32,
    base_craft_ms: u64,
    signature_trait: String,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed,
        detail: detail.into(),
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    if verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
    }

    println!("=== Forgehall Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Balance manifest vs. catalog
    results.extend(validate_balance_manifest(verbose));

    // 2. Progression sweep
    results.extend(validate_progression(verbose));

    // 3. Valuation monotonicity
    results.extend(validate_valuation(verbose));

    // 4. Probabilistic tier selection, in aggregate
    results.extend(validate_tier_rolls(verbose));

    // 5. Customer generation sweep
    results.extend(validate_customer_generation(verbose));

    // 6. Deterministic live session
    results.extend(validate_live_session(verbose));

    // 7. Persistence integrity
    results.extend(validate_persistence(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn kind_for(tag: &str) -> Option<ItemKind> {
    ItemKind::ALL
        .iter()
        .copied()
        .find(|k| k.label().eq_ignore_ascii_case(tag))
}

fn trait_for(tag: &str) -> Option<TraitKind> {
    TraitKind::ALL
        .iter()
        .copied()
        .find(|t| t.label().eq_ignore_ascii_case(tag))
}

// ── 1. Balance manifest ─────────────────────────────────────────────────

fn validate_balance_manifest(_verbose: bool) -> Vec<TestResult> {
    println!("--- Balance Manifest ---");
    let mut results = Vec::new();

    let manifest: Vec<BalanceSpec> = match serde_json::from_str(MANIFEST_JSON) {
        Ok(m) => m,
        Err(e) => {
            results.push(check(
                "manifest_parse",
                false,
                format!("JSON parse error: {}", e),
            ));
            return results;
        }
    };

    results.push(check(
        "manifest_covers_catalog",
        manifest.len() == ItemKind::ALL.len(),
        format!("{} entries for {} kinds", manifest.len(), ItemKind::ALL.len()),
    ));

    for spec in &manifest {
        let Some(kind) = kind_for(&spec.kind) else {
            results.push(check(
                &format!("manifest_{}", spec.kind),
                false,
                "unknown item kind",
            ));
            continue;
        };
        let def = kind.definition();
        let values_match = def.base_value == spec.base_value && def.base_craft_ms == spec.base_craft_ms;

        let signature = trait_for(&spec.signature_trait);
        let signature_matches = signature
            .map(|expected| {
                TraitKind::ALL.iter().all(|t| {
                    def.weights.weight(*t) <= def.weights.weight(expected)
                })
            })
            .unwrap_or(false);

        results.push(check(
            &format!("manifest_{}", spec.kind),
            values_match && signature_matches,
            format!(
                "value {} / craft {} ms / signature {}",
                def.base_value, def.base_craft_ms, spec.signature_trait
            ),
        ));
    }

    results
}

// ── 2. Progression ──────────────────────────────────────────────────────

fn validate_progression(_verbose: bool) -> Vec<TestResult> {
    println!("--- Progression ---");
    let mut results = Vec::new();

    let fixtures = [(0, 1), (10, 2), (25, 3), (50, 4), (100, 5), (5_000, 5)];
    let fixtures_hold = fixtures.iter().all(|(count, level)| item_level(*count) == *level);
    results.push(check(
        "item_level_fixtures",
        fixtures_hold,
        "thresholds 0/10/25/50/100 map to levels 1-5",
    ));

    let mut monotone = true;
    let mut previous = 0;
    for count in 0..=1_000 {
        let level = item_level(count);
        if level < previous || !(1..=5).contains(&level) {
            monotone = false;
            break;
        }
        previous = level;
    }
    results.push(check("item_level_monotone", monotone, "swept counts 0..=1000"));

    let next_ok = next_level_threshold(0) == Some(10)
        && next_level_threshold(10) == Some(25)
        && next_level_threshold(99) == Some(100)
        && next_level_threshold(100).is_none();
    results.push(check("next_threshold", next_ok, "10/25/50/100 ladder, none past 100"));

    let leveling_ok = {
        let fresh = customer_level(0.0);
        let second = customer_level(100.0);
        let pathological = customer_level(f64::INFINITY);
        fresh.level == 1
            && fresh.experience_to_next == 100
            && second.level == 2
            && customer_level(-50.0).level == 1
            && pathological.level <= 100
    };
    results.push(check(
        "patron_leveling",
        leveling_ok,
        "0 xp => level 1, 100 xp => level 2, junk input stays sane",
    ));

    results
}

// ── 3. Valuation ────────────────────────────────────────────────────────

fn validate_valuation(_verbose: bool) -> Vec<TestResult> {
    println!("--- Valuation ---");
    let mut results = Vec::new();

    let mut value_monotone = true;
    for kind in ItemKind::ALL {
        let mut previous = 0;
        for points in (0..200).step_by(10) {
            let traits = TraitVector::new(points, points, points, points);
            let value = item_value(kind, 1, &traits, None);
            if value < previous {
                value_monotone = false;
            }
            previous = value;
        }
    }
    results.push(check(
        "value_monotone_in_traits",
        value_monotone,
        "swept all kinds, 0..200 points per trait",
    ));

    let preferred_never_hurts = ItemKind::ALL.iter().all(|kind| {
        let traits = TraitVector::new(30, 10, 20, 5);
        let plain = item_value(*kind, 2, &traits, None);
        TraitKind::ALL
            .iter()
            .all(|t| item_value(*kind, 2, &traits, Some(*t)) >= plain)
    });
    results.push(check(
        "preferred_trait_bonus",
        preferred_never_hurts,
        "naming a preferred trait never lowers the value",
    ));

    let mut duration_ok = true;
    for kind in ItemKind::ALL {
        for level in 1..=5u8 {
            for tier in 1..=4u8 {
                for speed in [1.0, 0.7, 0.3, 0.0001] {
                    if craft_duration_ms(kind, level, tier, speed) < 100 {
                        duration_ok = false;
                    }
                }
            }
        }
        let l1 = craft_duration_ms(kind, 1, 1, 1.0);
        let l3 = craft_duration_ms(kind, 3, 1, 1.0);
        let t2 = craft_duration_ms(kind, 1, 2, 1.0);
        if l3 >= l1 || t2 <= l1 {
            duration_ok = false;
        }
    }
    results.push(check(
        "craft_duration_envelope",
        duration_ok,
        "floor 100 ms, faster per level, slower per tier",
    ));

    let bands_ok = quality_band(100) == QualityBand::Common
        && quality_band(101) == QualityBand::Uncommon
        && quality_band(150) == QualityBand::Uncommon
        && quality_band(151) == QualityBand::Rare
        && quality_band(200) == QualityBand::Rare
        && quality_band(201) == QualityBand::Legendary;
    results.push(check(
        "quality_bands",
        bands_ok,
        "strict cutoffs at 100/150/200",
    ));

    results
}

// ── 4. Tier rolls ───────────────────────────────────────────────────────

fn validate_tier_rolls(_verbose: bool) -> Vec<TestResult> {
    println!("--- Tier Selection ---");
    let mut results = Vec::new();

    // Expected tier must rise with weighted quality at equal spend. Sweep
    // the roll space evenly rather than sampling so the check is exact.
    let mean_tier = |kind: ItemKind, traits: &TraitVector| -> f64 {
        let mut sum = 0.0;
        let draws = 2_000;
        for i in 0..draws {
            sum += item_tier(kind, traits, 100, i as f64 / draws as f64) as f64;
        }
        sum / draws as f64
    };

    let weak = TraitVector::new(0, 0, 0, 240);
    let strong = TraitVector::new(0, 0, 240, 0);
    let weak_mean = mean_tier(ItemKind::Sword, &weak);
    let strong_mean = mean_tier(ItemKind::Sword, &strong);
    results.push(check(
        "tier_expectation_tracks_quality",
        strong_mean > weak_mean,
        format!("mean tier {:.2} (signature) vs {:.2} (off-trait)", strong_mean, weak_mean),
    ));

    let mut floors_respected = true;
    for tier_def in &TIERS {
        let just_below = tier_def.min_cost.saturating_sub(1);
        let per_trait = just_below / 4;
        let traits = TraitVector::new(per_trait, per_trait, per_trait, per_trait);
        for i in 0..200 {
            let rolled = item_tier(ItemKind::Armor, &traits, 1_000, i as f64 / 200.0);
            if rolled >= tier_def.tier && tier_def.tier > 1 {
                floors_respected = false;
            }
        }
    }
    results.push(check(
        "tier_cost_floors",
        floors_respected,
        "a roll never lands on a tier whose floor is unmet",
    ));

    let mut locks_respected = true;
    for i in 0..200 {
        let traits = TraitVector::new(100, 100, 100, 100);
        if item_tier(ItemKind::Sword, &traits, 9, i as f64 / 200.0) != 1 {
            locks_respected = false;
        }
    }
    results.push(check(
        "tier_unlock_gating",
        locks_respected,
        "below 10 crafts only tier 1 can roll",
    ));

    results
}

// ── 5. Customer generation ──────────────────────────────────────────────

fn validate_customer_generation(_verbose: bool) -> Vec<TestResult> {
    println!("--- Customer Generation ---");
    let mut results = Vec::new();

    let mut rng = StdRng::seed_from_u64(2024);
    let mut ledger = PatronLedger::new();
    let counts = CraftCounts::default();

    let mut all_valid = true;
    let mut names_on_roster = true;
    for i in 0..500 {
        let customer = generate_customer(&counts, &mut ledger, i, i * 1_000, &mut rng);
        if customer.reward < 1
            || customer.min_trait_value < 20
            || customer.patience_ms != 45_000
            || customer.arrived_at != i * 1_000
        {
            all_valid = false;
        }
        let secondary_ok = match customer.level {
            0..=2 => customer.secondary_demands.is_empty(),
            3..=6 => customer.secondary_demands.len() == 1,
            _ => customer.secondary_demands.len() == 2,
        };
        if !secondary_ok
            || customer
                .secondary_demands
                .iter()
                .any(|(t, _)| *t == customer.preferred_trait)
        {
            all_valid = false;
        }
        if !ROSTER.contains(&customer.name.as_str()) {
            names_on_roster = false;
        }
    }
    results.push(check(
        "customer_fields_valid",
        all_valid,
        "500 seeded customers: rewards, minimums, patience, secondaries",
    ));
    results.push(check(
        "customer_names_from_roster",
        names_on_roster,
        format!("ledger settled at {} patrons", ledger.len()),
    ));

    // Levels in the ledger drive harder demands.
    let mut leveled = PatronLedger::new();
    for name in ROSTER {
        let id = leveled.create_or_fetch(name);
        for _ in 0..40 {
            leveled.record_sale(id, 100.0);
        }
    }
    let mut seasoned_rng = StdRng::seed_from_u64(7);
    let seasoned =
        generate_customer(&counts, &mut leveled, 1, 0, &mut seasoned_rng);
    results.push(check(
        "seasoned_patrons_demand_more",
        seasoned.level >= 7 && seasoned.secondary_demands.len() == 2 && seasoned.min_trait_value > 40,
        format!(
            "level {} patron demands {} minimum with {} secondaries",
            seasoned.level,
            seasoned.min_trait_value,
            seasoned.secondary_demands.len()
        ),
    ));

    results
}

// ── 6. Live session ─────────────────────────────────────────────────────

fn validate_live_session(verbose: bool) -> Vec<TestResult> {
    println!("--- Live Session ---");
    let mut results = Vec::new();

    let clock = Arc::new(ManualClock::new(0));
    let mut engine = GameEngine::with_seed(clock.clone(), 99);

    let mut invariants_held = true;
    let mut crafted = 0u32;
    let mut sold = 0u32;

    for step in 0..6_000u64 {
        clock.advance(100);
        engine.update();

        let state = engine.state();
        let now = engine.now_ms();
        if running_job_count(state, now) > state.max_crafting_slots as usize
            || state.used_inventory_slots() > state.max_inventory_slots as usize
            || state.resources < 0.0
            || state.resources > state.max_resources
            || engine.customers().len() > 3
        {
            invariants_held = false;
        }

        // Keep the shop busy: craft cheap potions, sell to whoever wants one.
        if step % 20 == 0
            && engine
                .craft_item(ItemKind::Potion, TraitVector::new(4, 4, 4, 4), None, None)
                .is_ok()
        {
            crafted += 1;
        }
        let wanted: Vec<(u64, ItemKind)> = engine
            .customers()
            .iter()
            .map(|c| (c.id, c.kind))
            .collect();
        for (customer_id, kind) in wanted {
            let item = engine
                .state()
                .inventory
                .iter()
                .find(|i| i.kind == kind)
                .map(|i| i.id);
            if let Some(item_id) = item {
                if engine.sell_item(customer_id, item_id).is_ok() {
                    sold += 1;
                }
            }
        }
    }

    results.push(check(
        "session_invariants",
        invariants_held,
        "10 simulated minutes, invariants at every tick",
    ));
    results.push(check(
        "session_throughput",
        crafted > 20 && sold > 2,
        format!("{} crafts, {} sales, {} coins", crafted, sold, engine.state().coins),
    ));
    results.push(check(
        "session_earns_coins",
        engine.state().coins > 0,
        format!("{} coins banked", engine.state().coins),
    ));

    if verbose {
        println!(
            "    session: {} crafts, {} sales, {} coins, {} patrons",
            crafted,
            sold,
            engine.state().coins,
            engine.state().patrons.len()
        );
    }

    results
}

// ── 7. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(_verbose: bool) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();

    let mut state = GameState::new(1_000);
    state.coins = 345;
    state.craft_counts.set(ItemKind::Armor, 27);
    state.patrons.create_or_fetch("Throg the Mighty");

    let mut buffer = Vec::new();
    let saved = save_game(&mut buffer, &state, 2_000).is_ok();
    let roundtrip = load_game(&buffer[..]).map(|loaded| loaded == state) == Some(true);
    results.push(check(
        "save_roundtrip",
        saved && roundtrip,
        format!("{} byte envelope", buffer.len()),
    ));

    let mut tamper_resisted = true;
    for index in (0..buffer.len()).step_by(11) {
        let mut tampered = buffer.clone();
        tampered[index] ^= 0x01;
        if let Some(loaded) = load_game(&tampered[..]) {
            if loaded != state {
                tamper_resisted = false;
            }
        }
    }
    results.push(check(
        "tamper_detection",
        tamper_resisted,
        "bit flips across the stream never yield a mutated state",
    ));

    results.push(check(
        "garbage_is_absent",
        load_game(&b"mystery meat"[..]).is_none(),
        "unparseable stream loads as first run",
    ));

    results
}
