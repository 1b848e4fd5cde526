//! Visiting customers and the persistent patron ledger.
//!
//! A `Customer` exists only for one visit; what survives between visits is
//! the `PatronRecord`, keyed by a stable `PatronId` with a name index on
//! top (two visitors can never collide on id, and the roster lookup stays
//! by display name).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use forgehall_logic::catalog::ItemKind;
use forgehall_logic::patrons::customer_level;
use forgehall_logic::traits::TraitKind;
use forgehall_logic::valuation::DemandProfile;

use crate::state::{finite_or, Millis};

/// Stable identifier for a patron's persistent record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatronId(pub u64);

/// A customer currently browsing the shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: u64,
    pub patron: PatronId,
    pub name: String,
    pub kind: ItemKind,
    pub preferred_trait: TraitKind,
    pub min_trait_value: u32,
    /// Extra minimums on non-preferred traits; present only for seasoned
    /// patrons (level 3 and up).
    pub secondary_demands: Vec<(TraitKind, u32)>,
    pub reward: u64,
    pub patience_ms: u64,
    pub max_patience_ms: u64,
    pub arrived_at: Millis,
    /// Snapshot of the patron's level and experience at arrival.
    pub level: u32,
    pub experience: f64,
}

impl Customer {
    pub fn is_expired(&self, now: Millis) -> bool {
        now.saturating_sub(self.arrived_at) >= self.patience_ms
    }

    /// Milliseconds before this customer walks out.
    pub fn time_remaining(&self, now: Millis) -> u64 {
        self.patience_ms
            .saturating_sub(now.saturating_sub(self.arrived_at))
    }

    /// The demand profile used by allocation planning.
    pub fn demand_profile(&self) -> DemandProfile {
        DemandProfile {
            preferred: self.preferred_trait,
            min_preferred: self.min_trait_value,
            secondary: self.secondary_demands.clone(),
        }
    }
}

/// Persistent per-patron progression, updated on every successful sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatronRecord {
    pub name: String,
    pub level: u32,
    pub experience: f64,
    pub experience_to_next: u64,
    pub purchases: u64,
}

impl PatronRecord {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            level: 1,
            experience: 0.0,
            experience_to_next: 100,
            purchases: 0,
        }
    }
}

/// The patron database: records keyed by stable id, with a name index for
/// roster lookups. Records are created on first visit and never deleted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatronLedger {
    records: HashMap<PatronId, PatronRecord>,
    by_name: HashMap<String, PatronId>,
    next_id: u64,
}

impl PatronLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the id for a name, creating a fresh level-1 record on the
    /// first-ever visit.
    pub fn create_or_fetch(&mut self, name: &str) -> PatronId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = PatronId(self.next_id);
        self.next_id += 1;
        self.records.insert(id, PatronRecord::new(name));
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn get(&self, id: PatronId) -> Option<&PatronRecord> {
        self.records.get(&id)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Credit a sale: add experience, re-resolve the level, and bump the
    /// lifetime purchase count. Returns the updated record.
    pub fn record_sale(&mut self, id: PatronId, experience_gain: f64) -> Option<&PatronRecord> {
        let record = self.records.get_mut(&id)?;
        let gain = finite_or(experience_gain, 0.0);
        record.experience = finite_or(record.experience, 0.0) + gain;
        let resolved = customer_level(record.experience);
        record.level = resolved.level;
        record.experience_to_next = resolved.experience_to_next;
        record.purchases = record.purchases.saturating_add(1);
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_visit_creates_level_one_record() {
        let mut ledger = PatronLedger::new();
        let id = ledger.create_or_fetch("Sage Willowbrook");
        let record = ledger.get(id).unwrap();
        assert_eq!(record.level, 1);
        assert_eq!(record.experience, 0.0);
        assert_eq!(record.experience_to_next, 100);
        assert_eq!(record.purchases, 0);
    }

    #[test]
    fn repeat_visit_reuses_the_id() {
        let mut ledger = PatronLedger::new();
        let first = ledger.create_or_fetch("Grimm the Bold");
        let second = ledger.create_or_fetch("Grimm the Bold");
        assert_eq!(first, second);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn distinct_names_get_distinct_ids() {
        let mut ledger = PatronLedger::new();
        let a = ledger.create_or_fetch("Knight Valor");
        let b = ledger.create_or_fetch("Ranger Swift");
        assert_ne!(a, b);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn sale_grants_experience_and_levels_up() {
        let mut ledger = PatronLedger::new();
        let id = ledger.create_or_fetch("Baron Ashford");
        let record = ledger.record_sale(id, 120.0).unwrap();
        assert_eq!(record.level, 2);
        assert_eq!(record.purchases, 1);
        assert!(record.experience_to_next < 150);
    }

    #[test]
    fn sale_with_corrupt_experience_recovers() {
        let mut ledger = PatronLedger::new();
        let id = ledger.create_or_fetch("Mystic Maven");
        ledger.records.get_mut(&id).unwrap().experience = f64::NAN;
        let record = ledger.record_sale(id, 30.0).unwrap();
        assert_eq!(record.experience, 30.0);
        assert_eq!(record.level, 1);
    }

    #[test]
    fn sale_against_unknown_patron_is_none() {
        let mut ledger = PatronLedger::new();
        assert!(ledger.record_sale(PatronId(99), 10.0).is_none());
    }

    #[test]
    fn customer_expiry_window() {
        let customer = Customer {
            id: 1,
            patron: PatronId(0),
            name: "Lady Elara".into(),
            kind: ItemKind::Ring,
            preferred_trait: TraitKind::Style,
            min_trait_value: 30,
            secondary_demands: vec![],
            reward: 20,
            patience_ms: 45_000,
            max_patience_ms: 45_000,
            arrived_at: 10_000,
            level: 1,
            experience: 0.0,
        };
        assert!(!customer.is_expired(54_999));
        assert!(customer.is_expired(55_000));
        assert_eq!(customer.time_remaining(10_000), 45_000);
        assert_eq!(customer.time_remaining(55_000), 0);
    }
}
