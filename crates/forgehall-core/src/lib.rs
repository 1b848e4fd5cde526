//! Forgehall Core - crafting-shop simulation engine.
//!
//! An idle crafting game's state machine: a regenerating resource pool
//! funds trait allocations, a bounded-slot scheduler turns allocations
//! into inventory, and transient customers buy finished items for coins
//! that purchase permanent upgrades.
//!
//! # Architecture
//!
//! - **State**: [`state::GameState`] is the single aggregate root; every
//!   dynamic entity (jobs, items, the patron ledger) lives inside it.
//! - **Systems**: pure-ish functions over `(&mut GameState, now)` that the
//!   engine calls on its tick cadence ([`systems`]).
//! - **Engine**: [`engine::GameEngine`] serializes all timers and player
//!   commands through one writer and exposes the command/query surface.
//!
//! Time comes from an injected [`clock::Clock`] and randomness from a
//! seedable RNG, so a whole session can run deterministically.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use forgehall_core::prelude::*;
//! use forgehall_logic::catalog::ItemKind;
//! use forgehall_logic::traits::TraitVector;
//!
//! let mut engine = GameEngine::new(Arc::new(SystemClock));
//! let _ = engine.craft_item(ItemKind::Sword, TraitVector::new(10, 10, 10, 10), None, None);
//! loop {
//!     engine.update();
//! }
//! ```

pub mod clock;
pub mod commands;
pub mod customers;
pub mod engine;
pub mod generation;
pub mod persistence;
pub mod state;
pub mod systems;

/// Commonly used types for convenient importing.
pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::commands::{CommandError, CraftReceipt, SaleReceipt, UpgradeReceipt};
    pub use crate::customers::{Customer, PatronId, PatronLedger, PatronRecord};
    pub use crate::engine::GameEngine;
    pub use crate::persistence::SaveStore;
    pub use crate::state::{CraftedItem, CraftingJob, GameState, Millis};
}
