//! Command receipts and the validation-rejection taxonomy.
//!
//! Rejections are expected, non-exceptional outcomes: each carries a
//! human-readable reason for the shell to display and leaves the game
//! state untouched.

use thiserror::Error;

use forgehall_logic::catalog::ItemKind;
use forgehall_logic::upgrades::UpgradeKind;

/// Why a player command was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("tier {tier} of {kind} is not unlocked yet")]
    TierLocked { kind: ItemKind, tier: u8 },

    #[error("{total} trait points is below the {tier_name} floor of {floor}")]
    BelowTierFloor {
        tier_name: &'static str,
        floor: u32,
        total: u64,
    },

    #[error("not enough resources: need {needed}, have {available}")]
    InsufficientResources { needed: u64, available: u64 },

    #[error("all {slots} crafting slots are busy")]
    CraftingSlotsFull { slots: u32 },

    #[error("inventory and queue are full ({used}/{capacity} slots)")]
    InventoryFull { used: u32, capacity: u32 },

    #[error("not enough coins: need {needed}, have {available}")]
    InsufficientCoins { needed: u64, available: u64 },

    #[error("{kind} is already at its highest level")]
    UpgradeMaxed { kind: UpgradeKind },

    #[error("customer {0} is no longer in the shop")]
    UnknownCustomer(u64),

    #[error("item {0} is not in the inventory")]
    UnknownItem(u64),
}

/// Outcome of a successful craft request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CraftReceipt {
    pub job_id: u64,
    pub kind: ItemKind,
    pub tier: u8,
    pub level: u8,
    pub cost: u64,
    pub duration_ms: u64,
}

/// Outcome of a successful sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleReceipt {
    pub customer_id: u64,
    pub item_id: u64,
    pub coins_earned: u64,
    /// Portion of the payout that came from exceeding the preferred-trait
    /// minimum by half again.
    pub bonus: u64,
    pub patron_level: u32,
}

/// Outcome of a successful upgrade purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeReceipt {
    pub kind: UpgradeKind,
    pub new_level: u8,
    pub cost: u64,
}
