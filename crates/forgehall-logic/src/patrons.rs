//! Customer (patron) leveling math.
//!
//! Patrons gain experience from purchases and level up through a geometric
//! cost ladder. The math is defensive: experience is clamped to finite,
//! non-negative values and the level is hard-capped so even pathological
//! persisted input terminates.

use serde::{Deserialize, Serialize};

/// Hard cap on patron level; guarantees termination for any input.
pub const MAX_PATRON_LEVEL: u32 = 100;

/// Experience required to advance from level 1 to level 2.
pub const BASE_LEVEL_COST: f64 = 100.0;

/// A resolved patron level with the experience still needed for the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatronLevel {
    pub level: u32,
    pub experience_to_next: u64,
}

/// Experience needed to advance from `level` to `level + 1`:
/// floor(100 × 1.5^(level−1)).
pub fn level_up_cost(level: u32) -> f64 {
    (BASE_LEVEL_COST * 1.5f64.powi(level.saturating_sub(1) as i32)).floor()
}

/// Resolve cumulative experience into a level and remaining
/// experience-to-next. Negative, NaN, and infinite experience behave as
/// zero experience; the level never exceeds [`MAX_PATRON_LEVEL`].
pub fn customer_level(experience: f64) -> PatronLevel {
    let mut remaining = if experience.is_finite() && experience > 0.0 {
        experience
    } else {
        0.0
    };
    let mut level = 1u32;
    loop {
        let cost = level_up_cost(level);
        if level >= MAX_PATRON_LEVEL || remaining < cost {
            let to_next = (cost - remaining).max(0.0);
            return PatronLevel {
                level,
                experience_to_next: to_next.ceil() as u64,
            };
        }
        remaining -= cost;
        level += 1;
    }
}
