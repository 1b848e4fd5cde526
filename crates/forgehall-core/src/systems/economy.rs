//! Resource regeneration.
//!
//! Regen is driven by elapsed wall-clock time, never by tick counts, so a
//! slow or backgrounded shell neither under- nor over-grants resources.
//! The same routine performs the catch-up after a reload: the gap since
//! `last_update` is simply a long elapsed interval.

use crate::state::{GameState, Millis, INITIAL_RESOURCES};

/// Advance the resource pool to `now`.
///
/// Sanitizes the three economy numerics before use (persisted state may be
/// stale or corrupted): resources reset to 0, capacity to 100, rate to 1.
/// A clock that moved backwards re-anchors `last_update` without granting
/// anything.
pub fn apply_regen(state: &mut GameState, now: Millis) {
    if !state.resources.is_finite() || state.resources < 0.0 {
        state.resources = 0.0;
    }
    if !state.max_resources.is_finite() || state.max_resources <= 0.0 {
        state.max_resources = INITIAL_RESOURCES;
    }
    if !state.resource_regen_rate.is_finite() || state.resource_regen_rate < 0.0 {
        state.resource_regen_rate = 1.0;
    }

    if now < state.last_update {
        state.last_update = now;
        return;
    }

    let elapsed_ms = now - state.last_update;
    if elapsed_ms == 0 {
        return;
    }

    let gained = state.resource_regen_rate * (elapsed_ms as f64 / 1000.0);
    state.resources = (state.resources + gained).min(state.max_resources);
    state.last_update = now;
}
