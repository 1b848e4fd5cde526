//! Crafting queue advancement: slot assignment, completion, and
//! materialization into the inventory.
//!
//! The queue is strictly FIFO. Only the first N jobs (N = max crafting
//! slots) are eligible to run; a job further back never starts or
//! completes while an earlier job holds its slot, no matter how much
//! wall-clock time passes.

use crate::state::{CraftedItem, GameState, Millis};

/// Advance the crafting queue to `now`. Returns the items materialized
/// this tick (already appended to the inventory).
pub fn advance_crafting(state: &mut GameState, now: Millis) -> Vec<CraftedItem> {
    let window = state.max_crafting_slots.max(1) as usize;

    // Start any eligible job that is still waiting for its slot.
    for job in state.crafting_queue.iter_mut().take(window) {
        if job.started_at.is_none() {
            job.started_at = Some(now);
        }
    }

    // Completion is judged against the window as it stood at tick entry;
    // a job promoted by a removal this tick starts next tick.
    let completed_ids: Vec<u64> = state
        .crafting_queue
        .iter()
        .take(window)
        .filter(|job| job.is_complete(now))
        .map(|job| job.id)
        .collect();

    let mut completed = Vec::with_capacity(completed_ids.len());
    for id in completed_ids {
        if let Some(index) = state.crafting_queue.iter().position(|j| j.id == id) {
            let job = state.crafting_queue.remove(index);
            state.craft_counts.increment(job.kind);
            let item = CraftedItem {
                id: job.id,
                kind: job.kind,
                traits: job.traits,
                tier: job.tier,
                level: job.level,
                crafted_at: now,
            };
            state.inventory.push(item.clone());
            completed.push(item);
        }
    }
    completed
}

/// Jobs currently holding a slot: started and not yet past their duration.
pub fn running_job_count(state: &GameState, now: Millis) -> usize {
    state
        .crafting_queue
        .iter()
        .filter(|job| job.started_at.is_some() && !job.is_complete(now))
        .count()
}
