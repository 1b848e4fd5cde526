//! Tick-driven systems that advance the simulation.

mod crafting;
mod economy;
mod patience;

pub use crafting::*;
pub use economy::*;
pub use patience::*;
