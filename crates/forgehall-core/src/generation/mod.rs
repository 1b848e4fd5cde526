//! Customer generation - names and demand rolls.

mod names;
mod patrons;

pub use names::*;
pub use patrons::*;
