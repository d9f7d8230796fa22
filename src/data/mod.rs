//! Reference data consumed by the simulator: weapons and cost tables.

pub mod cost_table;
pub mod loader;
pub mod numeric;
pub mod weapon;

pub use cost_table::*;
pub use loader::*;
pub use weapon::*;
