//! Enhancement simulation: outcome model, bookkeeping and autoplay.

pub mod autoplay;
pub mod history;
pub mod ledger;
pub mod logic;
pub mod persistence;
pub mod resolver;
pub mod strategy;
pub mod types;
#[cfg(feature = "worker")]
pub mod worker;

pub use autoplay::*;
pub use history::*;
pub use ledger::*;
pub use logic::*;
pub use persistence::*;
pub use resolver::*;
pub use strategy::*;
pub use types::*;
