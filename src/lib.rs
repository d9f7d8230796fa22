//! Armory - weapon enhancement simulator
//!
//! Models a game's enhancement process: guaranteed and probabilistic upgrade
//! paths, downgrade and reset protection, material bookkeeping and an
//! autoplay loop that runs a strategy to a target level.

pub mod config;
pub mod data;
pub mod enhancement;
pub mod error;
pub mod session;
pub mod simulator;

pub use session::{Notice, Session, SessionSnapshot};
