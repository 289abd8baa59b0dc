//! Automated opponent. It sees the game only through snapshots and acts only
//! through the engine's command surface.
mod opponent;

pub use opponent::{Opponent, TurnSummary};
