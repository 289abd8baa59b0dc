//! Nexus - rules engine for a two-player turn-based tactics game

pub mod ai;
pub mod core;
pub mod engine;
pub mod protocol;

// Re-export commonly used items
pub use crate::core::game::{GameConfig, GameState};
pub use crate::engine::{Engine, EngineOptions};
