/// Configuration options for the engine
use anyhow::{bail, Context, Result};

use crate::core::Side;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Seed for map generation; a fresh one is drawn per game when unset
    pub seed: Option<u64>,
    /// Whether protocol errors abort the driver
    pub strict_mode: bool,
    /// Side played by the automated opponent
    pub autoplay: Option<Side>,
    /// Maximum purchases the opponent makes per turn
    pub ai_spawns: usize,
}

impl EngineOptions {
    pub fn new(seed: Option<u64>, strict_mode: bool, autoplay: Option<Side>) -> Self {
        Self {
            seed,
            strict_mode,
            autoplay,
            ..Self::default()
        }
    }

    pub fn set_option(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "seed" => {
                self.seed = match value {
                    "none" => None,
                    _ => Some(value.parse().context("Invalid seed")?),
                }
            }
            "strictmode" => self.strict_mode = value.parse()?,
            "autoplay" => {
                self.autoplay = match value {
                    "none" => None,
                    _ => Some(value.parse()?),
                }
            }
            "aispawns" => self.ai_spawns = value.parse().context("Invalid spawn count")?,
            _ => bail!("Unknown option: {}", name),
        }

        Ok(())
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            seed: None,
            strict_mode: false,
            autoplay: None,
            ai_spawns: 2,
        }
    }
}
