use crate::core::{
    ActionOutcome, Catalog, GameConfig, GameState, Loc, Side, Snapshot, UnitDef, UnitId, UnitKind,
};

use super::options::EngineOptions;

use anyhow::Result;
use log::{debug, error, info};
use rand::{rngs::StdRng, SeedableRng};

/// Engine owns the game state and is the single entry point for commands.
/// Commands report success as a bool; rejected commands change nothing.
pub struct Engine {
    pub state: GameState,
    pub options: EngineOptions,
    seed: u64,
    last_outcome: Option<ActionOutcome>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create a new engine with default options and a freshly generated game
    pub fn new() -> Self {
        Self::with_options(GameConfig::default(), EngineOptions::default())
    }

    pub fn with_options(config: GameConfig, options: EngineOptions) -> Self {
        let seed = options.seed.unwrap_or_else(rand::random);
        let state = Self::generate(config, seed);
        Self {
            state,
            options,
            seed,
            last_outcome: None,
        }
    }

    /// Wrap an already prepared game
    pub fn from_state(state: GameState, options: EngineOptions) -> Self {
        Self {
            state,
            seed: options.seed.unwrap_or_default(),
            options,
            last_outcome: None,
        }
    }

    fn generate(config: GameConfig, seed: u64) -> GameState {
        info!("New game with seed {}", seed);
        let mut rng = StdRng::seed_from_u64(seed);
        GameState::generate(config, &mut rng)
    }

    /// Seed of the current map
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Regenerate the map and reset players, units, turn and winner
    pub fn reset_game(&mut self) {
        self.new_game(self.options.seed);
    }

    pub fn new_game(&mut self, seed: Option<u64>) {
        let seed = seed.unwrap_or_else(rand::random);
        let config = self.state.config.clone();
        self.state = Self::generate(config, seed);
        self.seed = seed;
        self.last_outcome = None;
    }

    pub fn set_option(&mut self, name: &str, value: &str) -> Result<()> {
        self.options.set_option(name, value)
    }

    fn accept(&mut self, what: &str, result: Result<ActionOutcome>) -> bool {
        match result {
            Ok(outcome) => {
                self.last_outcome = Some(outcome);
                true
            }
            Err(err) => {
                debug!("Rejected {}: {:#}", what, err);
                false
            }
        }
    }

    /// Buy a unit for a player next to their spawner
    pub fn spawn(&mut self, kind: UnitKind, loc: Loc, side: Side) -> bool {
        if self.state.config.catalog.get(kind).is_none() {
            error!("Catalog has no entry for {}", kind);
            return false;
        }
        let result = self
            .state
            .spawn(kind, loc, side)
            .map(|_| ActionOutcome::single(loc));
        self.accept("spawn", result)
    }

    pub fn move_unit(&mut self, id: UnitId, loc: Loc) -> bool {
        let result = self.state.move_unit(id, loc);
        self.accept("move", result)
    }

    pub fn attack(&mut self, id: UnitId, loc: Loc) -> bool {
        let result = self.state.attack(id, loc);
        self.accept("attack", result)
    }

    pub fn use_ability(&mut self, id: UnitId, ability: usize, target: Option<Loc>) -> bool {
        let result = self.state.use_ability(id, ability, target);
        self.accept("ability", result)
    }

    pub fn end_turn(&mut self) {
        if let Err(err) = self.state.end_turn() {
            debug!("Rejected end turn: {:#}", err);
        }
    }

    pub fn select(&mut self, id: UnitId) -> bool {
        match self.state.select(id) {
            Ok(()) => true,
            Err(err) => {
                debug!("Rejected select: {:#}", err);
                false
            }
        }
    }

    pub fn deselect(&mut self) {
        self.state.deselect();
    }

    pub fn begin_targeting(&mut self, id: UnitId, ability: usize) -> bool {
        match self.state.begin_targeting(id, ability) {
            Ok(()) => true,
            Err(err) => {
                debug!("Rejected targeting: {:#}", err);
                false
            }
        }
    }

    pub fn commit_targeting(&mut self, loc: Loc) -> bool {
        let result = self.state.commit_targeting(loc);
        self.accept("targeted ability", result)
    }

    pub fn cancel_targeting(&mut self) {
        self.state.cancel_targeting();
    }

    /// Tiles changed by the last successful command
    pub fn last_outcome(&self) -> Option<&ActionOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::of(&self.state)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.state.config.catalog
    }

    pub fn config(&self) -> &GameConfig {
        &self.state.config
    }

    pub fn purchasable(&self, side: Side) -> Vec<&UnitDef> {
        self.state.purchasable(side)
    }

    pub fn spawn_tiles(&self, kind: UnitKind, side: Side) -> Vec<Loc> {
        self.state.spawn_tiles(kind, side)
    }

    pub fn reachable(&self, id: UnitId) -> Vec<Loc> {
        self.state.reachable(id).unwrap_or_default()
    }

    pub fn attack_targets(&self, id: UnitId) -> Vec<Loc> {
        self.state.attack_targets(id).unwrap_or_default()
    }

    pub fn side_to_move(&self) -> Side {
        self.state.side_to_move
    }

    pub fn winner(&self) -> Option<Side> {
        self.state.winner
    }
}
