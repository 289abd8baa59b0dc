//! Game configuration and the mutable game state aggregate

use std::collections::HashMap;

use anyhow::{ensure, Context, Result};
use log::info;
use rand::Rng;
use serde::Serialize;

use super::{
    board::{Board, Piece, UnitId},
    loc::Loc,
    mapgen,
    side::{Side, SideArray},
    terrain::Realm,
    units::{Catalog, UnitDef, UnitKind},
};

/// Static rules configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub actions_per_turn: u32,
    pub starting_hp: i32,
    pub starting_energy: i32,
    pub stipend_energy: i32,
    pub stipend_grants: u32,
    pub energy_cap: i32,
    pub nexus_pairs: usize,
    pub heal_amount: i32,
    pub dash_bonus: i32,
    pub bombard_range: i32,
    pub nexus_radius: i32,
    pub nexus_fallback_radius: i32,
    pub mapgen_attempts: u32,
    pub smoothing_passes: u32,
    pub catalog: Catalog,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            actions_per_turn: 2,
            starting_hp: 20,
            starting_energy: 10,
            stipend_energy: 5,
            stipend_grants: 10,
            energy_cap: 50,
            nexus_pairs: 2,
            heal_amount: 3,
            dash_bonus: 2,
            bombard_range: 2,
            nexus_radius: 3,
            nexus_fallback_radius: 2,
            mapgen_attempts: 12,
            smoothing_passes: 3,
            catalog: Catalog::standard(),
        }
    }
}

/// Per-player economy and structure locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerState {
    pub hp: i32,
    pub energy: i32,
    pub stipends_used: u32,
    /// Archetypes bought this game, in purchase order
    pub purchased: Vec<UnitKind>,
    pub spawner: Option<Loc>,
    pub heart: Option<Loc>,
}

impl PlayerState {
    pub fn new(hp: i32, energy: i32) -> Self {
        Self {
            hp,
            energy,
            stipends_used: 0,
            purchased: Vec::new(),
            spawner: None,
            heart: None,
        }
    }

    pub fn has_purchased(&self, kind: UnitKind) -> bool {
        self.purchased.contains(&kind)
    }
}

/// Entry of the nexus registry, mirrored from the board markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NexusInfo {
    pub loc: Loc,
    pub owner: Option<Side>,
}

/// Pending two-step ability invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Targeting {
    pub unit: UnitId,
    pub ability: usize,
}

/// State of a game in progress
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub board: Board,
    pub players: SideArray<PlayerState>,
    /// Advances by one on every end of turn, regardless of side
    pub turn: u32,
    pub side_to_move: Side,
    pub nexuses: Vec<NexusInfo>,
    pub winner: Option<Side>,
    /// Game turn on which each nexus last dealt damage
    pub last_nexus_damage: HashMap<Loc, u32>,
    pub targeting: Option<Targeting>,
    pub selected: Option<UnitId>,
    next_unit_id: UnitId,
}

impl GameState {
    /// Start a game on a prepared board. Structures are read off the board
    /// markers.
    pub fn new(config: GameConfig, board: Board) -> Self {
        let players = SideArray::new(
            Self::initial_player(&config, &board, Side::P1),
            Self::initial_player(&config, &board, Side::P2),
        );
        let nexuses = board
            .cells()
            .filter_map(|(loc, cell)| cell.nexus.map(|nexus| NexusInfo { loc, owner: nexus.owner }))
            .collect();

        Self {
            config,
            board,
            players,
            turn: 1,
            side_to_move: Side::P1,
            nexuses,
            winner: None,
            last_nexus_damage: HashMap::new(),
            targeting: None,
            selected: None,
            next_unit_id: 1,
        }
    }

    /// Start a game on a freshly generated map
    pub fn generate<R: Rng>(config: GameConfig, rng: &mut R) -> Self {
        let board = mapgen::generate(&config, rng);
        Self::new(config, board)
    }

    fn initial_player(config: &GameConfig, board: &Board, side: Side) -> PlayerState {
        let mut player = PlayerState::new(config.starting_hp, config.starting_energy);
        player.spawner = board.spawner_of(side);
        player.heart = board.heart_of(side);
        player
    }

    pub fn player(&self, side: Side) -> &PlayerState {
        &self.players[side]
    }

    pub fn def(&self, kind: UnitKind) -> Result<&UnitDef> {
        self.config.catalog.lookup(kind)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Piece> {
        self.board.find_unit(id)
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn ensure_in_progress(&self) -> Result<()> {
        ensure!(self.winner.is_none(), "Game is already over");
        Ok(())
    }

    pub(crate) fn allocate_id(&mut self) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id += 1;
        id
    }

    /// Put a unit on the board without any economy or adjacency checks.
    /// Used to set up positions.
    pub fn place_unit(&mut self, kind: UnitKind, side: Side, loc: Loc, realm: Realm) -> Result<UnitId> {
        let actions = self.config.actions_per_turn;
        let def = self.def(kind)?;
        let mut piece = Piece::new(0, def, side, loc, actions);
        piece.realm = realm;

        ensure!(self.board.is_free(&loc, realm), "Cannot place {} at {}", kind, loc);
        piece.id = self.allocate_id();
        let id = piece.id;
        self.board
            .put_unit(piece)
            .with_context(|| format!("Placing {} at {}", kind, loc))?;
        Ok(id)
    }

    pub fn declare_winner(&mut self, side: Side, cause: &str) {
        if self.winner.is_none() {
            info!("{} wins on turn {} ({})", side, self.turn, cause);
            self.winner = Some(side);
        }
    }

    /// Remove hp from a player, flooring at zero. The attacking side wins when
    /// the victim reaches zero.
    pub(crate) fn damage_player(&mut self, victim: Side, amount: i32, cause: &str) {
        let player = &mut self.players[victim];
        player.hp = (player.hp - amount).max(0);
        if player.hp == 0 {
            self.declare_winner(victim.opponent(), cause);
        }
    }
}
