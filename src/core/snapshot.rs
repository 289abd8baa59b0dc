//! Read model handed to renderers and the automated opponent. A snapshot is
//! an owned copy; changing it never reaches the game.

use anyhow::Result;
use serde::Serialize;

use super::{
    board::{Piece, UnitId},
    game::{GameState, NexusInfo, PlayerState, Targeting},
    loc::Loc,
    side::{Side, SideArray},
    terrain::{Realm, Terrain},
    units::UnitKind,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitSummary {
    pub id: UnitId,
    pub kind: UnitKind,
    pub owner: Side,
    pub loc: Loc,
    pub realm: Realm,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub range: i32,
    pub speed: i32,
    pub actions_left: u32,
    pub move_bonus: i32,
    pub cooldowns: Vec<u32>,
    pub hidden: bool,
    pub ability_used_on: Option<u32>,
}

impl From<&Piece> for UnitSummary {
    fn from(piece: &Piece) -> Self {
        Self {
            id: piece.id,
            kind: piece.kind,
            owner: piece.side,
            loc: piece.loc,
            realm: piece.realm,
            hp: piece.hp,
            max_hp: piece.max_hp,
            attack: piece.attack,
            range: piece.range,
            speed: piece.speed,
            actions_left: piece.state.actions_left,
            move_bonus: piece.state.move_bonus,
            cooldowns: piece.state.cooldowns.to_vec(),
            hidden: piece.state.hidden_until.is_some(),
            ability_used_on: piece.state.ability_used_on,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellSnapshot {
    pub loc: Loc,
    pub terrain: Terrain,
    pub nexus: Option<Option<Side>>,
    pub spawner: Option<Side>,
    pub heart: Option<Side>,
    pub blocked: bool,
    pub overworld: Option<UnitSummary>,
    pub shadow: Option<UnitSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub cells: Vec<CellSnapshot>,
    pub players: SideArray<PlayerState>,
    pub side_to_move: Side,
    pub turn: u32,
    pub nexuses: Vec<NexusInfo>,
    pub winner: Option<Side>,
    pub selected: Option<UnitId>,
    pub targeting: Option<Targeting>,
}

impl Snapshot {
    pub fn of(state: &GameState) -> Self {
        let cells = state
            .board
            .cells()
            .map(|(loc, cell)| CellSnapshot {
                loc,
                terrain: cell.terrain,
                nexus: cell.nexus.map(|nexus| nexus.owner),
                spawner: cell.spawner,
                heart: cell.heart,
                blocked: cell.blocked_for_movement,
                overworld: cell.unit(Realm::Overworld).map(UnitSummary::from),
                shadow: cell.unit(Realm::Shadow).map(UnitSummary::from),
            })
            .collect();

        Self {
            cells,
            players: state.players.clone(),
            side_to_move: state.side_to_move,
            turn: state.turn,
            nexuses: state.nexuses.clone(),
            winner: state.winner,
            selected: state.selected,
            targeting: state.targeting,
        }
    }

    pub fn cell(&self, loc: &Loc) -> Option<&CellSnapshot> {
        if loc.in_bounds() {
            self.cells.get(loc.index())
        } else {
            None
        }
    }

    pub fn units(&self) -> impl Iterator<Item = &UnitSummary> {
        self.cells
            .iter()
            .flat_map(|cell| cell.overworld.iter().chain(cell.shadow.iter()))
    }

    pub fn units_of(&self, side: Side) -> impl Iterator<Item = &UnitSummary> {
        self.units().filter(move |unit| unit.owner == side)
    }

    pub fn unit(&self, id: UnitId) -> Option<&UnitSummary> {
        self.units().find(|unit| unit.id == id)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
