//! Board representation: the grid of cells and the units standing on it

pub mod cell;
pub mod piece;

pub use cell::{Cell, Nexus};
pub use piece::{Piece, PieceState, UnitId, MAX_ABILITIES};

use anyhow::{anyhow, ensure, Context, Result};

use super::{
    convert::ToIndex,
    loc::{Loc, BOARD_CELLS},
    side::Side,
    terrain::{Realm, Terrain},
};

/// Fixed-size grid of cells. Only bounds checking and realm-parameterized slot
/// access live here; game rules are layered on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Vec<Cell>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// An all-plain board without markers or units
    pub fn new() -> Self {
        Self {
            cells: vec![Cell::default(); BOARD_CELLS],
        }
    }

    pub fn in_bounds(&self, loc: &Loc) -> bool {
        loc.in_bounds()
    }

    pub fn cell(&self, loc: &Loc) -> Option<&Cell> {
        if loc.in_bounds() {
            self.cells.get(loc.index())
        } else {
            None
        }
    }

    pub fn cell_mut(&mut self, loc: &Loc) -> Option<&mut Cell> {
        if loc.in_bounds() {
            self.cells.get_mut(loc.index())
        } else {
            None
        }
    }

    /// Cell lookup that fails on out-of-bounds locations
    pub fn get(&self, loc: &Loc) -> Result<&Cell> {
        self.cell(loc)
            .ok_or_else(|| anyhow!("{} is off the board", loc))
    }

    pub fn get_mut(&mut self, loc: &Loc) -> Result<&mut Cell> {
        self.cell_mut(loc)
            .ok_or_else(|| anyhow!("{} is off the board", loc))
    }

    pub fn cells(&self) -> impl Iterator<Item = (Loc, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, cell)| (Loc::from_index(i), cell))
    }

    pub fn terrain(&self, loc: &Loc) -> Option<Terrain> {
        self.cell(loc).map(|cell| cell.terrain)
    }

    pub fn set_terrain(&mut self, loc: &Loc, terrain: Terrain) -> Result<()> {
        self.get_mut(loc)?.terrain = terrain;
        Ok(())
    }

    pub fn unit(&self, loc: &Loc, realm: Realm) -> Option<&Piece> {
        self.cell(loc).and_then(|cell| cell.unit(realm))
    }

    pub fn unit_mut(&mut self, loc: &Loc, realm: Realm) -> Option<&mut Piece> {
        self.cell_mut(loc).and_then(|cell| cell.units[realm].as_mut())
    }

    pub fn is_free(&self, loc: &Loc, realm: Realm) -> bool {
        self.cell(loc).is_some_and(|cell| cell.is_free(realm))
    }

    /// Place a piece into the slot named by its own location and realm
    pub fn put_unit(&mut self, piece: Piece) -> Result<()> {
        let cell = self.get_mut(&piece.loc)?;
        let slot = &mut cell.units[piece.realm];
        ensure!(
            slot.is_none(),
            "{} slot at {} is already occupied",
            piece.realm,
            piece.loc
        );
        *slot = Some(piece);
        Ok(())
    }

    pub fn take_unit(&mut self, loc: &Loc, realm: Realm) -> Option<Piece> {
        self.cell_mut(loc).and_then(|cell| cell.units[realm].take())
    }

    /// Move a piece between slots, keeping its location and realm in sync
    pub fn relocate(&mut self, from: &Loc, realm: Realm, to: &Loc, to_realm: Realm) -> Result<()> {
        ensure!(self.is_free(to, to_realm), "Destination {} is not free", to);
        let mut piece = self
            .take_unit(from, realm)
            .with_context(|| format!("No {} unit at {}", realm, from))?;
        piece.loc = *to;
        piece.realm = to_realm;
        self.put_unit(piece)
    }

    /// All pieces in both realms, in row-major order with the overworld first
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.cells
            .iter()
            .flat_map(|cell| cell.units.iter().filter_map(|slot| slot.as_ref()))
    }

    pub fn pieces_mut(&mut self) -> impl Iterator<Item = &mut Piece> {
        self.cells
            .iter_mut()
            .flat_map(|cell| cell.units.iter_mut().filter_map(|slot| slot.as_mut()))
    }

    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = &Piece> {
        self.pieces().filter(move |piece| piece.side == side)
    }

    pub fn find_unit(&self, id: UnitId) -> Option<&Piece> {
        self.pieces().find(|piece| piece.id == id)
    }

    pub fn find_unit_mut(&mut self, id: UnitId) -> Option<&mut Piece> {
        self.pieces_mut().find(|piece| piece.id == id)
    }

    pub fn place_spawner(&mut self, loc: &Loc, side: Side) -> Result<()> {
        let cell = self.get_mut(loc)?;
        ensure!(cell.spawner.is_none(), "{} already holds a spawner", loc);
        cell.spawner = Some(side);
        cell.blocked_for_movement = true;
        Ok(())
    }

    pub fn place_heart(&mut self, loc: &Loc, side: Side) -> Result<()> {
        let cell = self.get_mut(loc)?;
        ensure!(cell.heart.is_none(), "{} already holds a heart", loc);
        cell.heart = Some(side);
        cell.blocked_for_movement = true;
        Ok(())
    }

    pub fn place_nexus(&mut self, loc: &Loc) -> Result<()> {
        let cell = self.get_mut(loc)?;
        ensure!(cell.nexus.is_none(), "{} already holds a nexus", loc);
        cell.nexus = Some(Nexus::default());
        Ok(())
    }

    pub fn spawner_of(&self, side: Side) -> Option<Loc> {
        self.cells()
            .find(|(_, cell)| cell.spawner == Some(side))
            .map(|(loc, _)| loc)
    }

    pub fn heart_of(&self, side: Side) -> Option<Loc> {
        self.cells()
            .find(|(_, cell)| cell.heart == Some(side))
            .map(|(loc, _)| loc)
    }

    pub fn nexus_locs(&self) -> Vec<Loc> {
        self.cells()
            .filter(|(_, cell)| cell.nexus.is_some())
            .map(|(loc, _)| loc)
            .collect()
    }

    /// Whether any spawner, heart or nexus lies within the given Chebyshev radius
    pub fn near_marker(&self, loc: &Loc, radius: i32) -> bool {
        loc.block(radius)
            .iter()
            .filter_map(|l| self.cell(l))
            .any(|cell| cell.has_marker())
    }

    /// Count of cells per terrain, in `Terrain` index order
    pub fn terrain_counts(&self) -> [usize; 5] {
        let mut counts = [0; 5];
        for slot in self.cells.iter().filter_map(|cell| cell.terrain.to_index().ok()) {
            counts[slot] += 1;
        }
        counts
    }
}
