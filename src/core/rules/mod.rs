//! Rules of the game, as methods on `GameState`. Every action validates all of
//! its preconditions before touching the state, so an `Err` means nothing
//! changed.

pub mod abilities;
pub mod combat;
pub mod movement;
pub mod nexus;
pub mod spawn;
pub mod targeting;
pub mod turn;

pub use combat::{in_attack_range, Target};

use anyhow::{ensure, Context, Result};

use super::{
    board::{Piece, UnitId},
    game::GameState,
    loc::Loc,
    terrain::Realm,
    units::UnitDef,
};

impl GameState {
    /// A unit that may act right now: it exists, belongs to the side to move
    /// and has actions left
    pub(crate) fn acting_piece(&self, id: UnitId) -> Result<&Piece> {
        self.ensure_in_progress()?;
        let piece = self
            .unit(id)
            .with_context(|| format!("No unit with id {}", id))?;
        ensure!(
            piece.side == self.side_to_move,
            "Unit {} belongs to {}, but {} is to move",
            id,
            piece.side,
            self.side_to_move
        );
        ensure!(piece.state.can_act(), "Unit {} has no actions left", id);
        Ok(piece)
    }

    /// Whether a unit of the given archetype may stand on a tile in a realm.
    /// The shadow realm ignores structures and terrain.
    pub fn can_enter(&self, def: &UnitDef, loc: &Loc, realm: Realm) -> bool {
        match self.board.cell(loc) {
            None => false,
            Some(cell) => {
                cell.is_free(realm)
                    && (realm == Realm::Shadow
                        || (!cell.blocked_for_movement && def.can_enter(cell.terrain)))
            }
        }
    }
}
