use std::collections::VecDeque;

use anyhow::{ensure, Context, Result};

use crate::core::{
    board::{Piece, UnitId},
    game::GameState,
    loc::{Loc, BOARD_CELLS},
    outcome::ActionOutcome,
    terrain::Realm,
    units::UnitDef,
};

impl GameState {
    /// Tiles a unit could move to this turn, in search order
    pub fn reachable(&self, id: UnitId) -> Result<Vec<Loc>> {
        let piece = self
            .unit(id)
            .with_context(|| format!("No unit with id {}", id))?;
        let def = self.def(piece.kind)?;
        Ok(self.reachable_from(piece, def))
    }

    /// Breadth-first search over orthogonal steps, bounded by the unit's
    /// movement for this turn
    pub(crate) fn reachable_from(&self, piece: &Piece, def: &UnitDef) -> Vec<Loc> {
        let budget = piece.movement();
        let mut visited = [false; BOARD_CELLS];
        let mut queue = VecDeque::new();
        let mut out = Vec::new();

        visited[piece.loc.index()] = true;
        queue.push_back((piece.loc, 0));

        while let Some((loc, dist)) = queue.pop_front() {
            if dist >= budget {
                continue;
            }
            for next in loc.neighbors4() {
                if visited[next.index()] || !self.can_enter(def, &next, piece.realm) {
                    continue;
                }
                visited[next.index()] = true;
                out.push(next);
                queue.push_back((next, dist + 1));
            }
        }
        out
    }

    pub fn move_unit(&mut self, id: UnitId, to: Loc) -> Result<ActionOutcome> {
        let piece = self.acting_piece(id)?;
        let (from, realm) = (piece.loc, piece.realm);

        let cell = self.board.get(&to)?;
        ensure!(cell.is_free(realm), "{} is occupied in the {}", to, realm);
        ensure!(
            realm == Realm::Shadow || !cell.blocked_for_movement,
            "{} is blocked",
            to
        );

        let def = self.def(piece.kind)?;
        ensure!(
            self.reachable_from(piece, def).contains(&to),
            "No path from {} to {}",
            from,
            to
        );

        self.board.relocate(&from, realm, &to, realm)?;
        if let Some(piece) = self.board.find_unit_mut(id) {
            piece.state.spend_action();
        }
        Ok(ActionOutcome::new(vec![from, to]))
    }
}
