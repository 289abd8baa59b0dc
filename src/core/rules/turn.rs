use anyhow::Result;
use log::debug;

use crate::core::{
    board::UnitId,
    game::GameState,
    side::Side,
    terrain::Realm,
};

impl GameState {
    /// Hand the move to the other player and run their start-of-turn upkeep
    pub fn end_turn(&mut self) -> Result<()> {
        self.ensure_in_progress()?;

        self.resolve_nexuses();
        if self.is_over() {
            return Ok(());
        }

        self.turn += 1;
        self.side_to_move = !self.side_to_move;
        let side = self.side_to_move;
        debug!("Turn {}: {} to move", self.turn, side);

        self.grant_stipend(side);
        if self.is_stalemated(side) {
            self.declare_winner(!side, "opponent has no units and no legal purchase");
            return Ok(());
        }

        self.return_from_shadow(side);

        let (turn, actions) = (self.turn, self.config.actions_per_turn);
        for piece in self.board.pieces_mut().filter(|piece| piece.side == side) {
            piece.state.refresh(turn, actions);
        }

        self.targeting = None;
        self.selected = None;
        Ok(())
    }

    fn grant_stipend(&mut self, side: Side) {
        let config = &self.config;
        let player = &mut self.players[side];
        if player.stipends_used < config.stipend_grants {
            player.energy = (player.energy + config.stipend_energy).min(config.energy_cap);
            player.stipends_used += 1;
        }
    }

    /// Out of stipends, out of units and unable to buy anything
    pub fn is_stalemated(&self, side: Side) -> bool {
        self.players[side].stipends_used >= self.config.stipend_grants
            && self.board.pieces_of(side).next().is_none()
            && !self.can_place_any(side)
    }

    fn return_from_shadow(&mut self, side: Side) {
        let turn = self.turn;
        let due: Vec<UnitId> = self
            .board
            .pieces_of(side)
            .filter(|piece| piece.realm == Realm::Shadow)
            .filter(|piece| piece.state.shadow_return_on.is_some_and(|on| turn >= on))
            .map(|piece| piece.id)
            .collect();

        for id in due {
            let Some(loc) = self.board.find_unit(id).map(|piece| piece.loc) else {
                continue;
            };
            if self.board.relocate(&loc, Realm::Shadow, &loc, Realm::Overworld).is_err() {
                debug!("Unit {} stays in the shadow at {}", id, loc);
                continue;
            }
            if let Some(piece) = self.board.find_unit_mut(id) {
                piece.state.shadow_return_on = None;
            }
        }
    }
}
