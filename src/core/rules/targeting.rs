use anyhow::{ensure, Context, Result};

use crate::core::{
    board::UnitId,
    game::{GameState, Targeting},
    loc::Loc,
    outcome::ActionOutcome,
    units::{Ability, AbilityKind},
};

impl GameState {
    /// Hold a unit of the side to move as the current selection
    pub fn select(&mut self, id: UnitId) -> Result<()> {
        self.ensure_in_progress()?;
        let piece = self
            .unit(id)
            .with_context(|| format!("No unit with id {}", id))?;
        ensure!(piece.side == self.side_to_move, "Unit {} is not yours", id);
        self.selected = Some(id);
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.selected = None;
        self.targeting = None;
    }

    /// First step of a targeted ability: remember the pending invocation
    pub fn begin_targeting(&mut self, id: UnitId, ability: usize) -> Result<()> {
        let (_, def, _, _) = self.ability_gate(id, ability)?;
        if let Some(Ability { kind: AbilityKind::Active { target, .. }, name, .. }) = def.ability(ability) {
            ensure!(target.takes_tile(), "{} does not take a target", name);
        }
        self.selected = Some(id);
        self.targeting = Some(Targeting { unit: id, ability });
        Ok(())
    }

    /// Second step: resolve the pending ability against a tile. The pending
    /// state survives a failed attempt so another tile can be tried.
    pub fn commit_targeting(&mut self, loc: Loc) -> Result<ActionOutcome> {
        let pending = self.targeting.context("No ability is waiting for a target")?;
        let outcome = self.use_ability(pending.unit, pending.ability, Some(loc))?;
        self.targeting = None;
        Ok(outcome)
    }

    pub fn cancel_targeting(&mut self) {
        self.targeting = None;
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{
        board::Board, game::{GameConfig, GameState}, loc::Loc, side::Side, terrain::Realm, units::UnitKind,
    };

    #[test]
    fn test_targeting_round_trip() {
        let mut state = GameState::new(GameConfig::default(), Board::new());
        let archer = state.place_unit(UnitKind::Archer, Side::P1, Loc::new(5, 5), Realm::Overworld).unwrap();
        let enemy = state.place_unit(UnitKind::Scout, Side::P2, Loc::new(5, 2), Realm::Overworld).unwrap();

        state.begin_targeting(archer, 0).unwrap();
        assert!(state.targeting.is_some());

        assert!(state.commit_targeting(Loc::new(0, 0)).is_err());
        assert!(state.targeting.is_some());
        assert_eq!(state.unit(archer).unwrap().state.actions_left, 2);

        state.commit_targeting(Loc::new(5, 2)).unwrap();
        assert!(state.targeting.is_none());
        assert_eq!(state.unit(enemy).unwrap().hp, 1);
    }

    #[test]
    fn test_targeting_gates() {
        let mut state = GameState::new(GameConfig::default(), Board::new());
        let scout = state.place_unit(UnitKind::Scout, Side::P2, Loc::new(5, 5), Realm::Overworld).unwrap();
        assert!(state.begin_targeting(scout, 0).is_err());
        assert!(state.select(scout).is_err());

        let archer = state.place_unit(UnitKind::Archer, Side::P1, Loc::new(1, 1), Realm::Overworld).unwrap();
        assert!(state.begin_targeting(archer, 1).is_err());
        state.begin_targeting(archer, 0).unwrap();
        state.cancel_targeting();
        assert!(state.targeting.is_none());
        assert!(state.commit_targeting(Loc::new(1, 2)).is_err());

        let dasher = state.place_unit(UnitKind::Scout, Side::P1, Loc::new(8, 8), Realm::Overworld).unwrap();
        assert!(state.begin_targeting(dasher, 0).is_err());
        assert!(state.targeting.is_none());
        state.use_ability(dasher, 0, None).unwrap();

        state.select(archer).unwrap();
        state.winner = Some(Side::P2);
        state.deselect();
        assert!(state.select(archer).is_err());
        assert!(state.selected.is_none());
    }
}
