use crate::core::game::GameState;
use crate::core::terrain::Realm;

impl GameState {
    /// Capture every nexus occupied by an enemy of its owner, then let each
    /// owned nexus deal one damage to the other player, at most once per
    /// nexus per game turn
    pub fn resolve_nexuses(&mut self) {
        for nexus in self.nexuses.iter_mut() {
            let Some(cell) = self.board.cell_mut(&nexus.loc) else {
                continue;
            };
            let occupant = cell.unit(Realm::Overworld).map(|unit| unit.side);
            if let (Some(side), Some(marker)) = (occupant, cell.nexus.as_mut()) {
                if marker.owner != Some(side) {
                    marker.owner = Some(side);
                    nexus.owner = Some(side);
                }
            }
        }

        let turn = self.turn;
        let owned: Vec<_> = self
            .nexuses
            .iter()
            .filter_map(|nexus| nexus.owner.map(|owner| (nexus.loc, owner)))
            .collect();
        for (loc, owner) in owned {
            let due = self
                .last_nexus_damage
                .get(&loc)
                .map_or(true, |last| *last < turn);
            if due {
                self.last_nexus_damage.insert(loc, turn);
                self.damage_player(owner.opponent(), 1, "nexus damage");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{
        board::Board,
        game::{GameConfig, GameState},
        loc::Loc,
        side::Side,
        terrain::Realm,
        units::UnitKind,
    };

    fn state_with_nexus() -> GameState {
        let mut board = Board::new();
        board.place_nexus(&Loc::new(3, 3)).unwrap();
        board.place_nexus(&Loc::new(7, 7)).unwrap();
        GameState::new(GameConfig::default(), board)
    }

    #[test]
    fn test_capture_and_damage_once_per_turn() {
        let mut state = state_with_nexus();
        state.place_unit(UnitKind::Scout, Side::P1, Loc::new(3, 3), Realm::Overworld).unwrap();

        state.resolve_nexuses();
        assert_eq!(state.nexuses[0].owner, Some(Side::P1));
        assert_eq!(state.board.get(&Loc::new(3, 3)).unwrap().nexus.unwrap().owner, Some(Side::P1));
        assert_eq!(state.player(Side::P2).hp, 19);

        state.resolve_nexuses();
        assert_eq!(state.player(Side::P2).hp, 19);

        state.turn += 1;
        state.resolve_nexuses();
        assert_eq!(state.player(Side::P2).hp, 18);
        assert_eq!(state.player(Side::P1).hp, 20);
    }

    #[test]
    fn test_shadow_occupant_does_not_capture() {
        let mut state = state_with_nexus();
        state.place_unit(UnitKind::Shade, Side::P2, Loc::new(7, 7), Realm::Shadow).unwrap();
        state.resolve_nexuses();
        assert!(state.nexuses.iter().all(|n| n.owner.is_none()));
    }

    #[test]
    fn test_recapture_switches_damage() {
        let mut state = state_with_nexus();
        let scout = state.place_unit(UnitKind::Scout, Side::P1, Loc::new(3, 3), Realm::Overworld).unwrap();
        state.resolve_nexuses();

        state.board.take_unit(&Loc::new(3, 3), Realm::Overworld);
        assert!(state.unit(scout).is_none());
        state.place_unit(UnitKind::Scout, Side::P2, Loc::new(3, 3), Realm::Overworld).unwrap();
        state.turn += 1;
        state.resolve_nexuses();

        assert_eq!(state.nexuses[0].owner, Some(Side::P2));
        assert_eq!(state.player(Side::P1).hp, 19);
        assert_eq!(state.player(Side::P2).hp, 19);
    }

    #[test]
    fn test_nexus_tick_can_decide_the_game() {
        let mut state = state_with_nexus();
        state.players[Side::P1].hp = 1;
        state.place_unit(UnitKind::Scout, Side::P2, Loc::new(7, 7), Realm::Overworld).unwrap();
        state.resolve_nexuses();
        assert_eq!(state.winner, Some(Side::P2));
    }
}
