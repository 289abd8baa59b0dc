use anyhow::{ensure, Context, Result};
use log::debug;

use crate::core::{
    board::{Piece, UnitId},
    game::GameState,
    loc::Loc,
    side::Side,
    terrain::Realm,
    units::{UnitDef, UnitKind},
};

impl GameState {
    /// Check that a tile may receive a freshly bought unit of the given
    /// archetype for a player
    pub fn check_spawnable(&self, def: &UnitDef, side: Side, loc: &Loc) -> Result<()> {
        let cell = self.board.get(loc)?;
        ensure!(cell.is_free(Realm::Overworld), "{} is occupied", loc);
        ensure!(!cell.has_marker(), "{} holds a structure", loc);
        ensure!(!cell.blocked_for_movement, "{} is blocked", loc);
        ensure!(
            def.can_spawn_on(cell.terrain),
            "{} cannot be placed on {}",
            def.name,
            cell.terrain
        );

        let spawner = self.players[side]
            .spawner
            .with_context(|| format!("{} has no spawner", side))?;
        ensure!(
            spawner.chebyshev(loc) <= 1,
            "{} is not next to the spawner of {}",
            loc,
            side
        );
        Ok(())
    }

    /// Buy a unit and place it next to the player's spawner
    pub fn spawn(&mut self, kind: UnitKind, loc: Loc, side: Side) -> Result<UnitId> {
        self.ensure_in_progress()?;
        let def = self.def(kind)?;
        ensure!(!def.summon_only, "{} cannot be bought", def.name);
        self.check_spawnable(def, side, &loc)?;
        ensure!(
            self.players[side].energy >= def.cost,
            "{} cannot afford {} ({} < {})",
            side,
            def.name,
            self.players[side].energy,
            def.cost
        );

        let mut piece = Piece::new(0, def, side, loc, self.config.actions_per_turn);
        let cost = def.cost;
        piece.id = self.allocate_id();
        let id = piece.id;
        self.board.put_unit(piece)?;

        let player = &mut self.players[side];
        player.energy -= cost;
        if !player.has_purchased(kind) {
            player.purchased.push(kind);
        }
        debug!("{} spawned {} #{} at {}", side, kind, id, loc);
        Ok(id)
    }

    /// Tiles where the player could place an archetype right now, ignoring cost
    pub fn spawn_tiles(&self, kind: UnitKind, side: Side) -> Vec<Loc> {
        let (Some(def), Some(spawner)) = (self.config.catalog.get(kind), self.players[side].spawner) else {
            return Vec::new();
        };
        spawner
            .block(1)
            .into_iter()
            .filter(|loc| self.check_spawnable(def, side, loc).is_ok())
            .collect()
    }

    /// Whether the player can afford and legally place any buyable archetype
    pub fn can_place_any(&self, side: Side) -> bool {
        let energy = self.players[side].energy;
        self.config
            .catalog
            .purchasable()
            .filter(|def| def.cost <= energy)
            .any(|def| !self.spawn_tiles(def.kind, side).is_empty())
    }

    /// What the shop offers a player: buyable archetypes not yet purchased
    pub fn purchasable(&self, side: Side) -> Vec<&UnitDef> {
        let player = &self.players[side];
        self.config
            .catalog
            .purchasable()
            .filter(|def| !player.has_purchased(def.kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{board::Board, game::GameConfig, terrain::Terrain};

    fn state() -> GameState {
        let mut board = Board::new();
        board.place_spawner(&Loc::new(5, 9), Side::P1).unwrap();
        board.place_heart(&Loc::new(5, 10), Side::P1).unwrap();
        board.place_spawner(&Loc::new(5, 1), Side::P2).unwrap();
        board.place_heart(&Loc::new(5, 0), Side::P2).unwrap();
        board.set_terrain(&Loc::new(4, 8), Terrain::Water).unwrap();
        board.set_terrain(&Loc::new(6, 8), Terrain::Mountain).unwrap();
        GameState::new(GameConfig::default(), board)
    }

    #[test]
    fn test_spawn_deducts_energy_and_records_purchase() {
        let mut state = state();
        let id = state.spawn(UnitKind::Soldier, Loc::new(5, 8), Side::P1).unwrap();
        let piece = state.unit(id).unwrap();
        assert_eq!(piece.hp, 6);
        assert_eq!(piece.state.actions_left, 2);
        assert_eq!(piece.realm, Realm::Overworld);
        assert_eq!(state.player(Side::P1).energy, 7);
        assert!(state.player(Side::P1).has_purchased(UnitKind::Soldier));
        assert_eq!(state.purchasable(Side::P1).len(), 7);
    }

    #[test]
    fn test_spawn_requires_adjacency() {
        let mut state = state();
        assert!(state.spawn(UnitKind::Scout, Loc::new(5, 7), Side::P1).is_err());
        assert!(state.spawn(UnitKind::Scout, Loc::new(3, 9), Side::P1).is_err());
        assert!(state.spawn(UnitKind::Scout, Loc::new(4, 10), Side::P1).is_ok());
        assert_eq!(state.player(Side::P1).energy, 8);
        assert!(state.spawn(UnitKind::Scout, Loc::new(4, 10), Side::P1).is_err());
        assert_eq!(state.player(Side::P1).energy, 8);
    }

    #[test]
    fn test_spawn_respects_terrain_and_markers() {
        let mut state = state();
        assert!(state.spawn(UnitKind::Soldier, Loc::new(4, 8), Side::P1).is_err());
        assert!(state.spawn(UnitKind::Soldier, Loc::new(6, 8), Side::P1).is_err());
        assert!(state.spawn(UnitKind::Soldier, Loc::new(5, 10), Side::P1).is_err());
        assert!(state.spawn(UnitKind::Naval, Loc::new(5, 8), Side::P1).is_err());
        assert!(state.spawn(UnitKind::Naval, Loc::new(4, 8), Side::P1).is_ok());
        assert_eq!(state.player(Side::P1).energy, 4);
    }

    #[test]
    fn test_spawn_needs_energy() {
        let mut state = state();
        state.players[Side::P2].energy = 7;
        assert!(state.spawn(UnitKind::Tank, Loc::new(4, 1), Side::P2).is_err());
        assert_eq!(state.player(Side::P2).energy, 7);
        assert!(state.board.unit(&Loc::new(4, 1), Realm::Overworld).is_none());
    }

    #[test]
    fn test_summon_only_cannot_be_bought() {
        let mut state = state();
        assert!(state.spawn(UnitKind::Wolf, Loc::new(5, 8), Side::P1).is_err());
        assert!(state.board.pieces().next().is_none());
    }

    #[test]
    fn test_spawn_missing_catalog_entry() {
        let mut state = state();
        state.config.catalog.remove(UnitKind::Medic);
        assert!(state.spawn(UnitKind::Medic, Loc::new(5, 8), Side::P1).is_err());
        assert!(state.spawn_tiles(UnitKind::Medic, Side::P1).is_empty());
    }

    #[test]
    fn test_spawn_tiles_and_can_place_any() {
        let mut state = state();
        let tiles = state.spawn_tiles(UnitKind::Soldier, Side::P1);
        assert!(!tiles.contains(&Loc::new(4, 8)));
        assert!(!tiles.contains(&Loc::new(5, 9)));
        assert!(tiles.contains(&Loc::new(5, 8)));
        assert!(state.can_place_any(Side::P1));

        state.players[Side::P1].energy = 1;
        assert!(!state.can_place_any(Side::P1));
    }
}
