use anyhow::{bail, ensure, Context, Result};
use log::debug;

use crate::core::{
    board::{Piece, UnitId, MAX_ABILITIES},
    game::GameState,
    loc::Loc,
    outcome::ActionOutcome,
    terrain::{Realm, Terrain},
    units::{AbilityEffect, AbilityKind, UnitDef},
};

use super::combat::{in_attack_range, Target};

/// Everything an ability needs to know about its caster, copied out of the
/// board so the effect can mutate freely
struct Cast {
    caster: Piece,
    def: UnitDef,
    target: Option<Loc>,
}

impl GameState {
    /// Gates shared by direct invocation and two-step targeting. Returns the
    /// caster, its archetype, the ability's cooldown and its effect.
    pub(crate) fn ability_gate(
        &self,
        id: UnitId,
        index: usize,
    ) -> Result<(Piece, UnitDef, u32, Option<AbilityEffect>)> {
        let caster = self.acting_piece(id)?.clone();
        let def = self.def(caster.kind)?.clone();
        ensure!(index < MAX_ABILITIES, "Ability slot {} does not exist", index);

        let ability = def
            .ability(index)
            .with_context(|| format!("{} has no ability {}", def.name, index))?;
        let (cooldown, effect) = match ability.kind {
            AbilityKind::Active { cooldown, effect, .. } => (cooldown, effect),
            AbilityKind::Passive => bail!("{} is a passive ability", ability.name),
        };
        ensure!(
            caster.cooldown(index) == 0,
            "{} is on cooldown for {} more turns",
            ability.name,
            caster.cooldown(index)
        );
        Ok((caster, def, cooldown, effect))
    }

    /// Invoke a unit's ability. A failed effect leaves everything untouched.
    pub fn use_ability(&mut self, id: UnitId, index: usize, target: Option<Loc>) -> Result<ActionOutcome> {
        let (caster, def, cooldown, effect) = self.ability_gate(id, index)?;
        let cast = Cast { caster, def, target };

        let outcome = match effect {
            Some(AbilityEffect::Charge) => self.charge(&cast)?,
            Some(AbilityEffect::Volley) => self.volley(&cast)?,
            Some(AbilityEffect::BuildBridge) => self.build_bridge(&cast)?,
            Some(AbilityEffect::Heal) => self.heal(&cast)?,
            Some(AbilityEffect::Dash) => self.dash(&cast),
            Some(AbilityEffect::Bombard) => self.bombard(&cast)?,
            Some(AbilityEffect::Overrun) => self.overrun(&cast)?,
            Some(AbilityEffect::Vanish) => self.vanish(&cast)?,
            None => ActionOutcome::single(cast.caster.loc),
        };

        let turn = self.turn;
        if let Some(piece) = self.board.find_unit_mut(id) {
            piece.state.cooldowns[index] = cooldown;
            piece.state.spend_action();
            piece.state.ability_used_on = Some(turn);
        }
        debug!("Unit {} used ability {} ({:?})", id, index, effect);
        Ok(outcome)
    }

    /// First enemy at minimal Manhattan distance in the caster's realm,
    /// scanning rows top to bottom
    fn nearest_enemy(&self, caster: &Piece) -> Option<Loc> {
        let mut best: Option<(Loc, i32)> = None;
        for loc in Loc::all() {
            let Some(unit) = self.board.unit(&loc, caster.realm) else {
                continue;
            };
            if unit.side == caster.side {
                continue;
            }
            let dist = caster.loc.manhattan(&loc);
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((loc, dist));
            }
        }
        best.map(|(loc, _)| loc)
    }

    fn enemy_unit_at(&self, caster: &Piece, loc: &Loc) -> bool {
        self.board
            .unit(loc, caster.realm)
            .is_some_and(|unit| unit.side != caster.side)
    }

    /// Strike the target, then advance onto its tile if it fell
    fn charge(&mut self, cast: &Cast) -> Result<ActionOutcome> {
        let caster = &cast.caster;
        let loc = cast.target.context("Charge needs a target")?;
        self.board.get(&loc)?;
        let target = self
            .target_at(caster, &loc)
            .with_context(|| format!("No enemy at {}", loc))?;
        ensure!(
            in_attack_range(&cast.def, caster.range, &caster.loc, &loc),
            "{} is out of charge range",
            loc
        );

        let mut outcome = ActionOutcome::single(loc);
        let killed = self.apply_hit(loc, caster.realm, target, caster.attack);
        if killed && self.can_enter(&cast.def, &loc, caster.realm) {
            self.board.relocate(&caster.loc, caster.realm, &loc, caster.realm)?;
            outcome = outcome.with(caster.loc);
        }
        Ok(outcome)
    }

    /// Area attack on the 3x3 block around a tile in range
    fn volley(&mut self, cast: &Cast) -> Result<ActionOutcome> {
        let caster = &cast.caster;
        let center = cast.target.context("Volley needs a target tile")?;
        self.board.get(&center)?;
        ensure!(
            caster.loc.chebyshev(&center) <= caster.range,
            "{} is out of volley range",
            center
        );

        let mut hits = Vec::new();
        for loc in center.block(1) {
            let Some(cell) = self.board.cell(&loc) else {
                continue;
            };
            if let Some(unit) = cell.unit(caster.realm) {
                if unit.side != caster.side {
                    hits.push((loc, Target::Unit(unit.side)));
                }
            }
            if caster.realm == Realm::Overworld {
                if let Some(owner) = cell.heart.filter(|owner| *owner != caster.side) {
                    hits.push((loc, Target::Heart(owner)));
                }
            }
        }
        ensure!(!hits.is_empty(), "Volley at {} hits nothing", center);

        for &(loc, target) in &hits {
            self.apply_hit(loc, caster.realm, target, caster.attack);
        }
        let mut affected: Vec<Loc> = hits.into_iter().map(|(loc, _)| loc).collect();
        affected.dedup();
        Ok(ActionOutcome::new(affected))
    }

    fn build_bridge(&mut self, cast: &Cast) -> Result<ActionOutcome> {
        let caster = &cast.caster;
        let is_water = |loc: &Loc| self.board.terrain(loc) == Some(Terrain::Water);

        let loc = match cast.target {
            Some(loc) => {
                ensure!(caster.loc.chebyshev(&loc) <= 1, "{} is not adjacent", loc);
                ensure!(is_water(&loc), "{} is not water", loc);
                loc
            }
            None => caster
                .loc
                .neighbors8()
                .into_iter()
                .find(|loc| is_water(loc))
                .context("No adjacent water")?,
        };

        self.board.set_terrain(&loc, Terrain::Bridge)?;
        Ok(ActionOutcome::single(loc))
    }

    fn heal(&mut self, cast: &Cast) -> Result<ActionOutcome> {
        let caster = &cast.caster;
        let wounded_ally = |loc: &Loc| {
            caster.loc.manhattan(loc) == 1
                && self
                    .board
                    .unit(loc, caster.realm)
                    .is_some_and(|unit| unit.side == caster.side && unit.is_wounded())
        };

        let loc = cast
            .target
            .filter(|loc| wounded_ally(loc))
            .or_else(|| caster.loc.neighbors4().into_iter().find(|loc| wounded_ally(loc)))
            .context("No wounded ally adjacent")?;

        let amount = self.config.heal_amount;
        let unit = self
            .board
            .unit_mut(&loc, caster.realm)
            .context("Heal target vanished")?;
        unit.hp = (unit.hp + amount).min(unit.max_hp);
        Ok(ActionOutcome::single(loc))
    }

    fn dash(&mut self, cast: &Cast) -> ActionOutcome {
        let bonus = self.config.dash_bonus;
        if let Some(piece) = self.board.find_unit_mut(cast.caster.id) {
            piece.state.move_bonus += bonus;
        }
        ActionOutcome::single(cast.caster.loc)
    }

    fn bombard(&mut self, cast: &Cast) -> Result<ActionOutcome> {
        let caster = &cast.caster;
        let reach = self.config.bombard_range;
        let within = |loc: &Loc| caster.loc.manhattan(loc) <= reach;

        let loc = cast
            .target
            .filter(|loc| within(loc) && self.enemy_unit_at(caster, loc))
            .or_else(|| self.nearest_enemy(caster).filter(|loc| within(loc)))
            .context("No enemy within bombard range")?;
        ensure!(
            in_attack_range(&cast.def, caster.range, &caster.loc, &loc),
            "{} is out of range",
            loc
        );

        let target = self
            .target_at(caster, &loc)
            .with_context(|| format!("No enemy at {}", loc))?;
        self.apply_hit(loc, caster.realm, target, caster.attack);
        Ok(ActionOutcome::single(loc))
    }

    /// Hit an adjacent enemy, then roll onto its tile or shove it back
    fn overrun(&mut self, cast: &Cast) -> Result<ActionOutcome> {
        let caster = &cast.caster;
        let adjacent_enemy = |loc: &Loc| caster.loc.manhattan(loc) == 1 && self.enemy_unit_at(caster, loc);

        let loc = cast
            .target
            .filter(|loc| adjacent_enemy(loc))
            .or_else(|| caster.loc.neighbors4().into_iter().find(|loc| adjacent_enemy(loc)))
            .context("No adjacent enemy")?;
        let target = self
            .target_at(caster, &loc)
            .with_context(|| format!("No enemy at {}", loc))?;

        let mut outcome = ActionOutcome::single(loc);
        if self.apply_hit(loc, caster.realm, target, caster.attack) {
            if self.can_enter(&cast.def, &loc, caster.realm) {
                self.board.relocate(&caster.loc, caster.realm, &loc, caster.realm)?;
                outcome = outcome.with(caster.loc);
            }
        } else {
            let push = &loc + &(&loc - &caster.loc);
            let open = self.board.cell(&push).is_some_and(|cell| {
                cell.is_free(caster.realm)
                    && (caster.realm == Realm::Shadow || !cell.blocked_for_movement)
            });
            if open {
                self.board.relocate(&loc, caster.realm, &push, caster.realm)?;
                outcome = outcome.with(push);
            }
        }
        Ok(outcome)
    }

    /// Step between realms. Entering the shadow schedules a return on the
    /// owner's next turn.
    fn vanish(&mut self, cast: &Cast) -> Result<ActionOutcome> {
        let caster = &cast.caster;
        let to_realm = caster.realm.other();
        ensure!(
            self.board.is_free(&caster.loc, to_realm),
            "{} slot at {} is taken",
            to_realm,
            caster.loc
        );

        self.board
            .relocate(&caster.loc, caster.realm, &caster.loc, to_realm)?;
        let turn = self.turn;
        if let Some(piece) = self.board.find_unit_mut(caster.id) {
            match to_realm {
                Realm::Shadow => {
                    piece.state.shadow_return_on = Some(turn + 1);
                    piece.state.hidden_until = Some(turn + 1);
                }
                Realm::Overworld => {
                    piece.state.shadow_return_on = None;
                    piece.state.hidden_until = None;
                }
            }
        }
        Ok(ActionOutcome::single(caster.loc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        board::Board,
        game::GameConfig,
        side::Side,
        units::{Ability, AbilityTarget, UnitKind},
    };

    fn open_state() -> GameState {
        let mut board = Board::new();
        board.place_heart(&Loc::new(4, 8), Side::P2).unwrap();
        GameState::new(GameConfig::default(), board)
    }

    fn place(state: &mut GameState, kind: UnitKind, side: Side, x: i32, y: i32) -> UnitId {
        state.place_unit(kind, side, Loc::new(x, y), Realm::Overworld).unwrap()
    }

    #[test]
    fn test_volley_hits_block_around_target() {
        let mut state = open_state();
        let archer = place(&mut state, UnitKind::Archer, Side::P1, 5, 5);
        let near = place(&mut state, UnitKind::Soldier, Side::P2, 6, 8);
        let far = place(&mut state, UnitKind::Soldier, Side::P2, 5, 3);
        let friend = place(&mut state, UnitKind::Soldier, Side::P1, 5, 7);

        let outcome = state.use_ability(archer, 0, Some(Loc::new(5, 7))).unwrap();
        assert_eq!(state.unit(near).unwrap().hp, 4);
        assert_eq!(state.unit(far).unwrap().hp, 6);
        assert_eq!(state.unit(friend).unwrap().hp, 6);
        assert_eq!(state.player(Side::P2).hp, 18);
        assert_eq!(outcome.affected.len(), 2);

        let piece = state.unit(archer).unwrap();
        assert_eq!(piece.state.actions_left, 1);
        assert_eq!(piece.state.cooldowns[0], 2);
        assert_eq!(piece.state.ability_used_on, Some(1));
    }

    #[test]
    fn test_volley_miss_is_free() {
        let mut state = open_state();
        let archer = place(&mut state, UnitKind::Archer, Side::P1, 5, 5);
        assert!(state.use_ability(archer, 0, Some(Loc::new(1, 1))).is_err());
        assert!(state.use_ability(archer, 0, Some(Loc::new(2, 2))).is_err());
        assert!(state.use_ability(archer, 0, None).is_err());
        let piece = state.unit(archer).unwrap();
        assert_eq!(piece.state.actions_left, 2);
        assert_eq!(piece.state.cooldowns, [0, 0]);
    }

    #[test]
    fn test_cooldown_blocks_reuse() {
        let mut state = open_state();
        let scout = place(&mut state, UnitKind::Scout, Side::P1, 0, 0);
        state.use_ability(scout, 0, None).unwrap();
        assert_eq!(state.unit(scout).unwrap().movement(), 6);
        assert!(state.use_ability(scout, 0, None).is_err());
        assert_eq!(state.unit(scout).unwrap().state.actions_left, 1);
    }

    #[test]
    fn test_passive_slot_is_rejected() {
        let mut state = open_state();
        let scout = place(&mut state, UnitKind::Scout, Side::P1, 0, 0);
        assert!(state.use_ability(scout, 1, None).is_err());
        assert!(state.use_ability(scout, 2, None).is_err());
        assert_eq!(state.unit(scout).unwrap().state.actions_left, 2);
    }

    #[test]
    fn test_charge_advances_on_kill() {
        let mut state = open_state();
        let soldier = place(&mut state, UnitKind::Soldier, Side::P1, 2, 2);
        let scout = place(&mut state, UnitKind::Scout, Side::P2, 2, 3);
        state.unit_mut_for_test(scout).hp = 2;

        let outcome = state.use_ability(soldier, 0, Some(Loc::new(2, 3))).unwrap();
        assert!(state.unit(scout).is_none());
        assert_eq!(state.unit(soldier).unwrap().loc, Loc::new(2, 3));
        assert!(outcome.affected.contains(&Loc::new(2, 2)));
    }

    #[test]
    fn test_charge_without_kill_stays() {
        let mut state = open_state();
        let soldier = place(&mut state, UnitKind::Soldier, Side::P1, 2, 2);
        let tank = place(&mut state, UnitKind::Tank, Side::P2, 3, 2);
        state.use_ability(soldier, 0, Some(Loc::new(3, 2))).unwrap();
        assert_eq!(state.unit(tank).unwrap().hp, 10);
        assert_eq!(state.unit(soldier).unwrap().loc, Loc::new(2, 2));
        assert!(state.use_ability(soldier, 0, Some(Loc::new(3, 2))).is_err());
    }

    #[test]
    fn test_build_bridge() {
        let mut state = open_state();
        state.board.set_terrain(&Loc::new(3, 3), Terrain::Water).unwrap();
        state.board.set_terrain(&Loc::new(6, 6), Terrain::Water).unwrap();
        let builder = place(&mut state, UnitKind::Builder, Side::P1, 2, 2);

        assert!(state.use_ability(builder, 0, Some(Loc::new(6, 6))).is_err());
        state.use_ability(builder, 0, None).unwrap();
        assert_eq!(state.board.terrain(&Loc::new(3, 3)), Some(Terrain::Bridge));
        assert_eq!(state.board.terrain(&Loc::new(6, 6)), Some(Terrain::Water));
    }

    #[test]
    fn test_heal_needs_wounded_neighbour() {
        let mut state = open_state();
        let medic = place(&mut state, UnitKind::Medic, Side::P1, 5, 5);
        let tank = place(&mut state, UnitKind::Tank, Side::P1, 5, 4);
        let enemy = place(&mut state, UnitKind::Tank, Side::P2, 4, 5);
        state.unit_mut_for_test(enemy).hp = 5;

        let before = state.unit(medic).unwrap().clone();
        assert!(state.use_ability(medic, 0, None).is_err());
        assert_eq!(state.unit(medic).unwrap(), &before);
        assert_eq!(state.unit(enemy).unwrap().hp, 5);

        state.unit_mut_for_test(tank).hp = 11;
        state.use_ability(medic, 0, None).unwrap();
        assert_eq!(state.unit(tank).unwrap().hp, 12);
    }

    #[test]
    fn test_bombard_prefers_explicit_target() {
        let mut state = open_state();
        let ship = place(&mut state, UnitKind::Naval, Side::P1, 5, 5);
        let close = place(&mut state, UnitKind::Tank, Side::P2, 5, 4);
        let other = place(&mut state, UnitKind::Tank, Side::P2, 6, 6);

        state.use_ability(ship, 0, Some(Loc::new(6, 6))).unwrap();
        assert_eq!(state.unit(other).unwrap().hp, 9);
        assert_eq!(state.unit(close).unwrap().hp, 12);
    }

    #[test]
    fn test_bombard_falls_back_to_nearest() {
        let mut state = open_state();
        let ship = place(&mut state, UnitKind::Naval, Side::P1, 5, 5);
        let close = place(&mut state, UnitKind::Tank, Side::P2, 5, 4);
        place(&mut state, UnitKind::Tank, Side::P2, 6, 6);

        state.use_ability(ship, 0, Some(Loc::new(9, 9))).unwrap();
        assert_eq!(state.unit(close).unwrap().hp, 9);
    }

    #[test]
    fn test_bombard_without_enemy_in_reach() {
        let mut state = open_state();
        let ship = place(&mut state, UnitKind::Naval, Side::P1, 5, 5);
        place(&mut state, UnitKind::Tank, Side::P2, 8, 5);
        assert!(state.use_ability(ship, 0, None).is_err());
        assert_eq!(state.unit(ship).unwrap().state.actions_left, 2);
    }

    #[test]
    fn test_overrun_pushes_survivor() {
        let mut state = open_state();
        let tank = place(&mut state, UnitKind::Tank, Side::P1, 5, 5);
        let soldier = place(&mut state, UnitKind::Soldier, Side::P2, 6, 5);

        state.use_ability(tank, 0, None).unwrap();
        let pushed = state.unit(soldier).unwrap();
        assert_eq!(pushed.hp, 2);
        assert_eq!(pushed.loc, Loc::new(7, 5));
        assert_eq!(state.unit(tank).unwrap().loc, Loc::new(5, 5));
    }

    #[test]
    fn test_overrun_rolls_over_kill() {
        let mut state = open_state();
        let tank = place(&mut state, UnitKind::Tank, Side::P1, 5, 5);
        let scout = place(&mut state, UnitKind::Scout, Side::P2, 5, 6);

        state.use_ability(tank, 0, Some(Loc::new(5, 6))).unwrap();
        assert!(state.unit(scout).is_none());
        assert_eq!(state.unit(tank).unwrap().loc, Loc::new(5, 6));
    }

    #[test]
    fn test_overrun_push_blocked_by_structure() {
        let mut state = open_state();
        let tank = place(&mut state, UnitKind::Tank, Side::P1, 4, 6);
        let soldier = place(&mut state, UnitKind::Soldier, Side::P2, 4, 7);

        state.use_ability(tank, 0, None).unwrap();
        assert_eq!(state.unit(soldier).unwrap().loc, Loc::new(4, 7));
    }

    #[test]
    fn test_vanish_toggles_realm() {
        let mut state = open_state();
        let shade = place(&mut state, UnitKind::Shade, Side::P1, 3, 3);

        state.use_ability(shade, 0, None).unwrap();
        let piece = state.unit(shade).unwrap();
        assert_eq!(piece.realm, Realm::Shadow);
        assert_eq!(piece.state.shadow_return_on, Some(2));
        assert!(state.board.is_free(&Loc::new(3, 3), Realm::Overworld));
    }

    #[test]
    fn test_vanish_needs_free_slot() {
        let mut state = open_state();
        let shade = place(&mut state, UnitKind::Shade, Side::P1, 3, 3);
        state.place_unit(UnitKind::Shade, Side::P2, Loc::new(3, 3), Realm::Shadow).unwrap();
        assert!(state.use_ability(shade, 0, None).is_err());
        assert_eq!(state.unit(shade).unwrap().realm, Realm::Overworld);
    }

    #[test]
    fn test_effectless_active_ability_still_consumes() {
        static DRILL: [Ability; 1] = [Ability {
            name: "Drill",
            text: "Stand at attention.",
            kind: AbilityKind::Active {
                cooldown: 1,
                target: AbilityTarget::Caster,
                effect: None,
            },
        }];
        let mut state = open_state();
        let mut def = state.config.catalog.get(UnitKind::Soldier).unwrap().clone();
        def.abilities = &DRILL;
        state.config.catalog.insert(def);

        let soldier = place(&mut state, UnitKind::Soldier, Side::P1, 1, 1);
        state.use_ability(soldier, 0, None).unwrap();
        let piece = state.unit(soldier).unwrap();
        assert_eq!(piece.state.actions_left, 1);
        assert_eq!(piece.state.cooldowns[0], 1);
    }

    impl GameState {
        fn unit_mut_for_test(&mut self, id: UnitId) -> &mut Piece {
            self.board.find_unit_mut(id).unwrap()
        }
    }
}
