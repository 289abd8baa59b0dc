use log::{debug, info};

use crate::core::{
    snapshot::UnitSummary, units::AbilityKind, AbilityEffect, Loc, Realm, Side, Snapshot, Terrain,
    UnitId, UnitKind, BOARD_SIZE,
};
use crate::engine::Engine;

/// Purchase preference once the naval check has been made
const PREFERRED: [UnitKind; 5] = [
    UnitKind::Soldier,
    UnitKind::Archer,
    UnitKind::Medic,
    UnitKind::Tank,
    UnitKind::Scout,
];

/// Distance past which a scout dashes instead of walking
const DASH_DISTANCE: i32 = 4;

/// What the opponent did with its turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnSummary {
    pub spawns: usize,
    pub actions: usize,
}

/// Greedy opponent: buy up to a few units, then give every unit one useful
/// action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opponent {
    pub max_spawns: usize,
    /// Energy left untouched by the spawn phase
    pub reserve: i32,
}

impl Default for Opponent {
    fn default() -> Self {
        Self::new(2)
    }
}

impl Opponent {
    pub fn new(max_spawns: usize) -> Self {
        Self {
            max_spawns,
            reserve: 2,
        }
    }

    /// Play the side to move. Does not end the turn.
    pub fn play_turn(&self, engine: &mut Engine) -> TurnSummary {
        if engine.winner().is_some() {
            return TurnSummary::default();
        }
        let side = engine.side_to_move();
        let spawns = self.spawn_phase(engine, side);
        let actions = self.unit_phase(engine, side);
        info!("Opponent {} spawned {} and took {} actions", side, spawns, actions);
        TurnSummary { spawns, actions }
    }

    fn spawn_phase(&self, engine: &mut Engine, side: Side) -> usize {
        let snapshot = engine.snapshot();
        let mut energy = snapshot.players[side].energy;
        let Some(spawner) = snapshot.players[side].spawner else {
            return 0;
        };

        let targets = objectives(&snapshot, side);
        let mut tiles: Vec<Loc> = spawner
            .block(1)
            .into_iter()
            .filter(|loc| {
                snapshot.cell(loc).is_some_and(|cell| {
                    cell.overworld.is_none()
                        && cell.nexus.is_none()
                        && cell.spawner.is_none()
                        && cell.heart.is_none()
                        && !cell.blocked
                })
            })
            .collect();
        tiles.sort_by_key(|loc| nearest(loc, &targets).map_or(i32::MAX, |(_, dist)| dist));

        let mut spawns = 0;
        for tile in tiles {
            if spawns >= self.max_spawns || energy <= self.reserve {
                break;
            }
            let Some(kind) = self.choose_kind(engine, &snapshot, side, energy, &tile) else {
                continue;
            };
            let cost = engine.catalog().get(kind).map_or(0, |def| def.cost);
            if engine.spawn(kind, tile, side) {
                debug!("Opponent bought {} at {}", kind, tile);
                energy -= cost;
                spawns += 1;
            }
        }
        spawns
    }

    fn choose_kind(
        &self,
        engine: &Engine,
        snapshot: &Snapshot,
        side: Side,
        energy: i32,
        tile: &Loc,
    ) -> Option<UnitKind> {
        let fits = |kind: UnitKind| {
            engine
                .purchasable(side)
                .iter()
                .any(|def| def.kind == kind && def.cost <= energy)
                && engine.spawn_tiles(kind, side).contains(tile)
        };

        if near_water(snapshot, tile) && fits(UnitKind::Naval) {
            return Some(UnitKind::Naval);
        }
        if let Some(kind) = PREFERRED.into_iter().find(|&kind| fits(kind)) {
            return Some(kind);
        }

        let mut rest: Vec<_> = engine
            .purchasable(side)
            .into_iter()
            .filter(|def| def.cost > 0)
            .map(|def| (def.cost, def.kind))
            .collect();
        rest.sort();
        rest.into_iter().map(|(_, kind)| kind).find(|&kind| fits(kind))
    }

    fn unit_phase(&self, engine: &mut Engine, side: Side) -> usize {
        let mut ids: Vec<UnitId> = engine.snapshot().units_of(side).map(|unit| unit.id).collect();
        ids.sort();

        let mut actions = 0;
        for id in ids {
            if engine.winner().is_some() {
                break;
            }
            let snapshot = engine.snapshot();
            let Some(unit) = snapshot.unit(id).cloned() else {
                continue;
            };
            if unit.actions_left == 0 {
                continue;
            }

            let acted = self.try_ability(engine, &snapshot, &unit)
                || self.try_attack(engine, &snapshot, &unit)
                || self.try_step(engine, &snapshot, &unit);
            if acted {
                actions += 1;
            }
        }
        actions
    }

    fn try_ability(&self, engine: &mut Engine, snapshot: &Snapshot, unit: &UnitSummary) -> bool {
        let Some(def) = engine.catalog().get(unit.kind) else {
            return false;
        };
        let Some((index, ability)) = def.active_ability() else {
            return false;
        };
        let AbilityKind::Active { effect, .. } = ability.kind else {
            return false;
        };
        if unit.cooldowns.get(index).copied().unwrap_or(0) > 0 {
            return false;
        }
        let enemies: Vec<&UnitSummary> = snapshot
            .units()
            .filter(|other| other.owner != unit.owner && other.realm == unit.realm)
            .collect();
        let enemy_within = |reach: i32| enemies.iter().any(|e| e.loc.manhattan(&unit.loc) <= reach);

        let target = match effect {
            Some(AbilityEffect::Heal) => {
                let wounded = snapshot.units_of(unit.owner).any(|ally| {
                    ally.realm == unit.realm && ally.loc.manhattan(&unit.loc) == 1 && ally.hp < ally.max_hp
                });
                if !wounded {
                    return false;
                }
                None
            }
            Some(AbilityEffect::BuildBridge) => {
                let water = unit.loc.neighbors8().into_iter().any(|loc| {
                    snapshot.cell(&loc).is_some_and(|cell| cell.terrain == Terrain::Water)
                });
                if !water {
                    return false;
                }
                None
            }
            Some(AbilityEffect::Volley) | Some(AbilityEffect::Charge) => {
                match self.pick_target(engine, snapshot, unit) {
                    Some(loc) => Some(loc),
                    None => return false,
                }
            }
            Some(AbilityEffect::Bombard) => {
                if !enemy_within(engine.config().bombard_range) {
                    return false;
                }
                None
            }
            Some(AbilityEffect::Overrun) => {
                if !enemy_within(1) {
                    return false;
                }
                None
            }
            Some(AbilityEffect::Dash) => {
                let far = nearest(&unit.loc, &objectives(snapshot, unit.owner))
                    .is_some_and(|(_, dist)| dist >= DASH_DISTANCE);
                if !far {
                    return false;
                }
                None
            }
            Some(AbilityEffect::Vanish) | None => return false,
        };

        engine.use_ability(unit.id, index, target)
    }

    /// Attackable tile worth hitting: an enemy heart, else the weakest enemy
    fn pick_target(&self, engine: &Engine, snapshot: &Snapshot, unit: &UnitSummary) -> Option<Loc> {
        let targets = engine.attack_targets(unit.id);
        let heart = targets.iter().copied().find(|loc| {
            snapshot
                .cell(loc)
                .is_some_and(|cell| cell.heart.is_some_and(|owner| owner != unit.owner))
        });
        heart.or_else(|| {
            targets
                .iter()
                .filter_map(|loc| {
                    let cell = snapshot.cell(loc)?;
                    let enemy = match unit.realm {
                        Realm::Overworld => cell.overworld.as_ref(),
                        Realm::Shadow => cell.shadow.as_ref(),
                    }?;
                    Some((enemy.hp, *loc))
                })
                .min_by_key(|&(hp, _)| hp)
                .map(|(_, loc)| loc)
        })
    }

    fn try_attack(&self, engine: &mut Engine, snapshot: &Snapshot, unit: &UnitSummary) -> bool {
        match self.pick_target(engine, snapshot, unit) {
            Some(loc) => engine.attack(unit.id, loc),
            None => false,
        }
    }

    /// Step to the reachable tile closest to the objective, if that gets closer
    fn try_step(&self, engine: &mut Engine, snapshot: &Snapshot, unit: &UnitSummary) -> bool {
        let goal = self.objective(snapshot, unit);
        let current = unit.loc.manhattan(&goal);
        let best = engine
            .reachable(unit.id)
            .into_iter()
            .map(|loc| (loc.manhattan(&goal), loc))
            .min_by_key(|&(dist, _)| dist);

        match best {
            Some((dist, loc)) if dist < current => engine.move_unit(unit.id, loc),
            _ => false,
        }
    }

    /// Nearest contested nexus, else nearest enemy, else the enemy heart,
    /// else the centre of the board
    fn objective(&self, snapshot: &Snapshot, unit: &UnitSummary) -> Loc {
        let nexuses: Vec<Loc> = snapshot
            .nexuses
            .iter()
            .filter(|nexus| nexus.owner != Some(unit.owner))
            .map(|nexus| nexus.loc)
            .collect();
        if let Some((loc, _)) = nearest(&unit.loc, &nexuses) {
            return loc;
        }

        let enemies: Vec<Loc> = snapshot
            .units()
            .filter(|other| other.owner != unit.owner)
            .map(|other| other.loc)
            .collect();
        if let Some((loc, _)) = nearest(&unit.loc, &enemies) {
            return loc;
        }

        snapshot.players[!unit.owner]
            .heart
            .unwrap_or_else(|| {
                let centre = (BOARD_SIZE / 2) as i32;
                Loc::new(centre, centre)
            })
    }
}

/// Contested nexuses, or the enemy heart when every nexus is held
fn objectives(snapshot: &Snapshot, side: Side) -> Vec<Loc> {
    let nexuses: Vec<Loc> = snapshot
        .nexuses
        .iter()
        .filter(|nexus| nexus.owner != Some(side))
        .map(|nexus| nexus.loc)
        .collect();
    if !nexuses.is_empty() {
        return nexuses;
    }
    snapshot.players[!side].heart.into_iter().collect()
}

/// First of the targets at minimal Manhattan distance
fn nearest(from: &Loc, targets: &[Loc]) -> Option<(Loc, i32)> {
    targets
        .iter()
        .map(|loc| (*loc, from.manhattan(loc)))
        .min_by_key(|&(_, dist)| dist)
}

fn near_water(snapshot: &Snapshot, tile: &Loc) -> bool {
    tile.block(1)
        .into_iter()
        .any(|loc| snapshot.cell(&loc).is_some_and(|cell| cell.terrain == Terrain::Water))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{layout::parse_layout, Board, GameConfig, GameState};
    use crate::engine::EngineOptions;
    use indoc::indoc;

    const ARENA: &str = indoc! {"
        .....h.....
        .....s.....
        ..N....~~..
        ...........
        ..^^...**..
        ...........
        ..**...^^..
        ...........
        ..~~....N..
        .....S.....
        .....H.....
    "};

    fn open_field() -> GameState {
        GameState::new(GameConfig::default(), Board::new())
    }

    fn place(state: &mut GameState, kind: UnitKind, side: Side, x: i32, y: i32) -> UnitId {
        state
            .place_unit(kind, side, Loc::new(x, y), Realm::Overworld)
            .unwrap()
    }

    #[test]
    fn test_spawns_toward_nexus_then_advances() {
        let state = GameState::new(GameConfig::default(), parse_layout(ARENA).unwrap());
        let mut engine = Engine::from_state(state, EngineOptions::default());

        let summary = Opponent::new(2).play_turn(&mut engine);
        assert_eq!(summary, TurnSummary { spawns: 2, actions: 2 });

        let snapshot = engine.snapshot();
        let player = &snapshot.players[Side::P1];
        assert_eq!(player.energy, 10 - 3 - 4);
        assert_eq!(player.purchased, vec![UnitKind::Soldier, UnitKind::Archer]);

        let nexus = Loc::new(8, 8);
        let soldier = snapshot.units().find(|u| u.kind == UnitKind::Soldier).unwrap();
        assert_eq!(soldier.loc, nexus);
        let archer = snapshot.units().find(|u| u.kind == UnitKind::Archer).unwrap();
        assert_eq!(archer.loc.manhattan(&nexus), 1);
    }

    #[test]
    fn test_spawn_phase_keeps_reserve() {
        let mut state = GameState::new(GameConfig::default(), parse_layout(ARENA).unwrap());
        state.players[Side::P1].energy = 2;
        let mut engine = Engine::from_state(state, EngineOptions::default());

        let summary = Opponent::new(2).play_turn(&mut engine);
        assert_eq!(summary.spawns, 0);
        assert_eq!(engine.snapshot().players[Side::P1].energy, 2);
    }

    #[test]
    fn test_charges_weakest_enemy() {
        let mut state = open_field();
        let soldier = place(&mut state, UnitKind::Soldier, Side::P1, 5, 5);
        let archer = place(&mut state, UnitKind::Archer, Side::P2, 5, 4);
        let tank = place(&mut state, UnitKind::Tank, Side::P2, 4, 5);
        let mut engine = Engine::from_state(state, EngineOptions::default());

        let summary = Opponent::default().play_turn(&mut engine);
        assert_eq!(summary, TurnSummary { spawns: 0, actions: 1 });

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.unit(archer).unwrap().hp, 2);
        assert_eq!(snapshot.unit(tank).unwrap().hp, 12);
        let soldier = snapshot.unit(soldier).unwrap();
        assert_eq!(soldier.actions_left, 1);
        assert!(soldier.cooldowns.iter().any(|&cooldown| cooldown > 0));
    }

    #[test]
    fn test_volley_prefers_heart() {
        let mut board = Board::new();
        board.place_heart(&Loc::new(5, 0), Side::P2).unwrap();
        let mut state = GameState::new(GameConfig::default(), board);
        place(&mut state, UnitKind::Archer, Side::P1, 5, 3);
        let scout = place(&mut state, UnitKind::Scout, Side::P2, 6, 4);
        let mut engine = Engine::from_state(state, EngineOptions::default());

        Opponent::default().play_turn(&mut engine);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.players[Side::P2].hp, 18);
        assert_eq!(snapshot.unit(scout).unwrap().hp, 3);
    }

    #[test]
    fn test_medic_heals_wounded_neighbour() {
        let mut state = open_field();
        place(&mut state, UnitKind::Medic, Side::P1, 5, 5);
        let soldier = place(&mut state, UnitKind::Soldier, Side::P1, 5, 6);
        state.board.find_unit_mut(soldier).unwrap().hp = 2;
        let mut engine = Engine::from_state(state, EngineOptions::default());

        Opponent::default().play_turn(&mut engine);
        assert_eq!(engine.snapshot().unit(soldier).unwrap().hp, 5);
    }

    #[test]
    fn test_bombard_follows_configured_range() {
        let gunship_cooldown = |bombard_range: i32| {
            let config = GameConfig { bombard_range, ..GameConfig::default() };
            let mut board = Board::new();
            board.set_terrain(&Loc::new(5, 5), Terrain::Water).unwrap();
            let mut state = GameState::new(config, board);
            let gunship = place(&mut state, UnitKind::Naval, Side::P1, 5, 5);
            place(&mut state, UnitKind::Scout, Side::P2, 5, 3);
            let mut engine = Engine::from_state(state, EngineOptions::default());

            Opponent::default().play_turn(&mut engine);
            engine.snapshot().unit(gunship).unwrap().cooldowns[0]
        };
        assert!(gunship_cooldown(2) > 0);
        assert_eq!(gunship_cooldown(1), 0);
    }

    #[test]
    fn test_idle_when_game_over() {
        let mut state = open_field();
        let soldier = place(&mut state, UnitKind::Soldier, Side::P1, 2, 2);
        state.declare_winner(Side::P2, "test");
        let mut engine = Engine::from_state(state, EngineOptions::default());

        assert_eq!(Opponent::default().play_turn(&mut engine), TurnSummary::default());
        assert_eq!(engine.snapshot().unit(soldier).unwrap().loc, Loc::new(2, 2));
    }
}
