use anyhow::{ensure, Context, Result};
use log::debug;

use crate::core::{
    board::{Piece, UnitId},
    game::GameState,
    loc::Loc,
    outcome::ActionOutcome,
    side::Side,
    terrain::Realm,
    units::UnitDef,
};

/// Something an attack can hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Unit(Side),
    Heart(Side),
}

/// Diagonal attackers measure range in Chebyshev distance, everyone else in
/// Manhattan distance
pub fn in_attack_range(def: &UnitDef, range: i32, from: &Loc, to: &Loc) -> bool {
    if def.can_attack_diagonal {
        from.chebyshev(to) <= range
    } else {
        from.manhattan(to) <= range
    }
}

impl GameState {
    /// What an attacker would hit on a tile: an enemy unit in its own realm,
    /// or from the overworld an enemy heart with nothing standing on it
    pub(crate) fn target_at(&self, attacker: &Piece, loc: &Loc) -> Option<Target> {
        let cell = self.board.cell(loc)?;
        match cell.unit(attacker.realm) {
            Some(unit) if unit.side != attacker.side => Some(Target::Unit(unit.side)),
            Some(_) => None,
            None => match cell.heart {
                Some(owner) if attacker.realm == Realm::Overworld && owner != attacker.side => {
                    Some(Target::Heart(owner))
                }
                _ => None,
            },
        }
    }

    /// Tiles the unit could attack from where it stands
    pub fn attack_targets(&self, id: UnitId) -> Result<Vec<Loc>> {
        let piece = self
            .unit(id)
            .with_context(|| format!("No unit with id {}", id))?;
        let def = self.def(piece.kind)?;
        Ok(piece
            .loc
            .block(piece.range)
            .into_iter()
            .filter(|loc| in_attack_range(def, piece.range, &piece.loc, loc))
            .filter(|loc| self.target_at(piece, loc).is_some())
            .collect())
    }

    /// Deal damage to a validated target. Returns whether a unit died.
    pub(crate) fn apply_hit(&mut self, loc: Loc, realm: Realm, target: Target, damage: i32) -> bool {
        match target {
            Target::Unit(_) => {
                let Some(unit) = self.board.unit_mut(&loc, realm) else {
                    return false;
                };
                unit.hp -= damage;
                if unit.is_dead() {
                    if let Some(dead) = self.board.take_unit(&loc, realm) {
                        debug!("{} #{} destroyed at {}", dead.kind, dead.id, loc);
                    }
                    return true;
                }
                false
            }
            Target::Heart(owner) => {
                self.damage_player(owner, damage, "heart destroyed");
                false
            }
        }
    }

    pub fn attack(&mut self, id: UnitId, loc: Loc) -> Result<ActionOutcome> {
        let attacker = self.acting_piece(id)?;
        self.board.get(&loc)?;

        let target = self
            .target_at(attacker, &loc)
            .with_context(|| format!("Nothing to attack at {}", loc))?;
        let def = self.def(attacker.kind)?;
        ensure!(
            in_attack_range(def, attacker.range, &attacker.loc, &loc),
            "{} is out of range of unit {}",
            loc,
            id
        );

        let (realm, damage) = (attacker.realm, attacker.attack);
        self.apply_hit(loc, realm, target, damage);
        if let Some(attacker) = self.board.find_unit_mut(id) {
            attacker.state.spend_action();
        }
        Ok(ActionOutcome::single(loc))
    }
}
