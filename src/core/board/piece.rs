use crate::core::{
    loc::Loc,
    side::Side,
    terrain::Realm,
    units::{UnitDef, UnitKind},
};

pub type UnitId = u32;

/// Ability slots a unit can carry
pub const MAX_ABILITIES: usize = 2;

/// Transient per-turn state of a piece
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PieceState {
    pub actions_left: u32,
    pub move_bonus: i32,
    /// Remaining cooldown per ability slot
    pub cooldowns: [u32; MAX_ABILITIES],
    pub hidden_until: Option<u32>,
    pub shadow_return_on: Option<u32>,
    pub ability_used_on: Option<u32>,
}

impl PieceState {
    pub fn spawned(actions: u32) -> Self {
        Self {
            actions_left: actions,
            ..Self::default()
        }
    }

    pub fn can_act(&self) -> bool {
        self.actions_left > 0
    }

    pub fn spend_action(&mut self) {
        self.actions_left = self.actions_left.saturating_sub(1);
    }

    /// Start-of-turn upkeep for the owning side
    pub fn refresh(&mut self, turn: u32, actions: u32) {
        self.move_bonus = 0;
        if self.hidden_until.is_some_and(|until| turn >= until) {
            self.hidden_until = None;
        }
        for cooldown in self.cooldowns.iter_mut() {
            *cooldown = cooldown.saturating_sub(1);
        }
        self.actions_left = actions;
    }
}

/// A unit on the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub id: UnitId,
    pub kind: UnitKind,
    pub side: Side,
    pub loc: Loc,
    pub realm: Realm,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub range: i32,
    pub speed: i32,
    pub state: PieceState,
}

impl Piece {
    /// Fresh instance of an archetype, stats copied from its definition
    pub fn new(id: UnitId, def: &UnitDef, side: Side, loc: Loc, actions: u32) -> Self {
        Self {
            id,
            kind: def.kind,
            side,
            loc,
            realm: Realm::Overworld,
            hp: def.hp,
            max_hp: def.hp,
            attack: def.attack,
            range: def.range,
            speed: def.speed,
            state: PieceState::spawned(actions),
        }
    }

    pub fn is_wounded(&self) -> bool {
        self.hp < self.max_hp
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Step budget for this turn's reachability search
    pub fn movement(&self) -> i32 {
        self.speed + self.state.move_bonus
    }

    pub fn cooldown(&self, slot: usize) -> u32 {
        self.state.cooldowns.get(slot).copied().unwrap_or(0)
    }
}
