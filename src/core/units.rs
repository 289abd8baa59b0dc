//! Unit catalog: archetype definitions and their abilities

use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use num_derive::{FromPrimitive, ToPrimitive};
use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;

use super::convert::impl_index_conversions;
use super::terrain::Terrain;

/// Identifier of a unit archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive, ToPrimitive, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Soldier,
    Archer,
    Builder,
    Naval,
    Medic,
    Scout,
    Tank,
    Shade,
    Wolf,
}

impl_index_conversions!(UnitKind, "unit");

impl UnitKind {
    pub const ALL: [UnitKind; 9] = [
        UnitKind::Soldier,
        UnitKind::Archer,
        UnitKind::Builder,
        UnitKind::Naval,
        UnitKind::Medic,
        UnitKind::Scout,
        UnitKind::Tank,
        UnitKind::Shade,
        UnitKind::Wolf,
    ];

    pub fn id(self) -> &'static str {
        match self {
            UnitKind::Soldier => "soldier",
            UnitKind::Archer => "archer",
            UnitKind::Builder => "builder",
            UnitKind::Naval => "naval",
            UnitKind::Medic => "medic",
            UnitKind::Scout => "scout",
            UnitKind::Tank => "tank",
            UnitKind::Shade => "shade",
            UnitKind::Wolf => "wolf",
        }
    }

    /// Board symbol
    pub fn symbol(self) -> char {
        match self {
            UnitKind::Soldier => 'S',
            UnitKind::Archer => 'A',
            UnitKind::Builder => 'B',
            UnitKind::Naval => 'G',
            UnitKind::Medic => 'M',
            UnitKind::Scout => 'R',
            UnitKind::Tank => 'T',
            UnitKind::Shade => 'H',
            UnitKind::Wolf => 'W',
        }
    }
}

impl Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for UnitKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "soldier" => Ok(UnitKind::Soldier),
            "archer" => Ok(UnitKind::Archer),
            "builder" => Ok(UnitKind::Builder),
            "naval" | "gunship" => Ok(UnitKind::Naval),
            "medic" => Ok(UnitKind::Medic),
            "scout" => Ok(UnitKind::Scout),
            "tank" => Ok(UnitKind::Tank),
            "shade" | "shadow" => Ok(UnitKind::Shade),
            "wolf" => Ok(UnitKind::Wolf),
            _ => Err(anyhow!("Unknown unit: {}", s)),
        }
    }
}

/// What an active ability expects from its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityTarget {
    /// Resolves from the unit itself
    Caster,
    /// An enemy unit within normal attack range
    EnemyInRange,
    /// Any tile within attack range
    TileInRange,
    /// An 8-way adjacent water tile, or the first one found
    AdjacentWater,
    /// An orthogonally adjacent ally, or the first one found
    AdjacentAlly,
    /// An enemy within Manhattan distance 2, or the nearest one
    EnemyWithinTwo,
    /// An orthogonally adjacent enemy, or the first one found
    AdjacentEnemy,
}

impl AbilityTarget {
    /// Whether the ability reads a tile from its caller at all
    pub fn takes_tile(self) -> bool {
        self != AbilityTarget::Caster
    }
}

/// Rule effect of an active ability. Abilities without one fall through to a
/// plain action-consuming no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityEffect {
    Charge,
    Volley,
    BuildBridge,
    Heal,
    Dash,
    Bombard,
    Overrun,
    Vanish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityKind {
    Active {
        cooldown: u32,
        target: AbilityTarget,
        effect: Option<AbilityEffect>,
    },
    Passive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ability {
    pub name: &'static str,
    pub text: &'static str,
    pub kind: AbilityKind,
}

impl Ability {
    pub fn is_active(&self) -> bool {
        matches!(self.kind, AbilityKind::Active { .. })
    }

    pub fn cooldown(&self) -> u32 {
        match self.kind {
            AbilityKind::Active { cooldown, .. } => cooldown,
            AbilityKind::Passive => 0,
        }
    }

    pub fn target(&self) -> Option<AbilityTarget> {
        match self.kind {
            AbilityKind::Active { target, .. } => Some(target),
            AbilityKind::Passive => None,
        }
    }
}

/// Canonical archetype definition. Every stat is explicit; there are no alias
/// fields to fall back on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitDef {
    pub kind: UnitKind,
    pub name: &'static str,
    pub description: &'static str,
    pub cost: i32,
    pub hp: i32,
    pub attack: i32,
    pub range: i32,
    pub speed: i32,
    pub can_climb_mountain: bool,
    pub can_cross_water: bool,
    pub water_only: bool,
    pub can_attack_diagonal: bool,
    pub summon_only: bool,
    pub abilities: &'static [Ability],
}

impl UnitDef {
    /// Movement affinity for overworld terrain
    pub fn can_enter(&self, terrain: Terrain) -> bool {
        match terrain {
            Terrain::Mountain => self.can_climb_mountain,
            Terrain::Water => self.can_cross_water || self.water_only,
            Terrain::Plain | Terrain::Forest | Terrain::Bridge => true,
        }
    }

    /// Placement affinity, stricter than movement for water-only units
    pub fn can_spawn_on(&self, terrain: Terrain) -> bool {
        if self.water_only {
            return matches!(terrain, Terrain::Water | Terrain::Bridge);
        }
        match terrain {
            Terrain::Water => self.can_cross_water,
            Terrain::Mountain => self.can_climb_mountain,
            Terrain::Plain | Terrain::Forest | Terrain::Bridge => true,
        }
    }

    pub fn symbol(&self) -> char {
        self.kind.symbol()
    }

    pub fn ability(&self, index: usize) -> Option<&Ability> {
        self.abilities.get(index)
    }

    /// Index of the single active ability, if any
    pub fn active_ability(&self) -> Option<(usize, &Ability)> {
        self.abilities.iter().enumerate().find(|(_, a)| a.is_active())
    }
}

const fn active(
    name: &'static str,
    text: &'static str,
    cooldown: u32,
    target: AbilityTarget,
    effect: AbilityEffect,
) -> Ability {
    Ability {
        name,
        text,
        kind: AbilityKind::Active {
            cooldown,
            target,
            effect: Some(effect),
        },
    }
}

const fn passive(name: &'static str, text: &'static str) -> Ability {
    Ability {
        name,
        text,
        kind: AbilityKind::Passive,
    }
}

const STANDARD_UNITS: [UnitDef; 9] = [
    UnitDef {
        kind: UnitKind::Soldier,
        name: "Soldier",
        description: "Reliable frontline infantry. Cheap and versatile.",
        cost: 3,
        hp: 6,
        attack: 2,
        range: 1,
        speed: 2,
        can_climb_mountain: false,
        can_cross_water: false,
        water_only: false,
        can_attack_diagonal: false,
        summon_only: false,
        abilities: &[
            active("Charge", "Attack an enemy in range and advance if it falls.", 2,
                AbilityTarget::EnemyInRange, AbilityEffect::Charge),
            passive("Resolute", "Takes slightly less damage (flavor)."),
        ],
    },
    UnitDef {
        kind: UnitKind::Archer,
        name: "Archer",
        description: "Ranged unit that stays back and fires far.",
        cost: 4,
        hp: 4,
        attack: 2,
        range: 3,
        speed: 2,
        can_climb_mountain: false,
        can_cross_water: false,
        water_only: false,
        can_attack_diagonal: true,
        summon_only: false,
        abilities: &[
            active("Volley", "Hit every enemy in a 3x3 area around a tile in range.", 2,
                AbilityTarget::TileInRange, AbilityEffect::Volley),
            passive("Eagle Eye", "Slightly ignores defensive bonuses (flavor)."),
        ],
    },
    UnitDef {
        kind: UnitKind::Builder,
        name: "Builder",
        description: "Can construct bridges on adjacent water tiles.",
        cost: 5,
        hp: 5,
        attack: 1,
        range: 1,
        speed: 2,
        can_climb_mountain: false,
        can_cross_water: false,
        water_only: false,
        can_attack_diagonal: false,
        summon_only: false,
        abilities: &[
            active("Build Bridge", "Turn an adjacent water tile into a bridge.", 1,
                AbilityTarget::AdjacentWater, AbilityEffect::BuildBridge),
            passive("Handy", "Builds more efficiently (flavor)."),
        ],
    },
    UnitDef {
        kind: UnitKind::Naval,
        name: "Gunship",
        description: "Naval craft that must be placed on water.",
        cost: 6,
        hp: 7,
        attack: 3,
        range: 2,
        speed: 3,
        can_climb_mountain: false,
        can_cross_water: false,
        water_only: true,
        can_attack_diagonal: true,
        summon_only: false,
        abilities: &[
            active("Bombard", "Attack an enemy within 2 tiles.", 2,
                AbilityTarget::EnemyWithinTwo, AbilityEffect::Bombard),
            passive("Seaborne", "Excellent movement on water (flavor)."),
        ],
    },
    UnitDef {
        kind: UnitKind::Medic,
        name: "Medic",
        description: "Heals adjacent friendly units.",
        cost: 5,
        hp: 5,
        attack: 1,
        range: 1,
        speed: 2,
        can_climb_mountain: false,
        can_cross_water: false,
        water_only: false,
        can_attack_diagonal: false,
        summon_only: false,
        abilities: &[
            active("Heal", "Restore 3 hp to an adjacent wounded ally.", 2,
                AbilityTarget::AdjacentAlly, AbilityEffect::Heal),
            passive("Tender", "Heals are slightly more effective (flavor)."),
        ],
    },
    UnitDef {
        kind: UnitKind::Scout,
        name: "Scout",
        description: "Fast mover. Great for capturing objectives.",
        cost: 2,
        hp: 3,
        attack: 1,
        range: 1,
        speed: 4,
        can_climb_mountain: false,
        can_cross_water: false,
        water_only: false,
        can_attack_diagonal: false,
        summon_only: false,
        abilities: &[
            active("Dash", "Gain +2 movement until the next turn.", 2,
                AbilityTarget::Caster, AbilityEffect::Dash),
            passive("Light Foot", "Harder to hit in open terrain (flavor)."),
        ],
    },
    UnitDef {
        kind: UnitKind::Tank,
        name: "Tank",
        description: "Armored unit, slow and powerful.",
        cost: 8,
        hp: 12,
        attack: 4,
        range: 1,
        speed: 1,
        can_climb_mountain: false,
        can_cross_water: false,
        water_only: false,
        can_attack_diagonal: false,
        summon_only: false,
        abilities: &[
            active("Overrun", "Hit an adjacent enemy, then push it back or roll over it.", 2,
                AbilityTarget::AdjacentEnemy, AbilityEffect::Overrun),
            passive("Bulwark", "Reduces incoming damage (flavor)."),
        ],
    },
    UnitDef {
        kind: UnitKind::Shade,
        name: "Shade",
        description: "A unit from the shadow realm with stealthy tricks.",
        cost: 7,
        hp: 5,
        attack: 3,
        range: 1,
        speed: 3,
        can_climb_mountain: false,
        can_cross_water: false,
        water_only: false,
        can_attack_diagonal: false,
        summon_only: false,
        abilities: &[
            active("Vanish", "Slip into the shadow realm until your next turn.", 3,
                AbilityTarget::Caster, AbilityEffect::Vanish),
            passive("Nightstalker", "Stronger when near other shadow units (flavor)."),
        ],
    },
    UnitDef {
        kind: UnitKind::Wolf,
        name: "Wolf",
        description: "A summoned beast. Not available in the shop.",
        cost: 0,
        hp: 3,
        attack: 2,
        range: 1,
        speed: 3,
        can_climb_mountain: false,
        can_cross_water: false,
        water_only: false,
        can_attack_diagonal: false,
        summon_only: true,
        abilities: &[
            passive("Feral", "Attacks with ferocity (flavor)."),
        ],
    },
];

lazy_static! {
    static ref STANDARD_CATALOG: Catalog = Catalog {
        defs: STANDARD_UNITS.to_vec(),
    };
}

/// Registry of unit archetypes, in shop order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    defs: Vec<UnitDef>,
}

impl Catalog {
    /// The archetypes shipped with the game
    pub fn standard() -> Self {
        STANDARD_CATALOG.clone()
    }

    pub fn get(&self, kind: UnitKind) -> Option<&UnitDef> {
        self.defs.iter().find(|def| def.kind == kind)
    }

    pub fn lookup(&self, kind: UnitKind) -> Result<&UnitDef> {
        self.get(kind)
            .ok_or_else(|| anyhow!("No catalog entry for unit {}", kind))
    }

    /// Adds an archetype, replacing any existing entry of the same kind
    pub fn insert(&mut self, def: UnitDef) {
        match self.defs.iter_mut().find(|d| d.kind == def.kind) {
            Some(existing) => *existing = def,
            None => self.defs.push(def),
        }
    }

    pub fn remove(&mut self, kind: UnitKind) -> Option<UnitDef> {
        let idx = self.defs.iter().position(|d| d.kind == kind)?;
        Some(self.defs.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitDef> {
        self.defs.iter()
    }

    /// Archetypes that can be bought at all
    pub fn purchasable(&self) -> impl Iterator<Item = &UnitDef> {
        self.defs.iter().filter(|def| !def.summon_only)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::convert::{FromIndex, ToIndex};
    use test_case::test_case;

    #[test]
    fn test_standard_catalog_covers_every_kind() {
        let catalog = Catalog::standard();
        for kind in UnitKind::ALL {
            let def = catalog.get(kind).unwrap();
            assert_eq!(def.kind, kind);
            assert!(def.abilities.iter().filter(|a| a.is_active()).count() <= 1);
        }
        assert_eq!(catalog.purchasable().count(), 8);
    }

    #[test_case(UnitKind::Soldier, 3, 6, 2, 1, 2)]
    #[test_case(UnitKind::Archer, 4, 4, 2, 3, 2)]
    #[test_case(UnitKind::Naval, 6, 7, 3, 2, 3)]
    #[test_case(UnitKind::Tank, 8, 12, 4, 1, 1)]
    #[test_case(UnitKind::Scout, 2, 3, 1, 1, 4)]
    fn test_unit_stats(kind: UnitKind, cost: i32, hp: i32, attack: i32, range: i32, speed: i32) {
        let catalog = Catalog::standard();
        let def = catalog.get(kind).unwrap();
        assert_eq!((def.cost, def.hp, def.attack, def.range, def.speed), (cost, hp, attack, range, speed));
    }

    #[test]
    fn test_diagonal_attackers() {
        let catalog = Catalog::standard();
        let diagonal: Vec<_> = catalog
            .iter()
            .filter(|d| d.can_attack_diagonal)
            .map(|d| d.kind)
            .collect();
        assert_eq!(diagonal, vec![UnitKind::Archer, UnitKind::Naval]);
    }

    #[test]
    fn test_terrain_affinity() {
        let catalog = Catalog::standard();
        let soldier = catalog.get(UnitKind::Soldier).unwrap();
        let naval = catalog.get(UnitKind::Naval).unwrap();

        assert!(soldier.can_enter(Terrain::Forest));
        assert!(!soldier.can_enter(Terrain::Water));
        assert!(soldier.can_enter(Terrain::Bridge));
        assert!(!soldier.can_spawn_on(Terrain::Mountain));

        assert!(naval.can_spawn_on(Terrain::Water));
        assert!(naval.can_spawn_on(Terrain::Bridge));
        assert!(!naval.can_spawn_on(Terrain::Plain));
        assert!(naval.can_enter(Terrain::Water));
    }

    #[test]
    fn test_catalog_insert_and_remove() {
        let mut catalog = Catalog::standard();
        let mut wolf = catalog.get(UnitKind::Wolf).unwrap().clone();
        wolf.summon_only = false;
        catalog.insert(wolf);
        assert_eq!(catalog.purchasable().count(), 9);
        assert!(catalog.remove(UnitKind::Tank).is_some());
        assert!(catalog.lookup(UnitKind::Tank).is_err());
    }

    #[test]
    fn test_unit_kind_parse() {
        assert_eq!("Gunship".parse::<UnitKind>().unwrap(), UnitKind::Naval);
        assert_eq!("shade".parse::<UnitKind>().unwrap(), UnitKind::Shade);
        assert!("dragon".parse::<UnitKind>().is_err());
        assert_eq!(UnitKind::from_index(UnitKind::Medic.to_index().unwrap()).unwrap(), UnitKind::Medic);
    }
}
