//! Terrain types and occupancy realms

use anyhow::{anyhow, bail, Result};
use num_derive::{FromPrimitive, ToPrimitive};
use serde::Serialize;
use std::fmt::Display;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use super::convert::impl_index_conversions;

/// Ground type of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromPrimitive, ToPrimitive, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    Plain,
    Water,
    Forest,
    Mountain,
    Bridge,
}

impl_index_conversions!(Terrain, "terrain");

impl Terrain {
    /// Terrains the map generator samples from, with their weights
    pub const WEIGHTED: [(Terrain, f64); 4] = [
        (Terrain::Plain, 0.30),
        (Terrain::Water, 0.25),
        (Terrain::Forest, 0.25),
        (Terrain::Mountain, 0.20),
    ];

    /// Rough ground never holds a spawner, heart or nexus
    pub fn is_rough(self) -> bool {
        matches!(self, Terrain::Water | Terrain::Forest | Terrain::Mountain)
    }

    pub fn to_layout_char(self) -> char {
        match self {
            Terrain::Plain => '.',
            Terrain::Water => '~',
            Terrain::Forest => '*',
            Terrain::Mountain => '^',
            Terrain::Bridge => '=',
        }
    }

    pub fn from_layout_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Terrain::Plain),
            '~' => Some(Terrain::Water),
            '*' => Some(Terrain::Forest),
            '^' => Some(Terrain::Mountain),
            '=' => Some(Terrain::Bridge),
            _ => None,
        }
    }
}

impl Display for Terrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Terrain::Plain => "plain",
            Terrain::Water => "water",
            Terrain::Forest => "forest",
            Terrain::Mountain => "mountain",
            Terrain::Bridge => "bridge",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Terrain {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(Terrain::Plain),
            "water" => Ok(Terrain::Water),
            "forest" => Ok(Terrain::Forest),
            "mountain" => Ok(Terrain::Mountain),
            "bridge" => Ok(Terrain::Bridge),
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Terrain::from_layout_char(c)
                        .ok_or_else(|| anyhow!("Unknown terrain: {}", s)),
                    _ => bail!("Unknown terrain: {}", s),
                }
            }
        }
    }
}

/// Parallel occupancy plane. Both realms share the board geometry; only the
/// overworld is subject to terrain and structural blockers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromPrimitive, ToPrimitive, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Realm {
    #[default]
    Overworld,
    Shadow,
}

impl_index_conversions!(Realm, "realm");

impl Realm {
    pub fn other(self) -> Realm {
        match self {
            Realm::Overworld => Realm::Shadow,
            Realm::Shadow => Realm::Overworld,
        }
    }

    const fn slot(self) -> usize {
        match self {
            Realm::Overworld => 0,
            Realm::Shadow => 1,
        }
    }
}

impl Display for Realm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Realm::Overworld => write!(f, "overworld"),
            Realm::Shadow => write!(f, "shadow"),
        }
    }
}

/// Array indexed by realm
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealmArray<T> {
    values: [T; 2],
}

impl<T> RealmArray<T> {
    pub fn new(overworld: T, shadow: T) -> Self {
        Self {
            values: [overworld, shadow],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.values.iter_mut()
    }
}

impl<T> Index<Realm> for RealmArray<T> {
    type Output = T;

    fn index(&self, index: Realm) -> &Self::Output {
        &self.values[index.slot()]
    }
}

impl<T> IndexMut<Realm> for RealmArray<T> {
    fn index_mut(&mut self, index: Realm) -> &mut Self::Output {
        &mut self.values[index.slot()]
    }
}
