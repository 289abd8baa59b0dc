use anyhow::{bail, Result};
use num_derive::{FromPrimitive, ToPrimitive};
use serde::Serialize;
use std::ops::{Index, IndexMut, Not};
use std::str::FromStr;

use super::convert::impl_index_conversions;

/// Player in the game. Player 1 moves first and starts at the bottom of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    P1,
    P2,
}

impl Side {
    pub fn all() -> [Side; 2] {
        [Side::P1, Side::P2]
    }

    pub fn opponent(self) -> Self {
        !self
    }

    /// 1-based player number as shown to players
    pub fn number(self) -> u8 {
        match self {
            Side::P1 => 1,
            Side::P2 => 2,
        }
    }

    const fn slot(self) -> usize {
        match self {
            Side::P1 => 0,
            Side::P2 => 1,
        }
    }
}

impl_index_conversions!(Side, "side");

impl Not for Side {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Side::P1 => Side::P2,
            Side::P2 => Side::P1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.number())
    }
}

impl FromStr for Side {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "1" | "p1" => Ok(Side::P1),
            "2" | "p2" => Ok(Side::P2),
            _ => bail!("Unknown side: {}", s),
        }
    }
}

/// Array indexed by player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideArray<T> {
    pub values: [T; 2],
}

impl<T> SideArray<T> {
    pub fn new(p1: T, p2: T) -> Self {
        Self {
            values: [p1, p2],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.values.iter_mut()
    }
}

impl<T: Clone> SideArray<T> {
    pub fn splat(value: T) -> Self {
        Self::new(value.clone(), value)
    }
}

impl<T> Index<Side> for SideArray<T> {
    type Output = T;

    fn index(&self, index: Side) -> &Self::Output {
        &self.values[index.slot()]
    }
}

impl<T> IndexMut<Side> for SideArray<T> {
    fn index_mut(&mut self, index: Side) -> &mut Self::Output {
        &mut self.values[index.slot()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::convert::{FromIndex, ToIndex};

    #[test]
    fn test_side_from_index() {
        assert_eq!(Side::from_index(0).unwrap(), Side::P1);
        assert_eq!(Side::from_index(1).unwrap(), Side::P2);
        assert!(Side::from_index(2).is_err());
        assert_eq!(Side::P2.to_index().unwrap(), 1);
    }

    #[test]
    fn test_side_parse() {
        assert_eq!("1".parse::<Side>().unwrap(), Side::P1);
        assert_eq!("P2".parse::<Side>().unwrap(), Side::P2);
        assert!("3".parse::<Side>().is_err());
        assert_eq!(!Side::P1, Side::P2);
        assert_eq!(Side::P2.opponent(), Side::P1);
    }

    #[test]
    fn test_side_array() {
        let mut array = SideArray::new(5, 10);
        assert_eq!(array[Side::P1], 5);
        assert_eq!(array[Side::P2], 10);

        array[Side::P1] = 15;
        for v in array.iter_mut() {
            *v *= 2;
        }
        let values: Vec<_> = array.iter().copied().collect();
        assert_eq!(values, vec![30, 20]);
    }
}
