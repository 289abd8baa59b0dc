use std::{
    fmt::Display,
    ops::{Add, Sub},
    str::FromStr,
};
use anyhow::Context;
use serde::Serialize;

/// Side length of the square board
pub const BOARD_SIZE: usize = 11;
pub const BOARD_CELLS: usize = BOARD_SIZE * BOARD_SIZE;

/// A location on the game board. `y` grows downwards; player 1 starts at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Loc {
    pub x: i32,
    pub y: i32,
}

impl Loc {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn in_bounds(&self) -> bool {
        self.x >= 0 && self.x < BOARD_SIZE as i32 &&
        self.y >= 0 && self.y < BOARD_SIZE as i32
    }

    pub fn from_index(index: usize) -> Self {
        Self {
            x: (index % BOARD_SIZE) as i32,
            y: (index / BOARD_SIZE) as i32,
        }
    }

    /// Row-major index; only meaningful for in-bounds locations
    pub fn index(&self) -> usize {
        (self.y as usize) * BOARD_SIZE + (self.x as usize)
    }

    /// Orthogonal (4-way) step distance
    pub fn manhattan(&self, other: &Loc) -> i32 {
        (self - other).manhattan()
    }

    /// Diagonal-inclusive (8-way) distance
    pub fn chebyshev(&self, other: &Loc) -> i32 {
        (self - other).chebyshev()
    }

    /// In-bounds orthogonal neighbours, in +x, -x, +y, -y order
    pub fn neighbors4(&self) -> Vec<Loc> {
        ORTHOGONAL
            .iter()
            .map(|delta| self + delta)
            .filter(|loc| loc.in_bounds())
            .collect()
    }

    /// In-bounds 8-way neighbours, scanned row by row
    pub fn neighbors8(&self) -> Vec<Loc> {
        let mut out = Vec::with_capacity(8);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let loc = self + &LocDelta::new(dx, dy);
                if loc.in_bounds() {
                    out.push(loc);
                }
            }
        }
        out
    }

    /// In-bounds cells of the square block of the given radius centred here (including self)
    pub fn block(&self, radius: i32) -> Vec<Loc> {
        let mut out = Vec::new();
        for y in (self.y - radius)..=(self.y + radius) {
            for x in (self.x - radius)..=(self.x + radius) {
                let loc = Loc::new(x, y);
                if loc.in_bounds() {
                    out.push(loc);
                }
            }
        }
        out
    }

    /// Point reflection through the board centre
    pub const fn mirror(&self) -> Loc {
        Loc {
            x: BOARD_SIZE as i32 - 1 - self.x,
            y: BOARD_SIZE as i32 - 1 - self.y,
        }
    }

    pub fn all() -> impl Iterator<Item = Loc> {
        (0..BOARD_CELLS).map(Loc::from_index)
    }
}

impl From<(i32, i32)> for Loc {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl FromStr for Loc {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s.split_once(',')
            .context("Invalid loc, expected x,y")?;

        Ok(Loc {
            x: x.trim().parse().context("Invalid x coordinate")?,
            y: y.trim().parse().context("Invalid y coordinate")?,
        })
    }
}

impl Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocDelta {
    pub dx: i32,
    pub dy: i32,
}

impl LocDelta {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub fn manhattan(&self) -> i32 {
        self.dx.abs() + self.dy.abs()
    }

    pub fn chebyshev(&self) -> i32 {
        self.dx.abs().max(self.dy.abs())
    }
}

pub const ORTHOGONAL: [LocDelta; 4] = [
    LocDelta::new(1, 0),
    LocDelta::new(-1, 0),
    LocDelta::new(0, 1),
    LocDelta::new(0, -1),
];

impl Add<&LocDelta> for &Loc {
    type Output = Loc;

    fn add(self, other: &LocDelta) -> Self::Output {
        Loc {
            x: self.x + other.dx,
            y: self.y + other.dy,
        }
    }
}

impl Sub<&Loc> for &Loc {
    type Output = LocDelta;

    fn sub(self, other: &Loc) -> Self::Output {
        LocDelta {
            dx: self.x - other.x,
            dy: self.y - other.y,
        }
    }
}
