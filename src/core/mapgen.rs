//! Map generation: centrally symmetric, density-balanced terrain with
//! mirrored spawners, hearts and nexuses

use log::debug;
use rand::prelude::*;

use super::{
    board::Board,
    game::GameConfig,
    loc::{Loc, LocDelta, BOARD_CELLS, BOARD_SIZE},
    side::Side,
    terrain::Terrain,
};

const N: i32 = BOARD_SIZE as i32;
const HALF: i32 = N / 2;

/// Chance a top-half cell is sampled rather than left plain
const TOP_ROUGH_CHANCE: f64 = 0.65;
/// Chance a centre-row cell is sampled rather than left plain
const CENTER_ROUGH_CHANCE: f64 = 0.22;
/// Chance a smoothing step resamples instead of taking the majority
const RESAMPLE_CHANCE: f64 = 0.08;

/// Terrain share targets, as inclusive ranges
const NON_PLAIN_BAND: (f64, f64) = (0.55, 0.65);
const WATER_BAND: (f64, f64) = (0.14, 0.26);
const FOREST_BAND: (f64, f64) = (0.14, 0.26);
const MOUNTAIN_BAND: (f64, f64) = (0.12, 0.18);

/// Terrain shares of a board
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Density {
    pub non_plain: f64,
    pub water: f64,
    pub forest: f64,
    pub mountain: f64,
}

impl Density {
    pub fn measure(board: &Board) -> Self {
        let counts = board.terrain_counts();
        let total = BOARD_CELLS as f64;
        Self {
            non_plain: (BOARD_CELLS - counts[0]) as f64 / total,
            water: counts[1] as f64 / total,
            forest: counts[2] as f64 / total,
            mountain: counts[3] as f64 / total,
        }
    }

    pub fn within_bands(&self) -> bool {
        let inside = |value: f64, (lo, hi): (f64, f64)| value >= lo && value <= hi;
        inside(self.non_plain, NON_PLAIN_BAND)
            && inside(self.water, WATER_BAND)
            && inside(self.forest, FOREST_BAND)
            && inside(self.mountain, MOUNTAIN_BAND)
    }
}

/// Generate a complete board: terrain, then spawners and hearts, then nexuses
pub fn generate<R: Rng>(config: &GameConfig, rng: &mut R) -> Board {
    let mut board = generate_terrain(config, rng);
    let (sp1, sp2) = place_spawners(&mut board, rng);
    place_hearts(&mut board, rng, sp1, sp2);
    place_nexuses(&mut board, config, rng);
    board
}

fn sample_terrain<R: Rng>(rng: &mut R) -> Terrain {
    let total: f64 = Terrain::WEIGHTED.iter().map(|(_, w)| w).sum();
    let mut r = rng.random::<f64>() * total;
    for (terrain, weight) in Terrain::WEIGHTED {
        if r < weight {
            return terrain;
        }
        r -= weight;
    }
    Terrain::WEIGHTED[0].0
}

/// Retry terrain generation until the density bands are met, keeping the last
/// attempt if none is
pub fn generate_terrain<R: Rng>(config: &GameConfig, rng: &mut R) -> Board {
    let attempts = config.mapgen_attempts.max(1);
    let mut attempt = 1;

    loop {
        let mut board = Board::new();
        seed_terrain(&mut board, rng);
        for _ in 0..config.smoothing_passes {
            smooth(&mut board, rng);
            mirror_terrain(&mut board);
        }

        let density = Density::measure(&board);
        if density.within_bands() || attempt >= attempts {
            return board;
        }
        debug!("Map attempt {}/{} missed density bands: {:?}", attempt, attempts, density);
        attempt += 1;
    }
}

fn set(board: &mut Board, loc: Loc, terrain: Terrain) {
    if let Some(cell) = board.cell_mut(&loc) {
        cell.terrain = terrain;
    }
}

fn terrain_at(board: &Board, loc: Loc) -> Terrain {
    board.terrain(&loc).unwrap_or_default()
}

fn seed_terrain<R: Rng>(board: &mut Board, rng: &mut R) {
    for y in 0..HALF {
        for x in 0..N {
            let terrain = if rng.random_bool(TOP_ROUGH_CHANCE) {
                sample_terrain(rng)
            } else {
                Terrain::Plain
            };
            set(board, Loc::new(x, y), terrain);
        }
    }

    if N % 2 == 1 {
        for x in 0..=HALF {
            let terrain = if rng.random_bool(CENTER_ROUGH_CHANCE) {
                sample_terrain(rng)
            } else {
                Terrain::Plain
            };
            set(board, Loc::new(x, HALF), terrain);
        }
    }

    mirror_terrain(board);
}

/// Copy the top half onto the bottom half through the board centre, and the
/// left of the centre row onto its right
fn mirror_terrain(board: &mut Board) {
    for y in 0..HALF {
        for x in 0..N {
            let loc = Loc::new(x, y);
            let terrain = terrain_at(board, loc);
            set(board, loc.mirror(), terrain);
        }
    }
    if N % 2 == 1 {
        for x in 0..HALF {
            let loc = Loc::new(x, HALF);
            let terrain = terrain_at(board, loc);
            set(board, loc.mirror(), terrain);
        }
    }
}

/// One smoothing pass over a snapshot of the terrain. Ties go to the terrain
/// met first in row-major order.
fn smooth<R: Rng>(board: &mut Board, rng: &mut R) {
    let snapshot: Vec<Terrain> = Loc::all().map(|loc| terrain_at(board, loc)).collect();

    for loc in Loc::all() {
        let mut counts: Vec<(Terrain, usize)> = Vec::with_capacity(4);
        for neighbor in loc.block(1) {
            let terrain = snapshot[neighbor.index()];
            match counts.iter_mut().find(|(t, _)| *t == terrain) {
                Some((_, n)) => *n += 1,
                None => counts.push((terrain, 1)),
            }
        }

        let mut best = (Terrain::Plain, 0);
        for &(terrain, n) in &counts {
            if n > best.1 {
                best = (terrain, n);
            }
        }

        let terrain = if rng.random_bool(RESAMPLE_CHANCE) {
            sample_terrain(rng)
        } else {
            best.0
        };
        set(board, loc, terrain);
    }
}

fn placable(board: &Board, loc: &Loc) -> bool {
    board.cell(loc).is_some_and(|cell| cell.is_marker_placable())
}

/// Mirrored spawner pair, player 1 in the bottom band
fn place_spawners<R: Rng>(board: &mut Board, rng: &mut R) -> (Loc, Loc) {
    let y_min = (N as f64 * 0.60).floor() as i32;
    let mut candidates: Vec<Loc> = (y_min..=N - 2)
        .flat_map(|y| (2..=N - 3).map(move |x| Loc::new(x, y)))
        .filter(|loc| placable(board, loc) && placable(board, &loc.mirror()))
        .collect();
    candidates.shuffle(rng);

    let (sp1, sp2) = match candidates.first() {
        Some(loc) => (*loc, loc.mirror()),
        None => {
            debug!("No spawner candidates, using the fallback tiles");
            let sp1 = Loc::new(HALF, N - 2);
            let sp2 = Loc::new(N - 1 - HALF, 1);
            set(board, sp1, Terrain::Plain);
            set(board, sp2, Terrain::Plain);
            (sp1, sp2)
        }
    };

    for (loc, side) in [(sp1, Side::P1), (sp2, Side::P2)] {
        if let Err(err) = board.place_spawner(&loc, side) {
            debug!("Spawner placement failed: {}", err);
        }
    }
    (sp1, sp2)
}

fn offsets(radius: i32) -> Vec<LocDelta> {
    let mut out = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx != 0 || dy != 0 {
                out.push(LocDelta::new(dx, dy));
            }
        }
    }
    out
}

/// Hearts near their spawners, with player 2's offset mirrored
fn place_hearts<R: Rng>(board: &mut Board, rng: &mut R, sp1: Loc, sp2: Loc) {
    let mut wide = offsets(2);
    wide.shuffle(rng);

    let pick = wide
        .iter()
        .chain(offsets(1).iter())
        .map(|d| (&sp1 + d, &sp2 + &LocDelta::new(-d.dx, -d.dy)))
        .find(|(h1, h2)| placable(board, h1) && placable(board, h2));

    let (h1, h2) = pick.unwrap_or((sp1, sp2));
    for (loc, side) in [(h1, Side::P1), (h2, Side::P2)] {
        if let Err(err) = board.place_heart(&loc, side) {
            debug!("Heart placement failed: {}", err);
        }
    }
}

fn try_place_pair(board: &mut Board, loc: Loc, radius: i32) -> bool {
    let mirror = loc.mirror();
    if loc == mirror {
        return false;
    }
    if !placable(board, &loc) || !placable(board, &mirror) {
        return false;
    }
    if board.near_marker(&loc, radius) || board.near_marker(&mirror, radius) {
        return false;
    }
    board.place_nexus(&loc).is_ok() && board.place_nexus(&mirror).is_ok()
}

/// Nexus pairs in the upper centre, each reflected through the board centre.
/// Always places exactly the configured number of pairs.
fn place_nexuses<R: Rng>(board: &mut Board, config: &GameConfig, rng: &mut R) {
    let wanted = config.nexus_pairs;
    let mut placed = 0;

    let mut candidates: Vec<Loc> = (1..=HALF - 1)
        .flat_map(|y| (2..=N - 3).map(move |x| Loc::new(x, y)))
        .collect();
    candidates.shuffle(rng);

    for loc in candidates {
        if placed >= wanted {
            break;
        }
        if try_place_pair(board, loc, config.nexus_radius) {
            placed += 1;
        }
    }

    if placed < wanted {
        debug!("Placed {} of {} nexus pairs, scanning the centre", placed, wanted);
        'scan: for y in (HALF - 1)..=(HALF + 1) {
            for x in 2..=N - 3 {
                if placed >= wanted {
                    break 'scan;
                }
                if try_place_pair(board, Loc::new(x, y), config.nexus_fallback_radius) {
                    placed += 1;
                }
            }
        }
    }

    if placed < wanted {
        debug!("Forcing {} nexus pairs onto cleared ground", wanted - placed);
        for loc in Loc::all() {
            if placed >= wanted {
                break;
            }
            let mirror = loc.mirror();
            let free = |l: &Loc| board.cell(l).is_some_and(|c| !c.has_marker());
            if loc.y > HALF || loc == mirror || !free(&loc) || !free(&mirror) {
                continue;
            }
            if board.near_marker(&loc, 1) || board.near_marker(&mirror, 1) {
                continue;
            }
            set(board, loc, Terrain::Plain);
            set(board, mirror, Terrain::Plain);
            if board.place_nexus(&loc).is_ok() && board.place_nexus(&mirror).is_ok() {
                placed += 1;
            }
        }
    }
}
