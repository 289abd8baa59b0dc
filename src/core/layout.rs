//! Text layouts: a board written as rows of terrain characters
//!
//! `.` plain, `~` water, `*` forest, `^` mountain, `=` bridge. Structures sit
//! on plain ground: `S`/`s` spawner and `H`/`h` heart of player 1/2, `N` a
//! neutral nexus.
//!
//! A structure glyph replaces the terrain glyph, so writing out a board whose
//! structure stands on other terrain loses that terrain: it reads back as
//! plain. Nexus ownership is not written either.

use anyhow::{bail, ensure, Result};

use super::{
    board::Board,
    loc::{Loc, BOARD_SIZE},
    side::Side,
    terrain::Terrain,
};

/// Build a board from layout rows. Blank lines and surrounding whitespace are
/// ignored.
pub fn parse_layout(text: &str) -> Result<Board> {
    let rows: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    ensure!(
        rows.len() == BOARD_SIZE,
        "Layout has {} rows, expected {}",
        rows.len(),
        BOARD_SIZE
    );

    let mut board = Board::new();
    for (y, row) in rows.iter().enumerate() {
        let chars: Vec<char> = row.chars().collect();
        ensure!(
            chars.len() == BOARD_SIZE,
            "Layout row {} has {} cells, expected {}",
            y,
            chars.len(),
            BOARD_SIZE
        );

        for (x, c) in chars.into_iter().enumerate() {
            let loc = Loc::new(x as i32, y as i32);
            if let Some(terrain) = Terrain::from_layout_char(c) {
                board.set_terrain(&loc, terrain)?;
                continue;
            }
            match c {
                'S' => board.place_spawner(&loc, Side::P1)?,
                's' => board.place_spawner(&loc, Side::P2)?,
                'H' => board.place_heart(&loc, Side::P1)?,
                'h' => board.place_heart(&loc, Side::P2)?,
                'N' => board.place_nexus(&loc)?,
                _ => bail!("Unknown layout character '{}' at {}", c, loc),
            }
        }
    }
    Ok(board)
}

fn layout_char(board: &Board, loc: &Loc) -> char {
    let Some(cell) = board.cell(loc) else {
        return ' ';
    };
    match (cell.spawner, cell.heart, cell.nexus) {
        (Some(Side::P1), _, _) => 'S',
        (Some(Side::P2), _, _) => 's',
        (_, Some(Side::P1), _) => 'H',
        (_, Some(Side::P2), _) => 'h',
        (_, _, Some(_)) => 'N',
        _ => cell.terrain.to_layout_char(),
    }
}

/// Write a board back out as layout rows
pub fn to_layout(board: &Board) -> String {
    let mut out = String::with_capacity(BOARD_SIZE * (BOARD_SIZE + 1));
    for y in 0..BOARD_SIZE as i32 {
        for x in 0..BOARD_SIZE as i32 {
            out.push(layout_char(board, &Loc::new(x, y)));
        }
        out.push('\n');
    }
    out
}
