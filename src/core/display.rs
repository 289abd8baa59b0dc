use std::fmt;
use colored::{ColoredString, Colorize};

use super::{
    board::{Board, Cell, Piece},
    game::GameState,
    loc::{Loc, BOARD_SIZE},
    side::Side,
    terrain::{Realm, Terrain},
};

fn paint(text: String, side: Option<Side>) -> ColoredString {
    match side {
        Some(Side::P1) => text.bright_blue(),
        Some(Side::P2) => text.bright_red(),
        None => text.normal(),
    }
}

fn terrain_glyph(terrain: Terrain) -> ColoredString {
    let glyph = terrain.to_layout_char().to_string();
    match terrain {
        Terrain::Plain => glyph.dimmed(),
        Terrain::Water => glyph.cyan(),
        Terrain::Forest => glyph.green(),
        Terrain::Mountain => glyph.white(),
        Terrain::Bridge => glyph.yellow(),
    }
}

fn cell_glyph(cell: &Cell) -> ColoredString {
    if let Some(piece) = cell.unit(Realm::Overworld) {
        return paint(piece.kind.symbol().to_string(), Some(piece.side));
    }
    if let Some(piece) = cell.unit(Realm::Shadow) {
        return paint(piece.kind.symbol().to_ascii_lowercase().to_string(), Some(piece.side)).dimmed();
    }
    if let Some(side) = cell.spawner {
        return paint("#".to_string(), Some(side));
    }
    if let Some(side) = cell.heart {
        return paint("@".to_string(), Some(side));
    }
    if let Some(nexus) = cell.nexus {
        return paint("$".to_string(), nexus.owner).bold();
    }
    terrain_glyph(cell.terrain)
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} #{} {} at {} ({}) hp {}/{} actions {}",
            paint(self.kind.symbol().to_string(), Some(self.side)),
            self.id,
            self.kind,
            self.loc,
            self.realm,
            self.hp,
            self.max_hp,
            self.state.actions_left
        )
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for x in 0..BOARD_SIZE {
            write!(f, "{:>2}", x)?;
        }
        writeln!(f)?;

        for y in 0..BOARD_SIZE as i32 {
            write!(f, "{:>2} ", y)?;
            for x in 0..BOARD_SIZE as i32 {
                match self.cell(&Loc::new(x, y)) {
                    Some(cell) => write!(f, " {}", cell_glyph(cell))?,
                    None => write!(f, "  ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(
            f,
            "Turn {}: {} to move",
            self.turn,
            paint(self.side_to_move.to_string(), Some(self.side_to_move))
        )?;
        writeln!(
            f,
            "HP: {} | {}",
            paint(self.players[Side::P1].hp.to_string(), Some(Side::P1)),
            paint(self.players[Side::P2].hp.to_string(), Some(Side::P2))
        )?;
        writeln!(
            f,
            "Energy: {} | {}",
            paint(self.players[Side::P1].energy.to_string(), Some(Side::P1)),
            paint(self.players[Side::P2].energy.to_string(), Some(Side::P2))
        )?;
        if let Some(winner) = self.winner {
            writeln!(f, "Winner: {}", paint(winner.to_string(), Some(winner)))?;
        }
        writeln!(f)?;
        write!(f, "{}", self.board)?;

        let mut pieces: Vec<&Piece> = self.board.pieces().collect();
        pieces.sort_by_key(|piece| piece.id);
        if !pieces.is_empty() {
            writeln!(f)?;
            for piece in pieces {
                writeln!(f, "{}", piece)?;
            }
        }
        Ok(())
    }
}
