//! Core game representations and rules

pub mod board;
pub mod convert;
pub mod display;
pub mod game;
pub mod layout;
pub mod loc;
pub mod mapgen;
pub mod outcome;
pub mod rules;
pub mod side;
pub mod snapshot;
pub mod terrain;
pub mod units;

pub use board::{Board, Cell, Piece, PieceState, UnitId};
pub use convert::{FromIndex, ToIndex};
pub use game::{GameConfig, GameState, NexusInfo, PlayerState, Targeting};
pub use loc::{Loc, LocDelta, BOARD_SIZE};
pub use outcome::ActionOutcome;
pub use side::{Side, SideArray};
pub use snapshot::Snapshot;
pub use terrain::{Realm, RealmArray, Terrain};
pub use units::{Ability, AbilityEffect, AbilityTarget, Catalog, UnitDef, UnitKind};
