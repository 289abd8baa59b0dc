use crate::core::{
    side::Side,
    terrain::{Realm, RealmArray, Terrain},
};

use super::piece::Piece;

/// Capturable objective marker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Nexus {
    pub owner: Option<Side>,
}

/// A single board square
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub terrain: Terrain,
    pub units: RealmArray<Option<Piece>>,
    pub nexus: Option<Nexus>,
    pub spawner: Option<Side>,
    pub heart: Option<Side>,
    pub blocked_for_movement: bool,
}

impl Cell {
    pub fn unit(&self, realm: Realm) -> Option<&Piece> {
        self.units[realm].as_ref()
    }

    pub fn is_free(&self, realm: Realm) -> bool {
        self.units[realm].is_none()
    }

    pub fn has_marker(&self) -> bool {
        self.nexus.is_some() || self.spawner.is_some() || self.heart.is_some()
    }

    /// Whether a structure may be placed here during map generation
    pub fn is_marker_placable(&self) -> bool {
        self.is_free(Realm::Overworld) && !self.has_marker() && !self.terrain.is_rough()
    }
}
