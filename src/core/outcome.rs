use serde::Serialize;

use super::loc::Loc;

/// Result of a successful action: the tiles whose contents changed, for
/// renderers that want to flash them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub affected: Vec<Loc>,
}

impl ActionOutcome {
    pub fn new(affected: Vec<Loc>) -> Self {
        Self { affected }
    }

    pub fn single(loc: Loc) -> Self {
        Self {
            affected: vec![loc],
        }
    }

    pub fn with(mut self, loc: Loc) -> Self {
        if !self.affected.contains(&loc) {
            self.affected.push(loc);
        }
        self
    }
}
