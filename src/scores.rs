use std::ops;

use enum_map::EnumMap;
use serde::{Deserialize, Serialize};

use crate::force::Force;


// Number of opponent stones captured by each force during the current game.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scores {
    per_force: EnumMap<Force, u32>,
}

impl Scores {
    pub fn new() -> Self { Scores::default() }

    pub fn add(&mut self, force: Force, captured: u32) { self.per_force[force] += captured; }
    pub fn reset(&mut self) { *self = Scores::default(); }
    pub fn iter(&self) -> impl Iterator<Item = (Force, u32)> + '_ {
        self.per_force.iter().map(|(force, &score)| (force, score))
    }
}

impl ops::Index<Force> for Scores {
    type Output = u32;
    fn index(&self, force: Force) -> &Self::Output { &self.per_force[force] }
}
