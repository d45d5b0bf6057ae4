use std::{fmt, ops};

use ndarray::{Array, Array2};
use serde::{Deserialize, Serialize};

use crate::coord::{BOARD_SIZE, Coord};
use crate::force::Force;


// `None` is an empty cell.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "UncheckedGrid")]
pub struct Grid {
    data: Array2<Option<Force>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UncheckedGrid {
    data: Array2<Option<Force>>,
}

impl Grid {
    pub fn new() -> Self {
        Grid {
            data: Array::from_elem((BOARD_SIZE as usize, BOARD_SIZE as usize), None),
        }
    }

    pub fn stones(&self) -> impl Iterator<Item = (Coord, Force)> + '_ {
        Coord::all().filter_map(|coord| self[coord].map(|force| (coord, force)))
    }

    pub fn clear(&mut self) { self.data.fill(None); }
}

impl TryFrom<UncheckedGrid> for Grid {
    type Error = String;
    fn try_from(grid: UncheckedGrid) -> Result<Self, Self::Error> {
        let expected = [BOARD_SIZE as usize, BOARD_SIZE as usize];
        if grid.data.shape() != expected {
            return Err(format!(
                "Expected {}x{} grid, got {:?}",
                BOARD_SIZE,
                BOARD_SIZE,
                grid.data.shape()
            ));
        }
        Ok(Grid { data: grid.data })
    }
}

impl ops::Index<Coord> for Grid {
    type Output = Option<Force>;
    fn index(&self, pos: Coord) -> &Self::Output { &self.data[coord_to_index(pos)] }
}

impl ops::IndexMut<Coord> for Grid {
    fn index_mut(&mut self, pos: Coord) -> &mut Self::Output {
        &mut self.data[coord_to_index(pos)]
    }
}

// `Coord` is always in bounds, so indexing never panics.
fn coord_to_index(pos: Coord) -> [usize; 2] { [pos.row() as usize, pos.col() as usize] }

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Grid ")?;
        f.debug_map().entries(self.stones()).finish()
    }
}
