use std::collections::HashSet;

use crate::coord::Coord;
use crate::force::Force;
use crate::grid::Grid;


// Maximal 4-connected set of same-colored stones.
pub type Group = HashSet<Coord>;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    grid: Grid,
}

impl Board {
    pub fn new() -> Self { Board { grid: Grid::new() } }
    pub fn from_grid(grid: Grid) -> Self { Board { grid } }

    pub fn grid(&self) -> &Grid { &self.grid }
    pub fn get(&self, coord: Coord) -> Option<Force> { self.grid[coord] }
    pub fn is_free(&self, coord: Coord) -> bool { self.grid[coord].is_none() }
    pub fn is_empty(&self) -> bool { self.grid.stones().next().is_none() }

    pub fn free_cells(&self) -> Vec<Coord> { Coord::all().filter(|&c| self.is_free(c)).collect() }

    pub fn stone_count(&self, force: Force) -> usize {
        self.grid.stones().filter(|&(_, f)| f == force).count()
    }

    // Does not check anything: move legality is decided by the game.
    pub fn place(&mut self, coord: Coord, force: Force) { self.grid[coord] = Some(force); }

    pub fn clear(&mut self) { self.grid.clear(); }

    // Returns the group of `force` containing `start`, or an empty group if there is no `force`
    // stone at `start`.
    pub fn group(&self, start: Coord, force: Force) -> Group {
        let mut group = Group::new();
        if self.grid[start] != Some(force) {
            return group;
        }
        let mut stack = vec![start];
        while let Some(coord) = stack.pop() {
            if group.insert(coord) {
                stack.extend(
                    coord
                        .neighbors()
                        .filter(|&n| self.grid[n] == Some(force) && !group.contains(&n)),
                );
            }
        }
        group
    }

    pub fn has_liberty(&self, group: &Group) -> bool {
        group
            .iter()
            .any(|coord| coord.neighbors().any(|n| self.grid[n].is_none()))
    }

    pub fn remove_group(&mut self, group: &Group) {
        for &coord in group {
            self.grid[coord] = None;
        }
    }

    // Removes every group of `force` that has no liberties. Returns the number of removed stones.
    //
    // Liberties are evaluated against the board as it was before this call: removing one group
    // cannot give liberties to another group of the same force, since same-force groups are never
    // adjacent.
    pub fn capture(&mut self, force: Force) -> u32 {
        let mut visited = HashSet::new();
        let mut captured = 0;
        for coord in Coord::all() {
            if self.grid[coord] != Some(force) || visited.contains(&coord) {
                continue;
            }
            let group = self.group(coord, force);
            visited.extend(group.iter().copied());
            if !self.has_liberty(&group) {
                self.remove_group(&group);
                captured += group.len() as u32;
            }
        }
        captured
    }
}
