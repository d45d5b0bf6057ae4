// Test utilities shared by unit tests and integration tests.

use itertools::Itertools;

use crate::board::Board;
use crate::coord::{BOARD_SIZE, Coord};
use crate::force::Force;
use crate::grid::Grid;


#[track_caller]
pub fn coord(row: u8, col: u8) -> Coord {
    Coord::new(row, col).unwrap_or_else(|| panic!("Invalid coord ({row}, {col})"))
}

// Parses a board drawn row by row: "B" is black, "W" is white, "." is empty.
#[track_caller]
pub fn board_from_ascii(s: &str) -> Board {
    let rows = s
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.split_ascii_whitespace().collect_vec())
        .collect_vec();
    assert_eq!(rows.len(), BOARD_SIZE as usize);
    let mut grid = Grid::new();
    for (row_idx, row) in rows.iter().enumerate() {
        assert_eq!(row.len(), BOARD_SIZE as usize, "Bad row: {row:?}");
        for (col_idx, &cell) in row.iter().enumerate() {
            grid[coord(row_idx as u8, col_idx as u8)] = match cell {
                "." => None,
                "B" => Some(Force::Black),
                "W" => Some(Force::White),
                other => panic!("Invalid cell: {other}"),
            };
        }
    }
    Board::from_grid(grid)
}
