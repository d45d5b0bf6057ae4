use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};


pub const BOARD_SIZE: u8 = 9;

const NEIGHBOR_OFFSETS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];


// Zero-based (row, col). Row 0 is the top of the board as rendered.
// Always in bounds: deserialization rejects out-of-range values.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "(u8, u8)", into = "(u8, u8)")]
pub struct Coord {
    row: u8,
    col: u8,
}

impl Coord {
    pub const fn new(row: u8, col: u8) -> Option<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE { Some(Coord { row, col }) } else { None }
    }

    pub const fn row(self) -> u8 { self.row }
    pub const fn col(self) -> u8 { self.col }

    pub fn all() -> impl Iterator<Item = Coord> + Clone {
        (0..BOARD_SIZE).cartesian_product(0..BOARD_SIZE).map(|(row, col)| Coord { row, col })
    }

    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Coord> {
        let row = u8::try_from(self.row as i8 + d_row).ok()?;
        let col = u8::try_from(self.col as i8 + d_col).ok()?;
        Coord::new(row, col)
    }

    // Orthogonally adjacent coords that are on the board: 2 in a corner, 3 on an edge, 4 otherwise.
    pub fn neighbors(self) -> impl Iterator<Item = Coord> + Clone {
        NEIGHBOR_OFFSETS
            .into_iter()
            .filter_map(move |(d_row, d_col)| self.offset(d_row, d_col))
    }

    // Human notation: column letter followed by one-based row, e.g. "a1" is (0, 0), "i9" is (8, 8).
    pub fn from_human(s: &str) -> Option<Self> {
        let s = s.trim();
        let mut chars = s.chars();
        let col_char = chars.next()?.to_ascii_lowercase();
        if !col_char.is_ascii_lowercase() {
            return None;
        }
        let col = u8::try_from(col_char as u32 - 'a' as u32).ok()?;
        let row_str = chars.as_str();
        if row_str.is_empty() || !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let row_one_based: u8 = row_str.parse().ok()?;
        Coord::new(row_one_based.checked_sub(1)?, col)
    }

    pub fn to_human(self) -> String {
        format!("{}{}", col_to_human(self.col), self.row + 1)
    }
}

pub fn col_to_human(col: u8) -> char { (b'a' + col) as char }

impl TryFrom<(u8, u8)> for Coord {
    type Error = String;
    fn try_from((row, col): (u8, u8)) -> Result<Self, Self::Error> {
        Coord::new(row, col).ok_or_else(|| {
            format!("Coord ({row}, {col}) is out of bound for {BOARD_SIZE}x{BOARD_SIZE} board")
        })
    }
}

impl From<Coord> for (u8, u8) {
    fn from(coord: Coord) -> Self { (coord.row, coord.col) }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}", self.to_human()) }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}", self.to_human()) }
}
