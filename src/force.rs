use enum_map::Enum;
use serde::{Deserialize, Serialize};
use strum::EnumIter;


// Stone color. Black always moves first.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Enum, EnumIter, Serialize, Deserialize,
)]
pub enum Force {
    Black,
    White,
}

impl Force {
    pub fn opponent(self) -> Force {
        match self {
            Force::Black => Force::White,
            Force::White => Force::Black,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Force::Black => "Black",
            Force::White => "White",
        }
    }
}
