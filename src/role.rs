use serde::{Deserialize, Serialize};

use crate::force::Force;


// How a connected peer participates in the game. Assigned by the server once per connection.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Role {
    // Plays the given color. At most one live connection holds each color.
    Player(Force),
    // Receives updates, cannot move.
    Spectator,
}

impl Role {
    pub fn force(self) -> Option<Force> {
        match self {
            Role::Player(force) => Some(force),
            Role::Spectator => None,
        }
    }

    pub fn is_player(self) -> bool { matches!(self, Role::Player(_)) }
}
