use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::force::Force;
use crate::game::{GameSnapshot, MoveError};
use crate::role::Role;


#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum GoServerEvent {
    // Unicast to a newly accepted connection.
    Welcome {
        role: Role,
        game: GameSnapshot,
    },
    // Broadcast after every accepted move and every reset.
    GameUpdated {
        game: GameSnapshot,
    },
    // Unicast to the client whose move was not applied.
    MoveRejected {
        coord: Coord,
        reason: MoveError,
    },
    ShuttingDown,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum GoClientEvent {
    MakeMove {
        coord: Coord,
        force: Force,
    },
}
