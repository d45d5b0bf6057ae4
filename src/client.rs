use std::collections::VecDeque;

use crate::coord::Coord;
use crate::event::{GoClientEvent, GoServerEvent};
use crate::force::Force;
use crate::game::{GameSnapshot, GameStatus, MoveError};
use crate::role::Role;


#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveCommandError {
    NotConnected,
    NotAPlayer,
    GameOver,
    NotYourTurn,
    CellOccupied,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum NotableEvent {
    Welcome(Role),
    GameUpdated,
    GameOver(Force),
    NewGameStarted,
    MoveRejected(Coord, MoveError),
    ServerShuttingDown,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum EventError {
    RoleChanged { old: Role, new: Role },
    NotWelcomed,
}

// Client-side mirror of the server game. The server is the source of truth: the mirror is only
// ever replaced with snapshots from the server, never changed locally.
//
// Improvement potential: Add sequence numbers. Snapshots are applied in arrival order, which is
// only correct on an ordered transport.
pub struct ClientState {
    role: Option<Role>,
    game: Option<GameSnapshot>,
    outgoing_events: VecDeque<GoClientEvent>,
}

impl ClientState {
    pub fn new() -> Self {
        ClientState {
            role: None,
            game: None,
            outgoing_events: VecDeque::new(),
        }
    }

    pub fn role(&self) -> Option<Role> { self.role }
    pub fn my_force(&self) -> Option<Force> { self.role.and_then(Role::force) }
    pub fn game(&self) -> Option<&GameSnapshot> { self.game.as_ref() }

    pub fn is_my_turn(&self) -> bool {
        match (self.my_force(), &self.game) {
            (Some(force), Some(game)) => !game.game_over() && game.turn == force,
            _ => false,
        }
    }

    pub fn next_outgoing_event(&mut self) -> Option<GoClientEvent> {
        self.outgoing_events.pop_front()
    }

    // Checks what the client can check locally; the server will verify again.
    pub fn make_move(&mut self, coord: Coord) -> Result<(), MoveCommandError> {
        let (Some(role), Some(game)) = (self.role, &self.game) else {
            return Err(MoveCommandError::NotConnected);
        };
        let Some(force) = role.force() else {
            return Err(MoveCommandError::NotAPlayer);
        };
        if game.game_over() {
            return Err(MoveCommandError::GameOver);
        }
        if game.turn != force {
            return Err(MoveCommandError::NotYourTurn);
        }
        if game.board[coord].is_some() {
            return Err(MoveCommandError::CellOccupied);
        }
        self.outgoing_events.push_back(GoClientEvent::MakeMove { coord, force });
        Ok(())
    }

    pub fn process_server_event(
        &mut self, event: GoServerEvent,
    ) -> Result<NotableEvent, EventError> {
        match event {
            GoServerEvent::Welcome { role, game } => {
                match self.role {
                    Some(old) if old != role => {
                        return Err(EventError::RoleChanged { old, new: role });
                    }
                    _ => self.role = Some(role),
                }
                self.game = Some(game);
                Ok(NotableEvent::Welcome(role))
            }
            GoServerEvent::GameUpdated { game } => {
                if self.role.is_none() {
                    return Err(EventError::NotWelcomed);
                }
                let old_status = self.game.as_ref().map(|g| g.status);
                let new_status = game.status;
                self.game = Some(game);
                Ok(match (old_status, new_status) {
                    (Some(GameStatus::Active) | None, GameStatus::Victory(winner)) => {
                        NotableEvent::GameOver(winner)
                    }
                    (Some(GameStatus::Victory(_)), GameStatus::Active) => NotableEvent::NewGameStarted,
                    _ => NotableEvent::GameUpdated,
                })
            }
            GoServerEvent::MoveRejected { coord, reason } => {
                Ok(NotableEvent::MoveRejected(coord, reason))
            }
            GoServerEvent::ShuttingDown => Ok(NotableEvent::ServerShuttingDown),
        }
    }
}
