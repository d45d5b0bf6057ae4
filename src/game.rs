use std::time::Duration;

use instant::Instant;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::coord::Coord;
use crate::force::Force;
use crate::grid::Grid;
use crate::restart::{DEFAULT_RESTART_DELAY, RestartScheduler};
use crate::scores::Scores;


pub const DEFAULT_WIN_SCORE: u32 = 10;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rules {
    // A force wins as soon as it has captured this many stones.
    pub win_score: u32,
    // Time between a victory and the automatic start of a new game.
    pub restart_delay: Duration,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            win_score: DEFAULT_WIN_SCORE,
            restart_delay: DEFAULT_RESTART_DELAY,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum GameStatus {
    Active,
    Victory(Force),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum MoveError {
    CellOccupied,
    WrongTurnOrder,
    GameOver,
    // Sent by a spectator.
    NotAPlayer,
    // Sent by a player for the other player's color.
    ForeignStone,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MoveOutcome {
    pub captured: u32,
    pub status: GameStatus,
}

// Point-in-time copy of the game. This is what goes over the wire and what clients mirror.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameSnapshot {
    pub board: Grid,
    pub scores: Scores,
    pub turn: Force,
    pub status: GameStatus,
}

impl GameSnapshot {
    pub fn game_over(&self) -> bool { self.status != GameStatus::Active }
    pub fn winner(&self) -> Option<Force> {
        match self.status {
            GameStatus::Active => None,
            GameStatus::Victory(force) => Some(force),
        }
    }
}

// The authoritative game. Lives on the server for the whole lifetime of the process and is reset
// in place between games.
#[derive(Clone, Debug)]
pub struct CaptureGame {
    win_score: u32,
    board: Board,
    scores: Scores,
    turn: Force,
    status: GameStatus,
    restart: RestartScheduler,
}

impl CaptureGame {
    pub fn new(rules: Rules) -> Self {
        CaptureGame {
            win_score: rules.win_score,
            board: Board::new(),
            scores: Scores::new(),
            turn: Force::Black,
            status: GameStatus::Active,
            restart: RestartScheduler::new(rules.restart_delay),
        }
    }

    pub fn board(&self) -> &Board { &self.board }
    pub fn scores(&self) -> Scores { self.scores }
    pub fn turn(&self) -> Force { self.turn }
    pub fn status(&self) -> GameStatus { self.status }
    pub fn restart_scheduler(&self) -> &RestartScheduler { &self.restart }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.grid().clone(),
            scores: self.scores,
            turn: self.turn,
            status: self.status,
        }
    }

    // On error the game is left unchanged.
    pub fn try_move(
        &mut self, coord: Coord, force: Force, now: Instant,
    ) -> Result<MoveOutcome, MoveError> {
        if self.status != GameStatus::Active {
            return Err(MoveError::GameOver);
        }
        if force != self.turn {
            return Err(MoveError::WrongTurnOrder);
        }
        if !self.board.is_free(coord) {
            return Err(MoveError::CellOccupied);
        }
        self.board.place(coord, force);
        // Improvement potential: Forbid suicide. Right now a stone without liberties stays on the
        // board unless it captures something; it can only be removed by a later opponent move.
        let captured = self.board.capture(force.opponent());
        self.scores.add(force, captured);
        self.turn = force.opponent();
        // Only the mover's score can change, so only the mover can win here.
        if self.scores[force] >= self.win_score {
            self.status = GameStatus::Victory(force);
            self.restart.arm(now);
        }
        Ok(MoveOutcome { captured, status: self.status })
    }

    // Starts a new game if the restart deadline has passed. Returns whether it did.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.restart.fire_if_due(now) {
            self.reset();
            true
        } else {
            false
        }
    }

    // Cancels a pending restart, so a reset never happens twice for one victory.
    pub fn reset(&mut self) {
        self.restart.cancel();
        self.board.clear();
        self.scores.reset();
        self.turn = Force::Black;
        self.status = GameStatus::Active;
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_util::{board_from_ascii, coord};

    fn game_from_board(board: Board, turn: Force) -> CaptureGame {
        CaptureGame {
            board,
            turn,
            ..CaptureGame::new(Rules::default())
        }
    }

    fn t(now: Instant, secs: u64) -> Instant { now + Duration::from_secs(secs) }

    #[test]
    fn three_moves_without_captures() {
        let now = Instant::now();
        let mut game = CaptureGame::new(Rules::default());
        game.try_move(coord(0, 0), Force::Black, now).unwrap();
        game.try_move(coord(0, 1), Force::White, now).unwrap();
        game.try_move(coord(1, 1), Force::Black, now).unwrap();
        let stones = game.board().grid().stones().collect::<Vec<_>>();
        assert_eq!(stones, vec![
            (coord(0, 0), Force::Black),
            (coord(0, 1), Force::White),
            (coord(1, 1), Force::Black),
        ]);
        assert_eq!(game.scores(), Scores::new());
        assert_eq!(game.turn(), Force::White);
        assert_eq!(game.status(), GameStatus::Active);
    }

    #[test]
    fn surrounded_stone_is_captured() {
        let now = Instant::now();
        let mut game = CaptureGame::new(Rules::default());
        game.try_move(coord(3, 4), Force::Black, now).unwrap();
        game.try_move(coord(4, 4), Force::White, now).unwrap();
        game.try_move(coord(4, 3), Force::Black, now).unwrap();
        game.try_move(coord(0, 0), Force::White, now).unwrap();
        game.try_move(coord(4, 5), Force::Black, now).unwrap();
        game.try_move(coord(0, 8), Force::White, now).unwrap();
        let outcome = game.try_move(coord(5, 4), Force::Black, now).unwrap();
        assert_eq!(outcome, MoveOutcome { captured: 1, status: GameStatus::Active });
        assert_eq!(game.board().get(coord(4, 4)), None);
        assert_eq!(game.scores()[Force::Black], 1);
        assert_eq!(game.scores()[Force::White], 0);
        assert_eq!(game.turn(), Force::White);
    }

    #[test]
    fn legal_move_changes_only_placed_and_captured_cells() {
        let now = Instant::now();
        let mut game = game_from_board(
            board_from_ascii(
                "
                . W B . . . . . .
                W B . . . . . . .
                B . . . . . . . .
                . . . . . . . . W
                . . . . . . . . .
                . . . . . . . . .
                . . . . . . . . .
                . . . . . . . . .
                . . . . . . . . .
                ",
            ),
            Force::Black,
        );
        let before = game.board().clone();
        // Black at a1 takes both white stones; its own stone would have no liberties otherwise.
        let outcome = game.try_move(coord(0, 0), Force::Black, now).unwrap();
        assert_eq!(outcome.captured, 2);
        for c in Coord::all() {
            let expected = if c == coord(0, 0) {
                Some(Force::Black)
            } else if c == coord(0, 1) || c == coord(1, 0) {
                None
            } else {
                before.get(c)
            };
            assert_eq!(game.board().get(c), expected, "at {c}");
        }
        assert_eq!(game.scores()[Force::Black], 2);
        assert_eq!(game.scores()[Force::White], 0);
        assert_eq!(game.turn(), Force::White);
    }

    #[test]
    fn illegal_moves_leave_game_unchanged() {
        let now = Instant::now();
        let mut game = CaptureGame::new(Rules::default());
        game.try_move(coord(2, 2), Force::Black, now).unwrap();
        let before = game.snapshot();
        assert_eq!(game.try_move(coord(2, 2), Force::White, now), Err(MoveError::CellOccupied));
        assert_eq!(game.try_move(coord(3, 3), Force::Black, now), Err(MoveError::WrongTurnOrder));
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn suicide_is_allowed() {
        let now = Instant::now();
        let mut game = game_from_board(
            board_from_ascii(
                "
                . B . . . . . . .
                B . . . . . . . .
                . . . . . . . . .
                . . . . . . . . .
                . . . . . . . . .
                . . . . . . . . .
                . . . . . . . . .
                . . . . . . . . .
                . . . . . . . . .
                ",
            ),
            Force::White,
        );
        let outcome = game.try_move(coord(0, 0), Force::White, now).unwrap();
        assert_eq!(outcome.captured, 0);
        assert_eq!(game.board().get(coord(0, 0)), Some(Force::White));
    }

    #[test]
    fn victory_arms_restart_and_blocks_moves() {
        let now = Instant::now();
        let mut game = game_from_board(
            board_from_ascii(
                "
                . . . . . . . . .
                . . . . B . . . .
                . . . B W B . . .
                . . . . . . . . .
                . . . . . . . . .
                . . . . . . . . .
                . . . . . . . . .
                . . . . . . . . .
                . . . . . . . . .
                ",
            ),
            Force::Black,
        );
        game.scores.add(Force::Black, 9);
        let outcome = game.try_move(coord(3, 4), Force::Black, now).unwrap();
        assert_eq!(outcome, MoveOutcome { captured: 1, status: GameStatus::Victory(Force::Black) });
        assert_eq!(game.snapshot().winner(), Some(Force::Black));
        assert!(game.snapshot().game_over());
        assert_eq!(game.restart_scheduler().deadline(), Some(t(now, 5)));
        assert_eq!(game.try_move(coord(8, 8), Force::White, now), Err(MoveError::GameOver));
    }

    #[test]
    fn mover_wins_even_if_opponent_is_also_at_win_score() {
        let now = Instant::now();
        let mut game = game_from_board(
            board_from_ascii(
                "
                . . . . . . . . .
                . . . . W . . . .
                . . . W B W . . .
                . . . . . . . . .
                . . . . . . . . .
                . . . . . . . . .
                . . . . . . . . .
                . . . . . . . . .
                . . . . . . . . .
                ",
            ),
            Force::White,
        );
        game.scores.add(Force::Black, 10);
        game.scores.add(Force::White, 9);
        game.try_move(coord(3, 4), Force::White, now).unwrap();
        assert_eq!(game.status(), GameStatus::Victory(Force::White));
    }

    #[test]
    fn restart_after_delay() {
        let now = Instant::now();
        let mut game = CaptureGame::new(Rules { win_score: 1, ..Rules::default() });
        game.try_move(coord(0, 1), Force::Black, now).unwrap();
        game.try_move(coord(0, 0), Force::White, now).unwrap();
        game.try_move(coord(1, 0), Force::Black, now).unwrap();
        assert_eq!(game.status(), GameStatus::Victory(Force::Black));
        assert!(!game.tick(t(now, 4)));
        assert_eq!(game.status(), GameStatus::Victory(Force::Black));
        assert!(game.tick(t(now, 5)));
        assert_eq!(game.snapshot(), CaptureGame::new(Rules::default()).snapshot());
        assert!(!game.tick(t(now, 10)));
    }

    #[test]
    fn manual_reset_cancels_pending_restart() {
        let now = Instant::now();
        let mut game = CaptureGame::new(Rules { win_score: 1, ..Rules::default() });
        game.try_move(coord(0, 1), Force::Black, now).unwrap();
        game.try_move(coord(0, 0), Force::White, now).unwrap();
        game.try_move(coord(1, 0), Force::Black, now).unwrap();
        game.reset();
        game.try_move(coord(5, 5), Force::Black, now).unwrap();
        assert!(!game.tick(t(now, 6)));
        assert_eq!(game.board().get(coord(5, 5)), Some(Force::Black));
    }
}
