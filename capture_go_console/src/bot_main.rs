// A client that makes random moves into free cells. Useful for trying out the server without a
// second human.

use std::io;
use std::net::TcpStream;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use capture_go::board::Board;
use capture_go::client::{ClientState, NotableEvent};
use capture_go::coord::Coord;
use capture_go::event::GoServerEvent;
use capture_go::game::GameSnapshot;
use capture_go::network::{self, CommunicationError};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;


const THINKING_TIME: Duration = Duration::from_millis(500);

pub struct BotConfig {
    pub server_address: String,
    pub port: u16,
    pub seed: Option<u64>,
}

fn choose_move(game: &GameSnapshot, rng: &mut StdRng) -> Option<Coord> {
    let board = Board::from_grid(game.board.clone());
    board.free_cells().choose(rng).copied()
}

fn send_outgoing(client_state: &mut ClientState, writer: &mut impl io::Write) -> anyhow::Result<()> {
    while let Some(event) = client_state.next_outgoing_event() {
        network::write_obj(writer, &event)
            .map_err(|err| anyhow::anyhow!("Failed to send move: {:?}", err))?;
    }
    Ok(())
}

pub fn run(config: BotConfig) -> anyhow::Result<()> {
    let seed = config.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut stream_in = TcpStream::connect((config.server_address.as_str(), config.port))
        .with_context(|| format!("Cannot connect to {}:{}", config.server_address, config.port))?;
    let mut stream_out = stream_in.try_clone()?;
    info!("Bot connected to {}:{}, seed {}", config.server_address, config.port, seed);

    let (tx, rx) = mpsc::channel::<Result<GoServerEvent, CommunicationError>>();
    thread::spawn(move || {
        loop {
            let ev = network::read_obj(&mut stream_in);
            let failed = ev.is_err();
            if tx.send(ev).is_err() || failed {
                break;
            }
        }
    });

    let mut client_state = ClientState::new();
    // Set after sending a move until the server answers, so that the bot never moves twice
    // based on the same snapshot.
    let mut awaiting_reply = false;
    for event in rx {
        let event = match event {
            Ok(event) => event,
            Err(CommunicationError::ConnectionClosed) => {
                info!("Server closed the connection");
                return Ok(());
            }
            Err(err) => anyhow::bail!("Connection error: {:?}", err),
        };
        let notable = client_state
            .process_server_event(event)
            .map_err(|err| anyhow::anyhow!("Bad server event: {:?}", err))?;
        match notable {
            NotableEvent::Welcome(role) => {
                info!("Bot joined as {:?}", role);
                if !role.is_player() {
                    info!("No free color, bot is leaving");
                    return Ok(());
                }
            }
            NotableEvent::GameUpdated | NotableEvent::NewGameStarted => awaiting_reply = false,
            NotableEvent::GameOver(winner) => {
                awaiting_reply = false;
                info!("{} wins", winner.name());
            }
            NotableEvent::MoveRejected(coord, reason) => {
                awaiting_reply = false;
                warn!("Move {} rejected: {:?}", coord, reason);
            }
            NotableEvent::ServerShuttingDown => {
                info!("Server is shutting down");
                return Ok(());
            }
        }

        if awaiting_reply || !client_state.is_my_turn() {
            continue;
        }
        let Some(coord) = client_state.game().and_then(|game| choose_move(game, &mut rng)) else {
            continue;
        };
        thread::sleep(THINKING_TIME);
        if client_state.make_move(coord).is_ok() {
            awaiting_reply = true;
        }
        send_outgoing(&mut client_state, &mut stream_out)?;
    }
    anyhow::bail!("Unexpected end of events stream")
}


#[cfg(test)]
mod tests {
    use capture_go::event::GoClientEvent;
    use capture_go::force::Force;
    use capture_go::game::GameStatus;
    use capture_go::role::Role;
    use capture_go::scores::Scores;
    use capture_go::test_util::{board_from_ascii, coord};
    use pretty_assertions::assert_eq;

    use super::*;

    fn snapshot(board: &Board) -> GameSnapshot {
        GameSnapshot {
            board: board.grid().clone(),
            scores: Scores::new(),
            turn: Force::Black,
            status: GameStatus::Active,
        }
    }

    #[test]
    fn bot_only_picks_free_cells() {
        let mut board = board_from_ascii(
            "
            B B B B B B B B B
            B B B B B B B B B
            B B B B B B B B B
            B B B B B B B B B
            B B B B . B B B B
            W W W W W W W W W
            W W W W W W W W W
            W W W W W W W W W
            W W W W W W W W W
            ",
        );
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(choose_move(&snapshot(&board), &mut rng), Some(coord(4, 4)));
        board.place(coord(4, 4), Force::Black);
        assert_eq!(choose_move(&snapshot(&board), &mut rng), None);
    }

    #[test]
    fn queued_move_is_framed_onto_the_stream() {
        let board = Board::new();
        let mut client_state = ClientState::new();
        client_state
            .process_server_event(GoServerEvent::Welcome {
                role: Role::Player(Force::Black),
                game: snapshot(&board),
            })
            .unwrap();
        client_state.make_move(coord(2, 3)).unwrap();

        let mut buf = Vec::new();
        send_outgoing(&mut client_state, &mut buf).unwrap();
        assert_eq!(client_state.next_outgoing_event(), None);
        let sent: GoClientEvent = network::read_obj(&mut io::Cursor::new(buf)).unwrap();
        assert_eq!(sent, GoClientEvent::MakeMove { coord: coord(2, 3), force: Force::Black });
    }

    #[test]
    fn failed_write_is_reported() {
        struct BrokenPipe;
        impl io::Write for BrokenPipe {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::ErrorKind::BrokenPipe.into())
            }
            fn flush(&mut self) -> io::Result<()> { Ok(()) }
        }

        let mut client_state = ClientState::new();
        client_state
            .process_server_event(GoServerEvent::Welcome {
                role: Role::Player(Force::Black),
                game: snapshot(&Board::new()),
            })
            .unwrap();
        client_state.make_move(coord(0, 0)).unwrap();
        let err = send_outgoing(&mut client_state, &mut BrokenPipe).unwrap_err();
        assert!(err.to_string().starts_with("Failed to send move"));
    }
}
