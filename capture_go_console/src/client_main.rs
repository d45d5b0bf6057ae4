use std::fmt;
use std::io;
use std::net::TcpStream;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use capture_go::client::*;
use capture_go::coord::Coord;
use capture_go::event::{GoClientEvent, GoServerEvent};
use capture_go::network::{self, CommunicationError};
use crossterm::event::{self as term_event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{self, Stylize};
use crossterm::{cursor, execute, terminal};
use instant::Instant;
use scopeguard::defer;

use crate::tui;


pub struct ClientConfig {
    pub server_address: String,
    pub port: u16,
}

enum IncomingEvent {
    Network(GoServerEvent),
    NetworkError(CommunicationError),
    Terminal(term_event::Event),
    Tick,
}

fn writeln_raw(stdout: &mut io::Stdout, v: impl fmt::Display) -> io::Result<()> {
    let s = v.to_string();
    // Note. Not using `lines()` because it removes trailing new line.
    for line in s.split('\n') {
        execute!(
            stdout,
            style::Print(line),
            terminal::Clear(terminal::ClearType::UntilNewLine),
            cursor::MoveToNextLine(1),
            cursor::Hide
        )?;
    }
    Ok(())
}

fn render(
    stdout: &mut io::Stdout, app_start_time: Instant, client_state: &ClientState,
    keyboard_input: &str, message: &Option<String>,
) -> io::Result<()> {
    execute!(stdout, cursor::MoveTo(0, 0))?;
    match client_state.game() {
        Some(game) => writeln_raw(stdout, tui::render_game(game, client_state.role()))?,
        None => writeln_raw(stdout, "Loading...")?,
    }

    // Simulate cursor: real cursor blinking is broken with Show/Hide.
    let show_cursor = app_start_time.elapsed().as_millis() % 1000 >= 500;
    let cursor = if show_cursor { '▂' } else { ' ' };
    let input_with_cursor = format!("{}{}", keyboard_input, cursor);
    let input_style =
        if client_state.is_my_turn() { style::Color::White } else { style::Color::DarkGrey };
    writeln_raw(stdout, format!("> {}\n", input_with_cursor.with(input_style)))?;

    if let Some(msg) = message {
        writeln_raw(stdout, msg.clone().with(style::Color::Red))?;
    }
    execute!(stdout, terminal::Clear(terminal::ClearType::FromCursorDown))?;
    Ok(())
}

fn describe_command_error(input: &str, err: MoveCommandError) -> String {
    match err {
        MoveCommandError::NotConnected => "Not connected yet".to_owned(),
        MoveCommandError::NotAPlayer => "Spectators cannot move".to_owned(),
        MoveCommandError::GameOver => "Game over, wait for the next one".to_owned(),
        MoveCommandError::NotYourTurn => "Not your turn".to_owned(),
        MoveCommandError::CellOccupied => format!("{} is occupied", input),
    }
}

fn notable_event_message(event: NotableEvent) -> Option<String> {
    match event {
        NotableEvent::MoveRejected(coord, reason) => {
            Some(format!("Server rejected {}: {:?}", coord, reason))
        }
        NotableEvent::ServerShuttingDown => Some("Server is shutting down".to_owned()),
        NotableEvent::Welcome(_)
        | NotableEvent::GameUpdated
        | NotableEvent::GameOver(_)
        | NotableEvent::NewGameStarted => None,
    }
}

fn send_outgoing(
    client_state: &mut ClientState, server_tx: &mpsc::Sender<GoClientEvent>,
) -> anyhow::Result<()> {
    while let Some(event) = client_state.next_outgoing_event() {
        server_tx.send(event).context("Connection writer is gone")?;
    }
    Ok(())
}

pub fn run(config: ClientConfig) -> anyhow::Result<()> {
    let server_addr = (config.server_address.as_str(), config.port);
    println!("Connecting to {}:{}...", server_addr.0, server_addr.1);
    let mut stream_in = TcpStream::connect(server_addr)
        .with_context(|| format!("Cannot connect to {}:{}", server_addr.0, server_addr.1))?;
    stream_in.set_nodelay(true)?;
    let mut stream_out = stream_in.try_clone()?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;
    defer! {
        let _ = execute!(io::stdout(), terminal::LeaveAlternateScreen, cursor::Show);
        let _ = terminal::disable_raw_mode();
    };
    let app_start_time = Instant::now();

    let (tx, rx) = mpsc::channel();
    let tx_net = tx.clone();
    let tx_local = tx.clone();
    let tx_tick = tx;
    thread::spawn(move || {
        loop {
            let ev = match network::read_obj(&mut stream_in) {
                Ok(ev) => IncomingEvent::Network(ev),
                Err(err) => {
                    let _ = tx_net.send(IncomingEvent::NetworkError(err));
                    break;
                }
            };
            if tx_net.send(ev).is_err() {
                break;
            }
        }
    });
    thread::spawn(move || {
        while let Ok(ev) = term_event::read() {
            if tx_local.send(IncomingEvent::Terminal(ev)).is_err() {
                break;
            }
        }
    });
    thread::spawn(move || {
        loop {
            thread::sleep(Duration::from_millis(100));
            if tx_tick.send(IncomingEvent::Tick).is_err() {
                break;
            }
        }
    });

    let (server_tx, server_rx) = mpsc::channel::<GoClientEvent>();
    thread::spawn(move || {
        for ev in server_rx {
            if network::write_obj(&mut stream_out, &ev).is_err() {
                break;
            }
        }
    });

    let mut client_state = ClientState::new();
    let mut keyboard_input = String::new();
    let mut message = None;
    let mut server_shutting_down = false;
    for event in rx {
        match event {
            IncomingEvent::Network(event) => {
                let notable = client_state
                    .process_server_event(event)
                    .map_err(|err| anyhow::anyhow!("Bad server event: {:?}", err))?;
                if let Some(msg) = notable_event_message(notable.clone()) {
                    message = Some(msg);
                }
                match notable {
                    NotableEvent::NewGameStarted => message = None,
                    NotableEvent::ServerShuttingDown => server_shutting_down = true,
                    _ => {}
                }
            }
            IncomingEvent::NetworkError(_) if server_shutting_down => return Ok(()),
            IncomingEvent::NetworkError(err) => {
                anyhow::bail!("Lost connection to server: {:?}", err);
            }
            IncomingEvent::Terminal(term_event::Event::Key(event)) => {
                if event.kind != KeyEventKind::Press {
                    continue;
                }
                match event.code {
                    KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(());
                    }
                    KeyCode::Char(ch) => keyboard_input.push(ch),
                    KeyCode::Backspace => {
                        keyboard_input.pop();
                    }
                    KeyCode::Enter => {
                        let input = std::mem::take(&mut keyboard_input);
                        let input = input.trim();
                        if let Some(cmd) = input.strip_prefix('/') {
                            match cmd {
                                "quit" => return Ok(()),
                                _ => message = Some(format!("Unknown command: '{}'", cmd)),
                            }
                        } else if let Some(coord) = Coord::from_human(input) {
                            message = client_state
                                .make_move(coord)
                                .err()
                                .map(|err| describe_command_error(input, err));
                        } else {
                            message = Some(format!("Cannot parse '{}', expected e.g. 'e5'", input));
                        }
                    }
                    _ => {}
                }
            }
            IncomingEvent::Terminal(_) => {}
            IncomingEvent::Tick => {
                // Any event triggers repaint, so no additional action is required.
            }
        }
        send_outgoing(&mut client_state, &server_tx)?;
        render(&mut stdout, app_start_time, &client_state, &keyboard_input, &message)?;
    }
    anyhow::bail!("Unexpected end of events stream")
}
