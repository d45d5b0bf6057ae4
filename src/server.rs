use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};

use instant::Instant;
use log::{debug, info, warn};
use strum::IntoEnumIterator;

use crate::coord::Coord;
use crate::event::{GoClientEvent, GoServerEvent};
use crate::force::Force;
use crate::game::{CaptureGame, GameStatus, MoveError, Rules};
use crate::role::Role;


#[derive(Debug)]
pub enum IncomingEvent {
    // Sent right after `Clients::add_client`; triggers the welcome message.
    Connected(ClientId),
    Network(ClientId, GoClientEvent),
    Tick,
    Terminate,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ClientId(usize);

struct Client {
    events_tx: async_std::channel::Sender<GoServerEvent>,
    role: Role,
    logging_id: String,
    // Broadcasts skip the client until it got the welcome message.
    welcomed: bool,
}

struct ClientMap {
    map: HashMap<ClientId, Client>,
    next_id: usize,
}

impl ClientMap {
    // Precondition: there is at most one player per force.
    fn free_role(&self) -> Role {
        Force::iter()
            .find(|&force| !self.map.values().any(|c| c.role == Role::Player(force)))
            .map_or(Role::Spectator, Role::Player)
    }
}

// Registry of live connections. Every access goes through one lock, including role assignment,
// so two simultaneous connections can never get the same color.
pub struct Clients {
    clients: Mutex<ClientMap>,
}

impl Clients {
    pub fn new() -> Self {
        Clients {
            clients: Mutex::new(ClientMap { map: HashMap::new(), next_id: 1 }),
        }
    }

    pub fn add_client(
        &self, events_tx: async_std::channel::Sender<GoServerEvent>, logging_id: String,
    ) -> (ClientId, Role) {
        let mut clients = self.clients.lock().unwrap();
        let id = ClientId(clients.next_id);
        clients.next_id += 1;
        let role = clients.free_role();
        clients.map.insert(id, Client { events_tx, role, logging_id, welcomed: false });
        (id, role)
    }

    // Returns client logging id if the client was removed, or `None` if it was already gone.
    pub fn remove_client(&self, id: ClientId) -> Option<String> {
        let client = self.clients.lock().unwrap().map.remove(&id)?;
        client.events_tx.close();
        Some(client.logging_id)
    }

    pub fn role(&self, id: ClientId) -> Option<Role> {
        self.clients.lock().unwrap().map.get(&id).map(|c| c.role)
    }

    pub fn len(&self) -> usize { self.clients.lock().unwrap().map.len() }
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    // Returns the role of the welcomed client, or `None` if the client is gone.
    pub fn welcome(
        &self, id: ClientId, make_event: impl FnOnce(Role) -> GoServerEvent,
    ) -> Option<Role> {
        let (events_tx, role) = {
            let mut clients = self.clients.lock().unwrap();
            let client = clients.map.get_mut(&id)?;
            client.welcomed = true;
            (client.events_tx.clone(), client.role)
        };
        if events_tx.try_send(make_event(role)).is_err() {
            self.drop_unreachable(id);
            return None;
        }
        Some(role)
    }

    pub fn send(&self, id: ClientId, event: GoServerEvent) {
        let events_tx = match self.clients.lock().unwrap().map.get(&id) {
            Some(client) => client.events_tx.clone(),
            None => return,
        };
        if events_tx.try_send(event).is_err() {
            self.drop_unreachable(id);
        }
    }

    // Sends to a copy of the membership list, so a concurrent disconnect cannot affect the loop.
    // A failed send removes that client and does not affect others.
    pub fn broadcast(&self, event: &GoServerEvent) {
        let recipients = self
            .clients
            .lock()
            .unwrap()
            .map
            .iter()
            .filter(|(_, client)| client.welcomed)
            .map(|(&id, client)| (id, client.events_tx.clone()))
            .collect::<Vec<_>>();
        for (id, events_tx) in recipients {
            if events_tx.try_send(event.clone()).is_err() {
                self.drop_unreachable(id);
            }
        }
    }

    fn drop_unreachable(&self, id: ClientId) {
        if let Some(logging_id) = self.remove_client(id) {
            warn!("Client {} dropped: cannot send events", logging_id);
        }
    }
}


pub struct ServerState {
    clients: Arc<Clients>,
    game: CaptureGame,
}

impl ServerState {
    pub fn new(clients: Arc<Clients>, rules: Rules) -> Self {
        ServerState { clients, game: CaptureGame::new(rules) }
    }

    pub fn game(&self) -> &CaptureGame { &self.game }

    pub fn apply_event(&mut self, event: IncomingEvent, now: Instant) -> ControlFlow<()> {
        match event {
            IncomingEvent::Connected(client_id) => self.process_connected(client_id),
            IncomingEvent::Network(client_id, event) => match event {
                GoClientEvent::MakeMove { coord, force } => {
                    self.process_make_move(client_id, coord, force, now)
                }
            },
            IncomingEvent::Tick => {
                if self.game.tick(now) {
                    info!("Starting new game");
                    self.broadcast_game();
                }
            }
            IncomingEvent::Terminate => {
                info!("Shutting down");
                self.clients.broadcast(&GoServerEvent::ShuttingDown);
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn process_connected(&mut self, client_id: ClientId) {
        let game = self.game.snapshot();
        match self.clients.welcome(client_id, |role| GoServerEvent::Welcome { role, game }) {
            Some(role) => info!("Client {:?} joined as {:?}", client_id, role),
            None => debug!("Client {:?} left before welcome", client_id),
        }
    }

    fn process_make_move(&mut self, client_id: ClientId, coord: Coord, force: Force, now: Instant) {
        let Some(role) = self.clients.role(client_id) else {
            return;
        };
        let result = match role.force() {
            None => Err(MoveError::NotAPlayer),
            Some(my_force) if my_force != force => Err(MoveError::ForeignStone),
            Some(_) => self.game.try_move(coord, force, now),
        };
        match result {
            Ok(outcome) => {
                debug!("{} at {}, captured {}", force.name(), coord, outcome.captured);
                if let GameStatus::Victory(winner) = outcome.status {
                    let scores = self.game.scores();
                    info!(
                        "{} wins {}:{}",
                        winner.name(),
                        scores[winner],
                        scores[winner.opponent()]
                    );
                }
                self.broadcast_game();
            }
            Err(reason) => {
                warn!("Move {} by {:?} ({:?}) rejected: {:?}", coord, client_id, role, reason);
                self.clients.send(client_id, GoServerEvent::MoveRejected { coord, reason });
            }
        }
    }

    fn broadcast_game(&self) {
        self.clients.broadcast(&GoServerEvent::GameUpdated { game: self.game.snapshot() });
    }
}
