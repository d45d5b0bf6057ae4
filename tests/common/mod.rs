// In-memory server and clients: events are routed through channels instead of sockets, and time
// is controlled by the test.
//
// Rust-upgrade (https://github.com/rust-lang/rust/issues/46379):
//   remove `#[allow(dead_code)]` before public functions.

use std::ops;
use std::sync::Arc;
use std::time::Duration;

use capture_go::client::{self, ClientState, NotableEvent};
use capture_go::event::{GoClientEvent, GoServerEvent};
use capture_go::game::{GameSnapshot, Rules};
use capture_go::server::{ClientId, Clients, IncomingEvent, ServerState};
use instant::Instant;


pub struct Server {
    creation_instant: Instant,
    time_elapsed: Duration,
    pub clients: Arc<Clients>,
    pub state: ServerState,
}

impl Server {
    pub fn new(rules: Rules) -> Self {
        let clients = Arc::new(Clients::new());
        let state = ServerState::new(Arc::clone(&clients), rules);
        Server {
            creation_instant: Instant::now(),
            time_elapsed: Duration::ZERO,
            clients,
            state,
        }
    }

    pub fn current_instant(&self) -> Instant { self.creation_instant + self.time_elapsed }

    pub fn apply_event(&mut self, event: IncomingEvent) -> ops::ControlFlow<()> {
        self.state.apply_event(event, self.current_instant())
    }

    pub fn send_network_event(&mut self, id: ClientId, event: GoClientEvent) {
        println!("{:?} >>> {:?}", id, event);
        let _ = self.apply_event(IncomingEvent::Network(id, event));
    }

    pub fn tick(&mut self) { let _ = self.apply_event(IncomingEvent::Tick); }
}


pub struct Client {
    pub id: ClientId,
    incoming_rx: async_std::channel::Receiver<GoServerEvent>,
    pub state: ClientState,
    pub notable_events: Vec<NotableEvent>,
}

impl Client {
    fn connect(server: &mut Server) -> Self {
        let (incoming_tx, incoming_rx) = async_std::channel::unbounded();
        let (id, _) = server.clients.add_client(incoming_tx, "client".to_owned());
        let _ = server.apply_event(IncomingEvent::Connected(id));
        Client {
            id,
            incoming_rx,
            state: ClientState::new(),
            notable_events: vec![],
        }
    }

    fn process_outgoing_events(&mut self, server: &mut Server) -> bool {
        let mut something_changed = false;
        while let Some(event) = self.state.next_outgoing_event() {
            something_changed = true;
            server.send_network_event(self.id, event);
        }
        something_changed
    }

    fn process_incoming_events(&mut self) -> Result<bool, client::EventError> {
        let mut something_changed = false;
        while let Ok(event) = self.incoming_rx.try_recv() {
            something_changed = true;
            println!("{:?} <<< {:?}", self.id, event);
            let notable = self.state.process_server_event(event)?;
            self.notable_events.push(notable);
        }
        Ok(something_changed)
    }

    pub fn is_connected(&self) -> bool { !self.incoming_rx.is_closed() }

    #[allow(dead_code)]
    pub fn game(&self) -> &GameSnapshot { self.state.game().unwrap() }

    #[allow(dead_code)]
    pub fn take_notable_events(&mut self) -> Vec<NotableEvent> {
        std::mem::take(&mut self.notable_events)
    }
}


#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TestClientId(usize);

pub struct World {
    pub server: Server,
    clients: Vec<Client>,
}

impl World {
    pub fn new(rules: Rules) -> Self { World { server: Server::new(rules), clients: vec![] } }

    pub fn set_time(&mut self, time: Duration) { self.server.time_elapsed = time; }

    pub fn new_client(&mut self) -> TestClientId {
        let idx = TestClientId(self.clients.len());
        let client = Client::connect(&mut self.server);
        self.clients.push(client);
        self.process_all_events();
        idx
    }

    #[allow(dead_code)]
    pub fn new_clients<const NUM: usize>(&mut self) -> [TestClientId; NUM] {
        std::array::from_fn(|_| self.new_client())
    }

    #[allow(dead_code)]
    pub fn disconnect_client(&mut self, client_id: TestClientId) {
        let id = self.clients[client_id.0].id;
        self.server.clients.remove_client(id).unwrap();
    }

    #[allow(dead_code)]
    pub fn tick(&mut self) {
        self.server.tick();
        self.process_all_events();
    }

    pub fn process_all_events(&mut self) {
        let mut something_changed = true;
        while something_changed {
            something_changed = false;
            for client in self.clients.iter_mut() {
                if client.process_outgoing_events(&mut self.server) {
                    something_changed = true;
                }
            }
            for client in self.clients.iter_mut() {
                if client.process_incoming_events().unwrap() {
                    something_changed = true;
                }
            }
        }
    }
}

impl ops::Index<TestClientId> for World {
    type Output = Client;
    fn index(&self, id: TestClientId) -> &Self::Output { &self.clients[id.0] }
}

impl ops::IndexMut<TestClientId> for World {
    fn index_mut(&mut self, id: TestClientId) -> &mut Self::Output { &mut self.clients[id.0] }
}

#[allow(dead_code)]
pub fn server_snapshot(world: &World) -> GameSnapshot { world.server.state.game().snapshot() }
