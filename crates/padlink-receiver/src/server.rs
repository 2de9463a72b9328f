//! Receiver orchestration.
//!
//! One task owns the [`CommandRouter`]. Accepting connections, the
//! per-connection handshake and stream reading all happen in helper tasks
//! that report back over a single channel, so intents from a connection are
//! applied in the order they were sent and the router never runs
//! concurrently with itself.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use padlink_protocol::handshake::respond;
use padlink_protocol::{ClientHello, PeerConnection, QuicTransport, ServerWelcome, Session};
use padlink_types::{ClientId, Dimensions, Intent, Message};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ReceiverError;
use crate::health;
use crate::router::CommandRouter;

/// Receiver-local identifier of one accepted connection.
pub type ConnectionId = u64;

/// Events processed by the receiver's main loop.
pub enum ReceiverEvent {
    /// A client finished the handshake.
    Connected {
        id: ConnectionId,
        hello: ClientHello,
        conn: PeerConnection,
    },
    Intent {
        id: ConnectionId,
        intent: Intent,
    },
    Disconnected {
        id: ConnectionId,
        reason: String,
    },
    Shutdown,
}

/// Snapshot of the receiver, published after every event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiverStatus {
    /// Names of the connected clients.
    pub clients: Vec<String>,
    pub dragging: bool,
    /// Intents taken off the wire so far.
    pub intents: u64,
}

struct ClientConnection {
    client_id: ClientId,
    name: String,
    viewport: Dimensions,
    conn: PeerConnection,
}

pub struct Receiver {
    config: Config,
    transport: QuicTransport,
    router: CommandRouter,
    clients: HashMap<ConnectionId, ClientConnection>,
    /// Connection whose `DragStart` holds the button.
    drag_owner: Option<ConnectionId>,
    intents: u64,
    event_tx: mpsc::Sender<ReceiverEvent>,
    event_rx: mpsc::Receiver<ReceiverEvent>,
    status_tx: watch::Sender<ReceiverStatus>,
}

impl Receiver {
    pub fn new(config: Config, transport: QuicTransport, router: CommandRouter) -> Self {
        let (event_tx, event_rx) = mpsc::channel(1024);
        let (status_tx, _) = watch::channel(ReceiverStatus::default());
        Self {
            config,
            transport,
            router,
            clients: HashMap::new(),
            drag_owner: None,
            intents: 0,
            event_tx,
            event_rx,
            status_tx,
        }
    }

    /// Get a clone of the event sender for feeding events into the receiver.
    pub fn event_sender(&self) -> mpsc::Sender<ReceiverEvent> {
        self.event_tx.clone()
    }

    pub fn status_receiver(&self) -> watch::Receiver<ReceiverStatus> {
        self.status_tx.subscribe()
    }

    /// Run until a [`ReceiverEvent::Shutdown`] arrives.
    pub async fn run(&mut self) -> Result<(), ReceiverError> {
        let local = self.transport.local_addr()?;
        info!(addr = %local, name = %self.config.identity.name, "receiver listening");

        let health = if self.config.server.health {
            let bind = self.config.server.socket_addr()?;
            Some(spawn_health(bind, local.port()).await?)
        } else {
            None
        };
        let acceptor = self.spawn_acceptor();

        let mut tick = tokio::time::interval(self.config.pointer.tick());
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                event = self.event_rx.recv() => {
                    match event {
                        Some(ReceiverEvent::Connected { id, hello, conn }) => {
                            self.handle_connected(id, hello, conn).await;
                        }
                        Some(ReceiverEvent::Intent { id, intent }) => {
                            self.handle_intent(id, intent).await;
                        }
                        Some(ReceiverEvent::Disconnected { id, reason }) => {
                            self.handle_disconnected(id, &reason).await;
                        }
                        Some(ReceiverEvent::Shutdown) | None => {
                            info!("shutting down");
                            break;
                        }
                    }
                    self.publish_status();
                }
                _ = tick.tick() => {
                    self.router.tick().await;
                }
            }
        }

        acceptor.abort();
        if let Some(health) = health {
            health.abort();
        }
        self.shutdown().await;
        Ok(())
    }

    fn spawn_acceptor(&self) -> JoinHandle<()> {
        let transport = self.transport.clone();
        let events = self.event_tx.clone();
        let welcome = ServerWelcome {
            name: self.config.identity.name.clone(),
            screen: self.router.screen(),
        };
        tokio::spawn(async move {
            let mut next_id: ConnectionId = 0;
            loop {
                match transport.accept().await {
                    Ok(conn) => {
                        next_id += 1;
                        tokio::spawn(read_connection(
                            next_id,
                            conn,
                            welcome.clone(),
                            events.clone(),
                        ));
                    }
                    Err(e) => {
                        if events.is_closed() {
                            break;
                        }
                        debug!(error = %e, "accept error");
                    }
                }
            }
        })
    }

    async fn handle_connected(&mut self, id: ConnectionId, hello: ClientHello, conn: PeerConnection) {
        // A phone reconnecting before its old connection timed out gives up
        // the drag it held there.
        let reconnected = self
            .drag_owner
            .and_then(|owner| self.clients.get(&owner))
            .is_some_and(|owner| owner.name == hello.name);
        if reconnected {
            self.release_drag("client reconnected").await;
        }
        info!(
            client = %hello.name,
            client_id = %hello.client_id,
            peer = %conn.remote_address(),
            width = hello.viewport.width,
            height = hello.viewport.height,
            "client connected"
        );
        self.clients.insert(
            id,
            ClientConnection {
                client_id: hello.client_id,
                name: hello.name,
                viewport: hello.viewport,
                conn,
            },
        );
    }

    async fn handle_intent(&mut self, id: ConnectionId, intent: Intent) {
        self.intents += 1;
        if let Intent::Dimensions(dims) = &intent {
            if let Some(client) = self.clients.get_mut(&id) {
                client.viewport = *dims;
                info!(
                    client = %client.name,
                    width = dims.width,
                    height = dims.height,
                    "client dimensions"
                );
            }
        }
        let drag_bracket = matches!(intent, Intent::DragStart | Intent::DragEnd);
        self.router.handle(intent).await;
        if drag_bracket {
            self.drag_owner = match (self.router.is_dragging(), self.drag_owner) {
                (false, _) => None,
                (true, None) => Some(id),
                (true, owner) => owner,
            };
        }
    }

    async fn handle_disconnected(&mut self, id: ConnectionId, reason: &str) {
        if let Some(client) = self.clients.remove(&id) {
            client.conn.close("goodbye");
            info!(
                client = %client.name,
                client_id = %client.client_id,
                width = client.viewport.width,
                height = client.viewport.height,
                reason,
                "client disconnected"
            );
        }
        if self.drag_owner == Some(id) {
            self.release_drag("client disconnected").await;
        }
    }

    async fn release_drag(&mut self, reason: &str) {
        self.drag_owner = None;
        self.router.release(reason).await;
    }

    fn publish_status(&self) {
        let mut clients: Vec<String> = self.clients.values().map(|c| c.name.clone()).collect();
        clients.sort();
        self.status_tx.send_replace(ReceiverStatus {
            clients,
            dragging: self.router.is_dragging(),
            intents: self.intents,
        });
    }

    async fn shutdown(&mut self) {
        for (_, client) in self.clients.drain() {
            client.conn.close("receiver shutting down");
        }
        self.router.shutdown().await;
        self.transport.close();
        self.publish_status();
        info!("receiver shut down complete");
    }
}

async fn spawn_health(bind: SocketAddr, port: u16) -> Result<JoinHandle<()>, ReceiverError> {
    let listener = TcpListener::bind(SocketAddr::new(bind.ip(), port)).await?;
    let ip = health::lan_address().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
    Ok(tokio::spawn(async move {
        if let Err(e) = health::serve(listener, ip).await {
            warn!(error = %e, "health endpoint stopped");
        }
    }))
}

/// Handshake with one connection, then forward its intents until it goes
/// away. Pings are answered here without involving the main loop.
async fn read_connection(
    id: ConnectionId,
    conn: PeerConnection,
    welcome: ServerWelcome,
    events: mpsc::Sender<ReceiverEvent>,
) {
    let remote = conn.remote_address();
    let Session {
        mut sender,
        mut receiver,
        peer,
    } = match respond(&conn, welcome).await {
        Ok(session) => session,
        Err(e) => {
            warn!(peer = %remote, error = %e, "handshake failed");
            conn.close("handshake failed");
            return;
        }
    };

    let connected = ReceiverEvent::Connected {
        id,
        hello: peer,
        conn: conn.clone(),
    };
    if events.send(connected).await.is_err() {
        return;
    }

    let reason = loop {
        match receiver.recv::<Message>().await {
            Ok(Some(Message::Intent(intent))) => {
                if events.send(ReceiverEvent::Intent { id, intent }).await.is_err() {
                    return;
                }
            }
            Ok(Some(Message::Ping { seq })) => {
                if let Err(e) = sender.send(&Message::Pong { seq }).await {
                    break e.to_string();
                }
            }
            Ok(Some(Message::Bye)) => break "client said goodbye".to_string(),
            Ok(Some(other)) => debug!(peer = %remote, ?other, "unexpected message"),
            Ok(None) => break "stream finished".to_string(),
            Err(e) => break e.to_string(),
        }
    };

    let _ = events.send(ReceiverEvent::Disconnected { id, reason }).await;
}
