use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::EndpointConfig;
use crate::connection::{Connection, SocketEvent, SocketEventKind};
use crate::error::Result;
use crate::protocol;
use crate::session::{self, ConnectionStatus, SessionState};

const COMMAND_CAPACITY: usize = 32;
const EVENT_CAPACITY: usize = 64;

#[derive(Debug)]
enum Command {
    SendMessage(String),
    Reconnect,
    Shutdown,
}

/// Caller-facing surface of a running session.
///
/// State is read through cloned snapshots; all mutation happens inside the
/// controller task. Dropping the handle tears the session down.
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<SessionState>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Submit a user query. When the session is not connected the text is
    /// dropped and a reconnect attempt is made instead.
    pub async fn send_message(&self, text: impl Into<String>) {
        let _ = self.commands.send(Command::SendMessage(text.into())).await;
    }

    /// Re-open the chat socket. No-op while a socket is already live.
    pub async fn reconnect(&self) {
        let _ = self.commands.send(Command::Reconnect).await;
    }

    /// Subscribe to state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Latest state snapshot.
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub async fn shutdown(self) {
        let _ = self.commands.send(Command::Shutdown).await;
        let _ = self.task.await;
    }
}

/// Wire up a session and start its event loop. The controller connects
/// immediately on activation; afterwards only explicit `reconnect` calls
/// re-open a closed socket.
pub fn spawn(config: &EndpointConfig) -> Result<SessionHandle> {
    let socket_url = config.chat_socket_url()?;
    let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
    let (event_tx, event_rx) = mpsc::channel(EVENT_CAPACITY);

    let state = SessionState::new();
    let (watch_tx, watch_rx) = watch::channel(state.clone());

    let controller = SessionController {
        socket_url,
        commands: command_rx,
        socket_events: event_rx,
        connection: Connection::new(event_tx),
        state,
        watch_tx,
    };
    let task = tokio::spawn(controller.run());

    Ok(SessionHandle {
        commands: command_tx,
        state: watch_rx,
        task,
    })
}

/// Single owner of `SessionState`. Commands from callers and events from
/// the socket task are interleaved through one `select!` loop, so every
/// mutation runs on this task and no locking is needed.
struct SessionController {
    socket_url: String,
    commands: mpsc::Receiver<Command>,
    socket_events: mpsc::Receiver<SocketEvent>,
    connection: Connection,
    state: SessionState,
    watch_tx: watch::Sender<SessionState>,
}

impl SessionController {
    async fn run(mut self) {
        self.open_socket();
        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(Command::SendMessage(text)) => self.handle_send_message(text),
                    Some(Command::Reconnect) => self.open_socket(),
                    Some(Command::Shutdown) | None => break,
                },
                Some(event) = self.socket_events.recv() => self.handle_socket_event(event),
            }
        }
        self.connection.disconnect();
    }

    fn open_socket(&mut self) {
        if self.connection.is_live() {
            tracing::debug!("connect requested but socket is live, ignoring");
            return;
        }
        self.set_status(ConnectionStatus::Connecting);
        self.connection.connect(&self.socket_url);
    }

    fn handle_send_message(&mut self, text: String) {
        if self.state.status != ConnectionStatus::Connected {
            tracing::warn!(
                "message submitted while {}, dropping input and reconnecting",
                self.state.status.label()
            );
            self.open_socket();
            return;
        }
        self.state.begin_turn(&text);
        self.publish();
        match protocol::encode_user_message(&text) {
            Ok(raw) => self.connection.send(raw),
            Err(e) => tracing::error!("failed to encode user message: {}", e),
        }
    }

    fn handle_socket_event(&mut self, event: SocketEvent) {
        if event.generation != self.connection.generation() {
            tracing::debug!(
                "dropping event from stale socket generation {}",
                event.generation
            );
            return;
        }
        match event.kind {
            SocketEventKind::Opened => self.set_status(ConnectionStatus::Connected),
            SocketEventKind::Message(raw) => match protocol::decode_frame(&raw) {
                Ok(frame) => {
                    session::apply_frame(&mut self.state, frame);
                    self.publish();
                }
                Err(e) => tracing::warn!("discarding malformed frame: {} ({})", e, raw),
            },
            SocketEventKind::Error(reason) => {
                tracing::warn!("socket error: {}", reason);
                self.set_status(ConnectionStatus::Error);
            }
            SocketEventKind::Closed => self.set_status(ConnectionStatus::Disconnected),
        }
    }

    fn set_status(&mut self, status: ConnectionStatus) {
        if self.state.status == status {
            return;
        }
        tracing::debug!(
            "connection status {} -> {}",
            self.state.status.label(),
            status.label()
        );
        self.state.status = status;
        self.publish();
    }

    fn publish(&self) {
        let _ = self.watch_tx.send(self.state.clone());
    }
}
