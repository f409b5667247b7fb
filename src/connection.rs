use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

const OUTBOUND_CAPACITY: usize = 64;

/// Lifecycle event from the socket task, tagged with the generation of the
/// connection that produced it. The controller drops events whose
/// generation is stale, so a torn-down socket can never move the status of
/// its replacement.
#[derive(Debug)]
pub struct SocketEvent {
    pub generation: u64,
    pub kind: SocketEventKind,
}

#[derive(Debug)]
pub enum SocketEventKind {
    Opened,
    Message(String),
    Error(String),
    Closed,
}

/// Owns the one chat socket.
///
/// `connect` is a no-op while a socket task is live; there is no automatic
/// retry and no outbound queue across connections. `send` hands the payload
/// to the live socket task or drops it with a trace.
pub struct Connection {
    events: mpsc::Sender<SocketEvent>,
    outbound: Option<mpsc::Sender<String>>,
    task: Option<JoinHandle<()>>,
    generation: u64,
}

impl Connection {
    pub fn new(events: mpsc::Sender<SocketEvent>) -> Self {
        Self {
            events,
            outbound: None,
            task: None,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a socket task currently exists (dialing or established).
    pub fn is_live(&self) -> bool {
        self.task
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    pub fn connect(&mut self, url: &str) {
        if self.is_live() {
            tracing::debug!("connect requested while socket is live, ignoring");
            return;
        }
        self.generation += 1;
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);
        self.outbound = Some(outbound_tx);
        self.task = Some(tokio::spawn(run_socket(
            url.to_string(),
            self.generation,
            self.events.clone(),
            outbound_rx,
        )));
    }

    /// Transmit a raw payload over the open socket. Never queues across
    /// connections: when no socket is live the payload is dropped.
    pub fn send(&self, raw: String) {
        match &self.outbound {
            Some(tx) if self.is_live() => {
                if tx.try_send(raw).is_err() {
                    tracing::warn!("outbound channel unavailable, frame dropped");
                }
            }
            _ => {
                tracing::warn!("send while disconnected, frame dropped");
            }
        }
    }

    /// Tear down the socket if one exists. Idempotent.
    pub fn disconnect(&mut self) {
        self.outbound = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Dial the server, then pump frames until the socket errors or closes.
async fn run_socket(
    url: String,
    generation: u64,
    events: mpsc::Sender<SocketEvent>,
    mut outbound: mpsc::Receiver<String>,
) {
    let emit = |kind: SocketEventKind| {
        let events = events.clone();
        async move {
            let _ = events.send(SocketEvent { generation, kind }).await;
        }
    };

    let (stream, _) = match connect_async(url.as_str()).await {
        Ok(pair) => pair,
        Err(e) => {
            tracing::warn!("websocket connect to {} failed: {}", url, e);
            emit(SocketEventKind::Error(e.to_string())).await;
            return;
        }
    };
    tracing::debug!("websocket connected to {}", url);
    emit(SocketEventKind::Opened).await;

    let (mut ws_tx, mut ws_rx) = stream.split();
    loop {
        tokio::select! {
            out = outbound.recv() => match out {
                Some(raw) => {
                    if let Err(e) = ws_tx.send(WsMessage::Text(raw.into())).await {
                        tracing::warn!("websocket send failed: {}", e);
                        emit(SocketEventKind::Error(e.to_string())).await;
                        break;
                    }
                }
                None => {
                    let _ = ws_tx.send(WsMessage::Close(None)).await;
                    emit(SocketEventKind::Closed).await;
                    break;
                }
            },
            inbound = ws_rx.next() => match inbound {
                Some(Ok(WsMessage::Text(text))) => {
                    emit(SocketEventKind::Message(text.to_string())).await;
                }
                Some(Ok(WsMessage::Close(_))) | None => {
                    emit(SocketEventKind::Closed).await;
                    break;
                }
                Some(Ok(_)) => {
                    // Ping/pong are answered by tungstenite; binary frames
                    // are not part of the chat protocol.
                }
                Some(Err(e)) => {
                    tracing::warn!("websocket receive failed: {}", e);
                    emit(SocketEventKind::Error(e.to_string())).await;
                    break;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_failure_emits_error_event() {
        let (events_tx, mut events_rx) = mpsc::channel(16);
        let mut connection = Connection::new(events_tx);

        // Nothing listens on this port.
        connection.connect("ws://127.0.0.1:1/ws/chat");
        let event = events_rx.recv().await.unwrap();

        assert_eq!(event.generation, 1);
        assert!(matches!(event.kind, SocketEventKind::Error(_)));
    }

    #[tokio::test]
    async fn test_send_while_disconnected_is_a_noop() {
        let (events_tx, mut events_rx) = mpsc::channel(16);
        let connection = Connection::new(events_tx);

        connection.send(r#"{"content":"dropped"}"#.to_string());

        // No socket task exists, so no event can ever arrive.
        assert!(events_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let (events_tx, _events_rx) = mpsc::channel(16);
        let mut connection = Connection::new(events_tx);

        connection.disconnect();
        connection.disconnect();
        assert!(!connection.is_live());
    }

    #[tokio::test]
    async fn test_generation_increments_per_connect() {
        let (events_tx, mut events_rx) = mpsc::channel(16);
        let mut connection = Connection::new(events_tx);

        connection.connect("ws://127.0.0.1:1/ws/chat");
        let first = events_rx.recv().await.unwrap();
        connection.disconnect();

        connection.connect("ws://127.0.0.1:1/ws/chat");
        let second = events_rx.recv().await.unwrap();

        assert_eq!(first.generation, 1);
        assert_eq!(second.generation, 2);
        assert_eq!(connection.generation(), 2);
    }
}
