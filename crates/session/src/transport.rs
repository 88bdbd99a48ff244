use super::Session;
use mjs_core::ID;
use mjs_core::RECONNECT_BACKOFF;
use mjs_protocol::ClientMessage;
use mjs_protocol::Protocol;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Notify;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::watch;

/// Observable connection lifecycle. Driven only by the transport; observed,
/// never mutated, by everyone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    Closing,
}

/// Identity required to dial into a room.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub token: String,
    pub room: ID<Session>,
}

/// Errors surfaced by the connect path.
#[derive(Debug, Clone)]
pub enum ConnectionError {
    MissingCredentials,
}

impl std::fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredentials => write!(f, "missing identity token"),
        }
    }
}

impl std::error::Error for ConnectionError {}

/// Outbound half of a dialed socket.
#[async_trait::async_trait]
pub trait SocketTx: Send {
    async fn send(&mut self, text: String) -> anyhow::Result<()>;
    async fn close(&mut self);
}

/// Inbound half of a dialed socket. `recv` yields frames in arrival order
/// and `None` once the peer is gone.
#[async_trait::async_trait]
pub trait SocketRx: Send {
    async fn recv(&mut self) -> Option<anyhow::Result<String>>;
}

/// Dials one logical connection. Pluggable so tests can run over channels.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn dial(&self, credentials: &Credentials)
    -> anyhow::Result<(Box<dyn SocketTx>, Box<dyn SocketRx>)>;
}

/// Owns the single socket connection and hides reconnection from all
/// consumers.
///
/// One driver task is the only thing that ever dials, so connect attempts
/// are single-flight by construction. On an unexpected close it waits the
/// fixed backoff and retries; retries stop for good once the terminal
/// end-of-game signal has been observed or the session was deliberately
/// closed.
pub struct Transport;

impl Transport {
    /// Validate credentials and start the driver. Returns immediately; the
    /// connection opens in the background and its progress is observable
    /// through [`TransportHandle::state`].
    pub fn connect(
        connector: Arc<dyn Connector>,
        credentials: Credentials,
        inbound: UnboundedSender<String>,
    ) -> Result<TransportHandle, ConnectionError> {
        if credentials.token.is_empty() {
            return Err(ConnectionError::MissingCredentials);
        }
        let (state, observed) = watch::channel(ConnectionState::Disconnected);
        let (outbound, outbox) = unbounded_channel();
        let handle = TransportHandle {
            outbound,
            state: observed,
            terminal: Arc::new(AtomicBool::new(false)),
            closed: Arc::new(AtomicBool::new(false)),
            close: Arc::new(Notify::new()),
        };
        tokio::spawn(Self::drive(
            connector,
            credentials,
            state,
            outbox,
            inbound,
            handle.terminal.clone(),
            handle.closed.clone(),
            handle.close.clone(),
        ));
        Ok(handle)
    }

    #[allow(clippy::too_many_arguments)]
    async fn drive(
        connector: Arc<dyn Connector>,
        credentials: Credentials,
        state: watch::Sender<ConnectionState>,
        mut outbox: UnboundedReceiver<String>,
        inbound: UnboundedSender<String>,
        terminal: Arc<AtomicBool>,
        closed: Arc<AtomicBool>,
        close: Arc<Notify>,
    ) {
        let gave_up = || terminal.load(Ordering::Acquire) || closed.load(Ordering::Acquire);
        loop {
            state.send_replace(ConnectionState::Connecting);
            let (mut tx, mut rx) = match connector.dial(&credentials).await {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("[transport] connect failed: {:#}", e);
                    state.send_replace(ConnectionState::Disconnected);
                    if gave_up() {
                        break;
                    }
                    tokio::time::sleep(RECONNECT_BACKOFF).await;
                    continue;
                }
            };
            log::info!("[transport] connection open");
            state.send_replace(ConnectionState::Open);
            loop {
                tokio::select! {
                    biased;
                    _ = close.notified() => {
                        state.send_replace(ConnectionState::Closing);
                        tx.close().await;
                        break;
                    }
                    text = outbox.recv() => match text {
                        Some(text) => if let Err(e) = tx.send(text).await {
                            log::warn!("[transport] send failed: {:#}", e);
                            break;
                        },
                        None => {
                            closed.store(true, Ordering::Release);
                            state.send_replace(ConnectionState::Closing);
                            tx.close().await;
                            break;
                        }
                    },
                    frame = rx.recv() => match frame {
                        Some(Ok(text)) => {
                            let _ = inbound.send(text);
                        }
                        Some(Err(e)) => {
                            log::warn!("[transport] receive failed: {:#}", e);
                            break;
                        }
                        None => {
                            log::info!("[transport] connection closed by peer");
                            break;
                        }
                    },
                }
            }
            state.send_replace(ConnectionState::Disconnected);
            if gave_up() {
                break;
            }
            log::info!(
                "[transport] reconnecting in {}s",
                RECONNECT_BACKOFF.as_secs()
            );
            tokio::time::sleep(RECONNECT_BACKOFF).await;
            if gave_up() {
                break;
            }
        }
        log::debug!("[transport] driver stopped");
    }
}

/// Cheap cloneable handle to the transport driver.
#[derive(Clone)]
pub struct TransportHandle {
    outbound: UnboundedSender<String>,
    state: watch::Receiver<ConnectionState>,
    terminal: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
    close: Arc<Notify>,
}

impl TransportHandle {
    /// Best-effort send. Dropped with a warning if the connection is not
    /// open; callers needing certainty watch [`TransportHandle::state`].
    pub fn send(&self, message: &ClientMessage) {
        if *self.state.borrow() != ConnectionState::Open {
            log::warn!("[transport] dropping {:?}: connection not open", message);
            return;
        }
        let _ = self.outbound.send(Protocol::encode(message));
    }

    /// Current and future connection states.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Record that the terminal end-of-game signal was observed; the driver
    /// will not reconnect past it.
    pub fn mark_terminal(&self) {
        self.terminal.store(true, Ordering::Release);
    }

    /// True once the terminal end-of-game signal has been observed.
    pub fn terminated(&self) -> bool {
        self.terminal.load(Ordering::Acquire)
    }

    /// Deliberate local close: take the connection down and stop the driver.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        // notify_one stores a permit, so a close between polls is not lost
        self.close.notify_one();
    }

    /// Driverless handle pinned open, with the outbound side exposed.
    #[cfg(test)]
    pub(crate) fn stub() -> (TransportHandle, UnboundedReceiver<String>) {
        let (outbound, outbox) = unbounded_channel();
        let (_state_tx, state) = watch::channel(ConnectionState::Open);
        let handle = TransportHandle {
            outbound,
            state,
            terminal: Arc::new(AtomicBool::new(false)),
            closed: Arc::new(AtomicBool::new(false)),
            close: Arc::new(Notify::new()),
        };
        (handle, outbox)
    }
}

/// Production connector: newline-delimited JSON frames over TCP, with the
/// identify handshake sent as the first line.
pub struct TcpConnector {
    addr: String,
}

impl TcpConnector {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait::async_trait]
impl Connector for TcpConnector {
    async fn dial(
        &self,
        credentials: &Credentials,
    ) -> anyhow::Result<(Box<dyn SocketTx>, Box<dyn SocketRx>)> {
        let stream = TcpStream::connect(&self.addr).await?;
        let (reader, writer) = stream.into_split();
        let mut tx = TcpTx { writer };
        tx.send(Protocol::encode(&ClientMessage::Join {
            token: credentials.token.clone(),
            room: credentials.room.to_string(),
        }))
        .await?;
        let rx = TcpRx {
            reader: BufReader::new(reader),
        };
        Ok((Box::new(tx), Box::new(rx)))
    }
}

struct TcpTx {
    writer: OwnedWriteHalf,
}

#[async_trait::async_trait]
impl SocketTx for TcpTx {
    async fn send(&mut self, text: String) -> anyhow::Result<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        Ok(())
    }
    async fn close(&mut self) {
        let _ = self.writer.shutdown().await;
    }
}

struct TcpRx {
    reader: BufReader<OwnedReadHalf>,
}

#[async_trait::async_trait]
impl SocketRx for TcpRx {
    async fn recv(&mut self) -> Option<anyhow::Result<String>> {
        let mut line = String::new();
        match self.reader.read_line(&mut line).await {
            Ok(0) => None,
            Ok(_) => Some(Ok(line.trim_end().to_string())),
            Err(e) => Some(Err(e.into())),
        }
    }
}
