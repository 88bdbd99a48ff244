use super::AutoPolicy;
use super::ConnectionError;
use super::ConnectionState;
use super::Connector;
use super::Credentials;
use super::InputGate;
use super::Machine;
use super::MutationQueue;
use super::Phase;
use super::PresenterHandle;
use super::ResyncRequester;
use super::Router;
use super::Shared;
use super::StateHandle;
use super::Transport;
use super::TransportHandle;
use mjs_protocol::ActionChoice;
use mjs_protocol::ClientMessage;
use mjs_protocol::ServerMessage;
use mjs_tiles::Tile;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::watch;

/// The embedder facade: constructs the component graph once at session
/// start and hands out explicit handles. No component is reachable through
/// ambient global lookup.
pub struct Client {
    state: StateHandle,
    transport: TransportHandle,
    gate: InputGate,
    scene_ready: watch::Sender<bool>,
    notices: Option<UnboundedReceiver<ServerMessage>>,
}

impl Client {
    /// Wire transport → router → machine → queue and open the connection.
    pub fn start(
        connector: Arc<dyn Connector>,
        credentials: Credentials,
        presenter: PresenterHandle,
        policy: AutoPolicy,
    ) -> Result<Self, ConnectionError> {
        let state: StateHandle = Arc::new(Mutex::new(Shared::default()));
        let (inbound_tx, inbound_rx) = unbounded_channel();
        let transport = Transport::connect(connector, credentials, inbound_tx)?;
        let gate = InputGate::default();
        let queue = MutationQueue::new(gate.clone());
        let (gameplay_tx, gameplay_rx) = unbounded_channel();
        let (notices_tx, notices_rx) = unbounded_channel();
        let (scene_ready, scene_ready_rx) = watch::channel(false);
        let resync = ResyncRequester::new(gameplay_tx.clone(), transport.clone());
        let router = Router::new(
            state.clone(),
            transport.clone(),
            resync.clone(),
            gameplay_tx,
            notices_tx,
            scene_ready_rx,
        );
        tokio::spawn(router.run(inbound_rx));
        let machine = Machine::new(
            state.clone(),
            queue,
            presenter,
            transport.clone(),
            policy,
        );
        tokio::spawn(machine.run(gameplay_rx));
        tokio::spawn(Self::watch(transport.state(), resync));
        Ok(Self {
            state,
            transport,
            gate,
            scene_ready,
            notices: Some(notices_rx),
        })
    }

    /// After any reconnection the incremental stream cannot be trusted;
    /// ask for a snapshot as soon as the connection reopens.
    async fn watch(mut state: watch::Receiver<ConnectionState>, resync: ResyncRequester) {
        let mut opens = 0u32;
        while state.changed().await.is_ok() {
            if *state.borrow_and_update() == ConnectionState::Open {
                opens += 1;
                if opens > 1 {
                    resync.request();
                }
            }
        }
    }

    /// The play scene finished loading: drain buffered gameplay and tell
    /// the server we are ready.
    pub fn scene_ready(&self) {
        let _ = self.scene_ready.send(true);
        self.transport.send(&ClientMessage::Ready);
    }

    /// The play scene was torn down: full local reset, no more reconnects.
    pub async fn teardown(&self) {
        self.transport.close();
        let _ = self.scene_ready.send(false);
        let mut shared = self.state.lock().await;
        shared.session.reset();
        shared.table.reset();
        log::info!("[client] session torn down");
    }

    /// Shared session/table state for reading between queue operations.
    pub fn state(&self) -> StateHandle {
        self.state.clone()
    }

    /// Observable connection lifecycle.
    pub fn connection(&self) -> watch::Receiver<ConnectionState> {
        self.transport.state()
    }

    /// The global user-input gate.
    pub fn input(&self) -> InputGate {
        self.gate.clone()
    }

    /// Session-path broadcasts (scores, peers, emoji, errors) for the UI.
    /// Yields each message once; callable once.
    pub fn notices(&mut self) -> Option<UnboundedReceiver<ServerMessage>> {
        self.notices.take()
    }

    /// User-initiated discard of `tile` from the local hand.
    pub async fn discard(&self, tile: Tile, is_tsumogiri: bool) -> anyhow::Result<()> {
        let action_id = {
            let shared = self.state.lock().await;
            if shared.session.phase != Phase::AwaitingSelfAction {
                anyhow::bail!("not awaiting a discard");
            }
            shared.session.action_id
        };
        if !self.gate.enabled() {
            anyhow::bail!("input is disabled");
        }
        self.transport.send(&ClientMessage::Discard {
            tile,
            is_tsumogiri,
            action_id,
        });
        Ok(())
    }

    /// User-selected action. Only ever echoes a server-provided choice.
    pub async fn choose(&self, choice: ActionChoice) -> anyhow::Result<()> {
        let action_id = {
            let shared = self.state.lock().await;
            if !shared.session.offers.contains(&choice) {
                anyhow::bail!("choice {} was not offered", choice);
            }
            shared.session.action_id
        };
        if !self.gate.enabled() {
            anyhow::bail!("input is disabled");
        }
        self.transport.send(&ClientMessage::Choose { choice, action_id });
        Ok(())
    }

    /// Emoji broadcast; best-effort like every send.
    pub fn emoji(&self, emoji: impl Into<String>) {
        self.transport.send(&ClientMessage::Emoji {
            emoji: emoji.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Immediate;
    use crate::SocketRx;
    use crate::SocketTx;
    use mjs_core::ID;
    use mjs_tiles::Relative;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct ScriptedConnector {
        dials: AtomicUsize,
        sessions: Mutex<Vec<Session>>,
    }
    struct Session {
        sent: mpsc::UnboundedSender<String>,
        serve: mpsc::UnboundedReceiver<String>,
    }
    struct Tx {
        sent: mpsc::UnboundedSender<String>,
    }
    struct Rx {
        serve: mpsc::UnboundedReceiver<String>,
    }

    #[async_trait::async_trait]
    impl SocketTx for Tx {
        async fn send(&mut self, text: String) -> anyhow::Result<()> {
            self.sent.send(text).map_err(|_| anyhow::anyhow!("closed"))
        }
        async fn close(&mut self) {}
    }
    #[async_trait::async_trait]
    impl SocketRx for Rx {
        async fn recv(&mut self) -> Option<anyhow::Result<String>> {
            self.serve.recv().await.map(Ok)
        }
    }
    #[async_trait::async_trait]
    impl Connector for ScriptedConnector {
        async fn dial(
            &self,
            _: &Credentials,
        ) -> anyhow::Result<(Box<dyn SocketTx>, Box<dyn SocketRx>)> {
            self.dials.fetch_add(1, Ordering::SeqCst);
            match self.sessions.lock().await.pop() {
                Some(session) => Ok((
                    Box::new(Tx { sent: session.sent }),
                    Box::new(Rx { serve: session.serve }),
                )),
                None => anyhow::bail!("no session scripted"),
            }
        }
    }

    struct Wire {
        serve: mpsc::UnboundedSender<String>,
        sent: mpsc::UnboundedReceiver<String>,
    }

    fn scripted(count: usize) -> (Arc<ScriptedConnector>, Vec<Wire>) {
        let mut wires = Vec::new();
        let mut sessions = Vec::new();
        for _ in 0..count {
            let (serve_tx, serve_rx) = mpsc::unbounded_channel();
            let (sent_tx, sent_rx) = mpsc::unbounded_channel();
            wires.push(Wire {
                serve: serve_tx,
                sent: sent_rx,
            });
            sessions.push(Session {
                sent: sent_tx,
                serve: serve_rx,
            });
        }
        // dial pops from the back
        sessions.reverse();
        let connector = Arc::new(ScriptedConnector {
            dials: AtomicUsize::new(0),
            sessions: Mutex::new(sessions),
        });
        (connector, wires)
    }

    fn credentials() -> Credentials {
        Credentials {
            token: "tok".into(),
            room: ID::default(),
        }
    }

    fn start(connector: Arc<ScriptedConnector>, policy: AutoPolicy) -> Client {
        Client::start(
            connector,
            credentials(),
            Arc::new(Mutex::new(Immediate)),
            policy,
        )
        .unwrap()
    }

    async fn settle() {
        // let the driver, router, machine, and queue tasks drain
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn discard_broadcast_lands_on_the_relative_pile() {
        let (connector, mut wires) = scripted(1);
        let client = start(connector, AutoPolicy::default());
        let wire = wires.remove(0);
        client.scene_ready();
        wire.serve
            .send(r#"{"event":"joined","data":{"room":"r","seat":"south"}}"#.into())
            .unwrap();
        wire.serve
            .send(r#"{"event":"game_start","data":{"round":1,"dealer":"east","action_id":1}}"#.into())
            .unwrap();
        let deal = serde_json::json!({
            "event": "deal",
            "data": {
                "tiles": (0..13u8).map(|n| Tile::from(n).to_string()).collect::<Vec<_>>(),
                "counts": [13, 13, 13, 13],
            }
        });
        wire.serve.send(deal.to_string()).unwrap();
        wire.serve
            .send(
                r#"{"event":"discard","data":{"seat":"east","tile":"M5","is_tsumogiri":false,"action_id":1}}"#
                    .into(),
            )
            .unwrap();
        settle().await;
        let state = client.state();
        let shared = state.lock().await;
        // EAST seen from SOUTH is the previous seat in turn order
        let relative = shared.session.relative(mjs_tiles::Seat::East);
        assert_eq!(relative, Relative::Prev);
        assert_eq!(
            shared.table.piles[relative.index()],
            vec![Tile::Character(5)]
        );
        assert_eq!(shared.table.counts[relative.index()], 12);
    }

    #[tokio::test]
    async fn auto_flower_submits_without_input() {
        let (connector, mut wires) = scripted(1);
        let client = start(
            connector,
            AutoPolicy {
                auto_flower: true,
                ..AutoPolicy::default()
            },
        );
        let mut wire = wires.remove(0);
        client.scene_ready();
        wire.serve
            .send(r#"{"event":"joined","data":{"room":"r","seat":"east"}}"#.into())
            .unwrap();
        wire.serve
            .send(
                r#"{"event":"draw_offers","data":{"choices":[{"kind":"flower","tile":"F3"}],"timeout":10,"action_id":4}}"#
                    .into(),
            )
            .unwrap();
        settle().await;
        let mut submitted = Vec::new();
        while let Ok(text) = wire.sent.try_recv() {
            submitted.push(text);
        }
        let choose = submitted
            .iter()
            .find(|t| t.contains(r#""event":"choose""#))
            .expect("auto-flower submission");
        assert!(choose.contains(r#""kind":"flower""#));
        assert!(choose.contains(r#""action_id":4"#));
        // nothing else was synthesized
        assert!(!submitted.iter().any(|t| t.contains(r#""event":"discard""#)));
    }

    #[tokio::test]
    async fn stale_confirmation_is_dropped() {
        let (connector, mut wires) = scripted(1);
        let client = start(connector, AutoPolicy::default());
        let wire = wires.remove(0);
        client.scene_ready();
        wire.serve
            .send(r#"{"event":"joined","data":{"room":"r","seat":"south"}}"#.into())
            .unwrap();
        wire.serve
            .send(r#"{"event":"game_start","data":{"round":1,"dealer":"east","action_id":7}}"#.into())
            .unwrap();
        wire.serve
            .send(
                r#"{"event":"discard","data":{"seat":"east","tile":"M5","is_tsumogiri":false,"action_id":6}}"#
                    .into(),
            )
            .unwrap();
        settle().await;
        let state = client.state();
        let shared = state.lock().await;
        assert!(shared.table.piles.iter().all(Vec::is_empty));
        assert_eq!(shared.session.action_id, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn reconnection_requests_a_snapshot() {
        let (connector, mut wires) = scripted(2);
        let client = start(connector.clone(), AutoPolicy::default());
        let first = wires.remove(0);
        let mut second = wires.remove(0);
        client.scene_ready();
        settle().await;
        assert_eq!(connector.dials.load(Ordering::SeqCst), 1);
        // connection drops mid-session
        drop(first);
        let mut connection = client.connection();
        while *connection.borrow() != ConnectionState::Disconnected {
            connection.changed().await.unwrap();
        }
        // fixed backoff, then exactly one retry
        tokio::time::sleep(Duration::from_secs(6)).await;
        settle().await;
        assert_eq!(connector.dials.load(Ordering::SeqCst), 2);
        let mut outbound = Vec::new();
        while let Ok(text) = second.sent.try_recv() {
            outbound.push(text);
        }
        assert!(
            outbound.iter().any(|t| t.contains(r#""event":"resync""#)),
            "resync after reconnect, got {:?}",
            outbound
        );
    }

    #[tokio::test]
    async fn choose_rejects_uninvented_actions() {
        let (connector, _wires) = scripted(1);
        let client = start(connector, AutoPolicy::default());
        settle().await;
        let result = client.choose(ActionChoice::Pung).await;
        assert!(result.is_err());
    }
}
