use super::ResyncRequester;
use super::StateHandle;
use super::TransportHandle;
use mjs_protocol::ClientMessage;
use mjs_protocol::Decoded;
use mjs_protocol::Protocol;
use mjs_protocol::ProtocolError;
use mjs_protocol::ServerMessage;
use mjs_tiles::Seat;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::watch;

/// What the turn machine receives: decoded gameplay messages in arrival
/// order, plus markers telling it a snapshot is on the way and everything
/// before it is stale.
#[derive(Debug)]
pub enum Inbound {
    Message(ServerMessage),
    ResyncPending,
}

/// One classification decision per inbound frame, then dispatch.
///
/// Gameplay messages go to the turn machine; everything else is applied
/// inline. Gameplay arriving before the play scene is ready is buffered and
/// drained in arrival order once it is.
pub struct Router {
    state: StateHandle,
    transport: TransportHandle,
    resync: ResyncRequester,
    gameplay: UnboundedSender<Inbound>,
    notices: UnboundedSender<ServerMessage>,
    scene_ready: watch::Receiver<bool>,
    buffer: Vec<ServerMessage>,
}

impl Router {
    pub fn new(
        state: StateHandle,
        transport: TransportHandle,
        resync: ResyncRequester,
        gameplay: UnboundedSender<Inbound>,
        notices: UnboundedSender<ServerMessage>,
        scene_ready: watch::Receiver<bool>,
    ) -> Self {
        Self {
            state,
            transport,
            resync,
            gameplay,
            notices,
            scene_ready,
            buffer: Vec::new(),
        }
    }

    pub async fn run(mut self, mut inbound: UnboundedReceiver<String>) {
        let mut watching = true;
        loop {
            tokio::select! {
                biased;
                changed = self.scene_ready.changed(), if watching => match changed {
                    Ok(()) => self.drain(),
                    Err(_) => watching = false,
                },
                text = inbound.recv() => match text {
                    Some(text) => self.route(&text).await,
                    None => break,
                },
            }
        }
        log::debug!("[router] inbound stream ended");
    }

    async fn route(&mut self, text: &str) {
        match Protocol::decode(text) {
            Ok(Decoded::Message(message)) => self.dispatch(message).await,
            Ok(Decoded::Unknown(event)) => log::debug!("[router] skipping event {}", event),
            Err(garbled @ ProtocolError::Garbled(_)) => log::warn!("[router] {}", garbled),
            Err(ProtocolError::Missing { event, detail }) => {
                // the incremental stream can no longer be trusted: ack the
                // frame so the server does not stall, then resynchronize
                log::warn!("[router] bad payload for {} ({}), resyncing", event, detail);
                self.transport.send(&ClientMessage::Ack { event });
                self.resync.request();
            }
        }
    }

    async fn dispatch(&mut self, message: ServerMessage) {
        log::trace!("[router] {}", message);
        if message.is_terminal() {
            self.transport.mark_terminal();
        }
        if message.is_gameplay() {
            let scene_ready = *self.scene_ready.borrow();
            match scene_ready {
                true => {
                    self.drain();
                    let _ = self.gameplay.send(Inbound::Message(message));
                }
                false => self.buffer.push(message),
            }
        } else {
            self.apply(message).await;
        }
    }

    /// Forward buffered gameplay in arrival order once the scene is ready.
    fn drain(&mut self) {
        if !*self.scene_ready.borrow() {
            return;
        }
        for message in self.buffer.drain(..) {
            let _ = self.gameplay.send(Inbound::Message(message));
        }
    }

    /// Session-path messages are applied inline, never through the queue.
    async fn apply(&mut self, message: ServerMessage) {
        match &message {
            ServerMessage::Joined { room, seat } => {
                let mut shared = self.state.lock().await;
                shared.session.room = Some(room.clone());
                shared.session.local_seat = *seat;
                log::info!("[router] joined {} as {}", room, seat);
            }
            ServerMessage::Scores { scores } => {
                let mut shared = self.state.lock().await;
                let mapped = Self::to_relative(&shared.session, scores);
                shared.table.set_scores(mapped);
            }
            ServerMessage::Timer { remaining } => {
                self.state.lock().await.session.remaining = *remaining;
            }
            ServerMessage::GameEnd { scores } => {
                let mut shared = self.state.lock().await;
                let mapped = Self::to_relative(&shared.session, scores);
                shared.table.set_scores(mapped);
                log::info!("[router] game over");
            }
            ServerMessage::Peer {
                seat,
                name,
                present,
                ..
            } => {
                log::debug!("[router] peer {} {} ({})", seat, name, present);
            }
            ServerMessage::Ack { of } => log::trace!("[router] ack {}", of),
            ServerMessage::Error { message } => log::warn!("[router] server error: {}", message),
            ServerMessage::Emoji { .. } => (),
            gameplay => {
                debug_assert!(!gameplay.is_gameplay(), "gameplay on the session path");
            }
        }
        let _ = self.notices.send(message);
    }

    /// Absolute-seat-ordered scores into the relative layout the table uses.
    fn to_relative(
        session: &super::Session,
        scores: &[mjs_core::Points],
    ) -> [mjs_core::Points; mjs_core::SEATS] {
        let mut mapped = [0; mjs_core::SEATS];
        for (i, score) in scores.iter().take(mjs_core::SEATS).enumerate() {
            let relative = session.relative(Seat::from(i as u8));
            mapped[relative.index()] = *score;
        }
        mapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shared;
    use crate::TransportHandle;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tokio::sync::mpsc::unbounded_channel;

    struct Fixture {
        inbound: UnboundedSender<String>,
        gameplay: UnboundedReceiver<Inbound>,
        #[allow(dead_code)]
        notices: UnboundedReceiver<ServerMessage>,
        outbox: UnboundedReceiver<String>,
        scene_ready: watch::Sender<bool>,
        state: StateHandle,
    }

    fn fixture(ready: bool) -> Fixture {
        let state: StateHandle = Arc::new(Mutex::new(Shared::default()));
        let (transport, outbox) = TransportHandle::stub();
        let (gameplay_tx, gameplay) = unbounded_channel();
        let (notices_tx, notices) = unbounded_channel();
        let (scene_ready, scene_ready_rx) = watch::channel(ready);
        let (inbound, inbound_rx) = unbounded_channel();
        let resync = ResyncRequester::new(gameplay_tx.clone(), transport.clone());
        let router = Router::new(
            state.clone(),
            transport,
            resync,
            gameplay_tx,
            notices_tx,
            scene_ready_rx,
        );
        tokio::spawn(router.run(inbound_rx));
        Fixture {
            inbound,
            gameplay,
            notices,
            outbox,
            scene_ready,
            state,
        }
    }

    fn discard_frame(seat: &str, tile: &str) -> String {
        format!(
            r#"{{"event":"discard","data":{{"seat":"{}","tile":"{}","is_tsumogiri":false,"action_id":1}}}}"#,
            seat, tile
        )
    }

    #[tokio::test]
    async fn same_tick_discards_keep_arrival_order() {
        let mut fx = fixture(true);
        fx.inbound.send(discard_frame("east", "M5")).unwrap();
        fx.inbound.send(discard_frame("south", "P2")).unwrap();
        for expected in ["M5", "P2"] {
            match fx.gameplay.recv().await.unwrap() {
                Inbound::Message(ServerMessage::Discard { tile, .. }) => {
                    assert_eq!(tile.to_string(), expected);
                }
                other => panic!("unexpected: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn gameplay_buffered_until_scene_ready() {
        let mut fx = fixture(false);
        fx.inbound.send(discard_frame("east", "M5")).unwrap();
        fx.inbound.send(discard_frame("west", "S9")).unwrap();
        tokio::task::yield_now().await;
        assert!(fx.gameplay.try_recv().is_err());
        fx.scene_ready.send(true).unwrap();
        for expected in ["M5", "S9"] {
            match fx.gameplay.recv().await.unwrap() {
                Inbound::Message(ServerMessage::Discard { tile, .. }) => {
                    assert_eq!(tile.to_string(), expected);
                }
                other => panic!("unexpected: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn session_events_applied_inline() {
        let fx = fixture(true);
        fx.inbound
            .send(r#"{"event":"timer","data":{"remaining":12}}"#.into())
            .unwrap();
        fx.inbound
            .send(r#"{"event":"joined","data":{"room":"r1","seat":"south"}}"#.into())
            .unwrap();
        tokio::task::yield_now().await;
        let shared = fx.state.lock().await;
        assert_eq!(shared.session.remaining, 12);
        assert_eq!(shared.session.local_seat, Seat::South);
    }

    #[tokio::test]
    async fn bad_payload_acks_then_resyncs() {
        let mut fx = fixture(true);
        fx.inbound
            .send(r#"{"event":"discard","data":{"seat":"east"}}"#.into())
            .unwrap();
        tokio::task::yield_now().await;
        let ack = fx.outbox.recv().await.unwrap();
        assert!(ack.contains(r#""event":"ack""#));
        assert!(ack.contains("discard"));
        let resync = fx.outbox.recv().await.unwrap();
        assert!(resync.contains(r#""event":"resync""#));
        assert!(matches!(
            fx.gameplay.recv().await.unwrap(),
            Inbound::ResyncPending
        ));
    }

    #[tokio::test]
    async fn unknown_event_skipped() {
        let mut fx = fixture(true);
        fx.inbound
            .send(r#"{"event":"battle_pass","data":{}}"#.into())
            .unwrap();
        fx.inbound.send(discard_frame("east", "M1")).unwrap();
        match fx.gameplay.recv().await.unwrap() {
            Inbound::Message(ServerMessage::Discard { .. }) => (),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
