use super::Inbound;
use super::Mutation;
use super::MutationQueue;
use super::PresenterHandle;
use super::Resync;
use super::StateHandle;
use super::TransportHandle;
use mjs_core::ActionId;
use mjs_core::Count;
use mjs_core::FLOWER_PACING;
use mjs_core::Round;
use mjs_core::SEATS;
use mjs_core::Seconds;
use mjs_protocol::ActionChoice;
use mjs_protocol::ClientMessage;
use mjs_protocol::ScoreLine;
use mjs_protocol::ServerMessage;
use mjs_tiles::CallBlock;
use mjs_tiles::Relative;
use mjs_tiles::Seat;
use mjs_tiles::Tile;
use tokio::sync::mpsc::UnboundedReceiver;

/// Player-turn phase. Initial state is Idle; session teardown resets to
/// Idle. There is no terminal phase while the session is alive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    /// A discard just happened; the local player may react.
    AwaitingDiscardReaction,
    /// The local player has just drawn and must act.
    AwaitingSelfAction,
    /// A mutation-queue operation is in flight.
    Animating,
    /// Non-playable drawn tiles are being replaced.
    FlowerExchange,
    /// Win or exhaustive-draw resolution in progress.
    Resolving,
}

/// Auto-resolution flags, checked in a fixed priority order before any
/// choice is presented to the user. These checks are pure functions of the
/// offer list and never invent an action the server did not offer.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoPolicy {
    /// Submit a winning action immediately whenever one is offered.
    pub auto_win: bool,
    /// Auto-skip interrupt-call windows that offer no win.
    pub prevent_call: bool,
    /// Submit a flower exchange when it is the only drawn-tile action.
    pub auto_flower: bool,
    /// Discard the just-drawn tile when nothing else resolves the draw.
    pub auto_discard_drawn: bool,
}

/// What the policy decided for a post-draw offer.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawResolution {
    Choose(ActionChoice),
    DiscardDrawn(Tile),
}

impl AutoPolicy {
    /// Resolve a discard-reaction window, or None to hand it to the user.
    pub fn resolve_discard(&self, choices: &[ActionChoice]) -> Option<ActionChoice> {
        match choices.iter().find(|c| c.is_win()) {
            Some(win) if self.auto_win => Some(win.clone()),
            Some(_) => None,
            None => {
                let interrupts_only = choices.iter().any(ActionChoice::is_interrupt)
                    && choices.iter().all(|c| c.is_interrupt() || c.is_skip());
                match self.prevent_call && interrupts_only {
                    true => choices.iter().find(|c| c.is_skip()).cloned(),
                    false => None,
                }
            }
        }
    }

    /// Resolve a post-draw window, or None to hand it to the user. The
    /// drawn-tile fallback never fires through a win offer or for a
    /// non-playable (flower) drawn tile.
    pub fn resolve_draw(
        &self,
        choices: &[ActionChoice],
        drawn: Option<Tile>,
    ) -> Option<DrawResolution> {
        if let Some(win) = choices.iter().find(|c| c.is_win()) {
            return match self.auto_win {
                true => Some(DrawResolution::Choose(win.clone())),
                false => None,
            };
        }
        let flowers_only = choices.iter().any(ActionChoice::is_flower)
            && choices.iter().all(|c| c.is_flower() || c.is_skip());
        if self.auto_flower && flowers_only {
            return choices
                .iter()
                .find(|c| c.is_flower())
                .cloned()
                .map(DrawResolution::Choose);
        }
        if self.auto_discard_drawn {
            return drawn
                .filter(|t| t.is_playable())
                .map(DrawResolution::DiscardDrawn);
        }
        None
    }
}

/// Interprets gameplay messages into player-turn phases and drives the
/// mutation queue accordingly.
///
/// Messages are handled strictly in arrival order; each animation-bearing
/// message becomes one queue submission that the machine awaits before
/// touching the next message. Flower-phase messages arriving before the
/// initial deal has settled are buffered and applied afterwards as one
/// composed exchange.
pub struct Machine {
    state: StateHandle,
    queue: MutationQueue,
    presenter: PresenterHandle,
    transport: TransportHandle,
    policy: AutoPolicy,
    dealt: bool,
    pending_flowers: Vec<(Seat, Tile, Option<Tile>)>,
    resyncing: bool,
}

impl Machine {
    pub fn new(
        state: StateHandle,
        queue: MutationQueue,
        presenter: PresenterHandle,
        transport: TransportHandle,
        policy: AutoPolicy,
    ) -> Self {
        Self {
            state,
            queue,
            presenter,
            transport,
            policy,
            dealt: false,
            pending_flowers: Vec::new(),
            resyncing: false,
        }
    }

    pub async fn run(mut self, mut inbound: UnboundedReceiver<Inbound>) {
        while let Some(message) = inbound.recv().await {
            match message {
                Inbound::ResyncPending => {
                    log::info!("[machine] resync pending, dropping stale gameplay");
                    self.resyncing = true;
                }
                Inbound::Message(message) => self.handle(message).await,
            }
        }
        log::debug!("[machine] gameplay stream ended");
    }

    async fn handle(&mut self, message: ServerMessage) {
        if self.resyncing && !matches!(message, ServerMessage::Snapshot(_)) {
            log::debug!("[machine] dropping pre-snapshot {}", message);
            return;
        }
        match message {
            ServerMessage::GameStart {
                round,
                dealer,
                action_id,
            } => self.game_start(round, dealer, action_id).await,
            ServerMessage::Deal { tiles, counts } => self.deal(tiles, counts).await,
            ServerMessage::Draw {
                seat,
                tile,
                action_id,
                wall,
            } => self.draw(seat, tile, action_id, wall).await,
            ServerMessage::Discard {
                seat,
                tile,
                is_tsumogiri,
                action_id,
            } => self.discard(seat, tile, is_tsumogiri, action_id).await,
            ServerMessage::Meld {
                seat,
                block,
                action_id,
            } => self.meld(seat, block, action_id).await,
            ServerMessage::Flower {
                seat,
                flower,
                replacement,
            } => self.flower(seat, flower, replacement).await,
            ServerMessage::DiscardOffers {
                choices,
                timeout,
                action_id,
            } => self.discard_offers(choices, timeout, action_id).await,
            ServerMessage::DrawOffers {
                choices,
                timeout,
                action_id,
            } => self.draw_offers(choices, timeout, action_id).await,
            ServerMessage::Win {
                seat,
                winning,
                lines,
                scores,
                ..
            } => self.win(seat, winning, lines, scores).await,
            ServerMessage::WallExhausted => self.exhausted().await,
            ServerMessage::Snapshot(snapshot) => {
                Resync::apply(&self.state, &self.queue, &self.presenter, snapshot).await;
                self.resyncing = false;
                self.dealt = true;
                self.pending_flowers.clear();
                if !self.state.lock().await.session.offers.is_empty() {
                    self.queue.gate().allow();
                }
                self.transport.send(&ClientMessage::Ready);
            }
            other => log::debug!("[machine] ignoring session message {}", other),
        }
    }

    async fn game_start(&mut self, round: Round, dealer: Seat, action_id: ActionId) {
        let mut shared = self.state.lock().await;
        shared.session.round = round;
        shared.session.action_id = action_id;
        shared.session.current_turn = shared.session.relative(dealer);
        shared.session.offers.clear();
        shared.session.phase = Phase::Idle;
        shared.table.reset();
        drop(shared);
        self.dealt = false;
        self.pending_flowers.clear();
        log::info!("[machine] round {} started, dealer {}", round, dealer);
    }

    async fn deal(&mut self, tiles: Vec<Tile>, counts: Vec<Count>) {
        self.set_phase(Phase::Animating).await;
        let state = self.state.clone();
        let presenter = self.presenter.clone();
        self.queue
            .submit(async move {
                let dealt = tiles.clone();
                {
                    let mut shared = state.lock().await;
                    let mut relative = [0; SEATS];
                    for (i, count) in counts.iter().take(SEATS).enumerate() {
                        let seat = shared.session.relative(Seat::from(i as u8));
                        relative[seat.index()] = *count;
                    }
                    shared.table.deal(tiles, relative);
                }
                presenter
                    .lock()
                    .await
                    .begin_mutation(Mutation::Deal { tiles: dealt })
                    .await;
                Ok(())
            })
            .await;
        self.dealt = true;
        if self.pending_flowers.is_empty() {
            self.set_phase(Phase::Idle).await;
        } else {
            self.flower_exchange().await;
        }
    }

    async fn draw(&mut self, seat: Seat, tile: Option<Tile>, action_id: ActionId, wall: Count) {
        let relative = {
            let mut shared = self.state.lock().await;
            shared.session.action_id = action_id;
            let relative = shared.session.relative(seat);
            shared.session.current_turn = relative;
            shared.session.offers.clear();
            relative
        };
        self.queue.gate().deny();
        self.set_phase(Phase::Animating).await;
        let state = self.state.clone();
        let presenter = self.presenter.clone();
        self.queue
            .submit(async move {
                state.lock().await.table.draw(relative, tile, wall);
                presenter
                    .lock()
                    .await
                    .begin_mutation(Mutation::Draw {
                        seat: relative,
                        tile,
                    })
                    .await;
                Ok(())
            })
            .await;
        match relative {
            Relative::Own => self.set_phase(Phase::AwaitingSelfAction).await,
            _ => self.set_phase(Phase::Idle).await,
        }
    }

    async fn discard(&mut self, seat: Seat, tile: Tile, is_tsumogiri: bool, action_id: ActionId) {
        let relative = {
            let mut shared = self.state.lock().await;
            if action_id != shared.session.action_id {
                log::debug!(
                    "[machine] stale discard (action {} vs {})",
                    action_id,
                    shared.session.action_id
                );
                return;
            }
            shared.session.offers.clear();
            shared.session.relative(seat)
        };
        self.queue.gate().deny();
        self.set_phase(Phase::Animating).await;
        let state = self.state.clone();
        let presenter = self.presenter.clone();
        self.queue
            .submit(async move {
                state.lock().await.table.discard(relative, tile, is_tsumogiri)?;
                presenter
                    .lock()
                    .await
                    .begin_mutation(Mutation::Discard {
                        seat: relative,
                        tile,
                        is_tsumogiri,
                    })
                    .await;
                Ok(())
            })
            .await;
        match relative {
            // someone else discarded: the local player may get a reaction
            // window next
            Relative::Own => self.set_phase(Phase::Idle).await,
            _ => self.set_phase(Phase::AwaitingDiscardReaction).await,
        }
    }

    async fn meld(&mut self, seat: Seat, block: CallBlock, action_id: ActionId) {
        let (relative, from) = {
            let mut shared = self.state.lock().await;
            if action_id != shared.session.action_id {
                log::debug!("[machine] stale meld, dropping");
                return;
            }
            shared.session.offers.clear();
            let relative = shared.session.relative(seat);
            shared.session.current_turn = relative;
            (relative, shared.session.relative(block.from))
        };
        self.queue.gate().deny();
        self.set_phase(Phase::Animating).await;
        let state = self.state.clone();
        let presenter = self.presenter.clone();
        self.queue
            .submit(async move {
                state
                    .lock()
                    .await
                    .table
                    .meld(relative, from, block.clone())?;
                presenter
                    .lock()
                    .await
                    .begin_mutation(Mutation::Meld {
                        seat: relative,
                        block,
                    })
                    .await;
                Ok(())
            })
            .await;
        self.set_phase(Phase::Idle).await;
    }

    async fn flower(&mut self, seat: Seat, flower: Tile, replacement: Option<Tile>) {
        if !self.dealt {
            // the opening flower exchange waits for our deal animation
            self.pending_flowers.push((seat, flower, replacement));
            return;
        }
        self.set_phase(Phase::FlowerExchange).await;
        let state = self.state.clone();
        let presenter = self.presenter.clone();
        self.queue
            .submit(Self::swap(state, presenter, seat, flower, replacement))
            .await;
        self.set_phase(Phase::Idle).await;
    }

    /// The opening exchange: every buffered replacement in ring order from
    /// the first seat, one nested submission per seat so no two replacement
    /// animations overlap.
    async fn flower_exchange(&mut self) {
        self.set_phase(Phase::FlowerExchange).await;
        let mut batch = std::mem::take(&mut self.pending_flowers);
        batch.sort_by_key(|(seat, ..)| u8::from(*seat));
        let queue = self.queue.clone();
        let state = self.state.clone();
        let presenter = self.presenter.clone();
        self.queue
            .submit(async move {
                let last = batch.len().saturating_sub(1);
                for (i, (seat, flower, replacement)) in batch.into_iter().enumerate() {
                    queue
                        .submit(Self::swap(
                            state.clone(),
                            presenter.clone(),
                            seat,
                            flower,
                            replacement,
                        ))
                        .await;
                    if i < last {
                        tokio::time::sleep(FLOWER_PACING).await;
                    }
                }
                Ok(())
            })
            .await;
        self.set_phase(Phase::Idle).await;
    }

    /// One seat's flower replacement as a queue operation body.
    async fn swap(
        state: StateHandle,
        presenter: PresenterHandle,
        seat: Seat,
        flower: Tile,
        replacement: Option<Tile>,
    ) -> anyhow::Result<()> {
        let relative = {
            let mut shared = state.lock().await;
            let relative = shared.session.relative(seat);
            shared.table.flower(relative, flower, replacement);
            relative
        };
        presenter
            .lock()
            .await
            .begin_mutation(Mutation::FlowerSwap {
                seat: relative,
                flower,
                replacement,
            })
            .await;
        Ok(())
    }

    async fn discard_offers(
        &mut self,
        choices: Vec<ActionChoice>,
        timeout: Seconds,
        action_id: ActionId,
    ) {
        {
            let mut shared = self.state.lock().await;
            shared.session.action_id = action_id;
            shared.session.remaining = timeout;
            shared.session.phase = Phase::AwaitingDiscardReaction;
        }
        match self.policy.resolve_discard(&choices) {
            Some(choice) => {
                log::debug!("[machine] auto-resolving reaction: {}", choice);
                self.transport
                    .send(&ClientMessage::Choose { choice, action_id });
            }
            None => self.present(choices).await,
        }
    }

    async fn draw_offers(
        &mut self,
        choices: Vec<ActionChoice>,
        timeout: Seconds,
        action_id: ActionId,
    ) {
        let drawn = {
            let mut shared = self.state.lock().await;
            shared.session.action_id = action_id;
            shared.session.remaining = timeout;
            shared.session.phase = Phase::AwaitingSelfAction;
            shared.table.hand.drawn()
        };
        match self.policy.resolve_draw(&choices, drawn) {
            Some(DrawResolution::Choose(choice)) => {
                log::debug!("[machine] auto-resolving draw: {}", choice);
                self.transport
                    .send(&ClientMessage::Choose { choice, action_id });
            }
            Some(DrawResolution::DiscardDrawn(tile)) => {
                log::debug!("[machine] auto-discarding drawn {}", tile);
                self.transport.send(&ClientMessage::Discard {
                    tile,
                    is_tsumogiri: true,
                    action_id,
                });
            }
            None => self.present(choices).await,
        }
    }

    /// Hand an unresolved offer list to the user.
    async fn present(&mut self, choices: Vec<ActionChoice>) {
        self.state.lock().await.session.offers = choices;
        self.queue.gate().allow();
    }

    async fn win(
        &mut self,
        seat: Seat,
        winning: Tile,
        lines: Vec<ScoreLine>,
        scores: Vec<mjs_core::Points>,
    ) {
        self.set_phase(Phase::Resolving).await;
        for line in &lines {
            log::info!("[machine] score line: {} {}", line.name, line.value);
        }
        let state = self.state.clone();
        let presenter = self.presenter.clone();
        self.queue
            .submit(async move {
                let relative = {
                    let mut shared = state.lock().await;
                    let relative = shared.session.relative(seat);
                    let mut mapped = [0; SEATS];
                    for (i, score) in scores.iter().take(SEATS).enumerate() {
                        let at = shared.session.relative(Seat::from(i as u8));
                        mapped[at.index()] = *score;
                    }
                    shared.table.set_scores(mapped);
                    shared.session.offers.clear();
                    relative
                };
                presenter
                    .lock()
                    .await
                    .begin_mutation(Mutation::Win {
                        seat: relative,
                        winning,
                    })
                    .await;
                Ok(())
            })
            .await;
        self.set_phase(Phase::Idle).await;
    }

    async fn exhausted(&mut self) {
        self.set_phase(Phase::Resolving).await;
        log::info!("[machine] wall exhausted");
        self.set_phase(Phase::Idle).await;
    }

    async fn set_phase(&self, phase: Phase) {
        self.state.lock().await.session.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Immediate;
    use crate::InputGate;
    use crate::Shared;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tokio::sync::mpsc::UnboundedSender;
    use tokio::sync::mpsc::unbounded_channel;

    fn chow() -> ActionChoice {
        ActionChoice::Chow {
            tiles: [Tile::Dot(1), Tile::Dot(2)],
        }
    }

    #[test]
    fn auto_win_takes_the_win() {
        let policy = AutoPolicy {
            auto_win: true,
            ..AutoPolicy::default()
        };
        let choices = vec![chow(), ActionChoice::Win, ActionChoice::Skip];
        assert_eq!(policy.resolve_discard(&choices), Some(ActionChoice::Win));
    }

    #[test]
    fn win_on_offer_blocks_prevent_call() {
        let policy = AutoPolicy {
            prevent_call: true,
            ..AutoPolicy::default()
        };
        let choices = vec![chow(), ActionChoice::Win, ActionChoice::Skip];
        // a window containing a win is never auto-skipped
        assert_eq!(policy.resolve_discard(&choices), None);
    }

    #[test]
    fn prevent_call_skips_interrupt_only_windows() {
        let policy = AutoPolicy {
            prevent_call: true,
            ..AutoPolicy::default()
        };
        let choices = vec![chow(), ActionChoice::Pung, ActionChoice::Skip];
        assert_eq!(policy.resolve_discard(&choices), Some(ActionChoice::Skip));
    }

    #[test]
    fn policies_off_defer_to_the_user() {
        let policy = AutoPolicy::default();
        let choices = vec![chow(), ActionChoice::Skip];
        assert_eq!(policy.resolve_discard(&choices), None);
        assert_eq!(
            policy.resolve_draw(&[ActionChoice::SelfWin], Some(Tile::Dot(1))),
            None
        );
    }

    #[test]
    fn auto_flower_fires_only_when_flowers_are_the_only_action() {
        let policy = AutoPolicy {
            auto_flower: true,
            ..AutoPolicy::default()
        };
        let flower = ActionChoice::Flower {
            tile: Tile::Flower(3),
        };
        assert_eq!(
            policy.resolve_draw(&[flower.clone()], Some(Tile::Flower(3))),
            Some(DrawResolution::Choose(flower.clone()))
        );
        let mixed = vec![
            flower,
            ActionChoice::ConcealedKong {
                tile: Tile::Dot(2),
            },
        ];
        assert_eq!(policy.resolve_draw(&mixed, Some(Tile::Flower(3))), None);
    }

    #[test]
    fn auto_discard_never_throws_a_flower() {
        let policy = AutoPolicy {
            auto_discard_drawn: true,
            ..AutoPolicy::default()
        };
        assert_eq!(policy.resolve_draw(&[], Some(Tile::Flower(1))), None);
        assert_eq!(
            policy.resolve_draw(&[], Some(Tile::Dot(5))),
            Some(DrawResolution::DiscardDrawn(Tile::Dot(5)))
        );
    }

    #[test]
    fn auto_discard_never_fires_through_a_win() {
        let policy = AutoPolicy {
            auto_discard_drawn: true,
            ..AutoPolicy::default()
        };
        assert_eq!(
            policy.resolve_draw(&[ActionChoice::SelfWin], Some(Tile::Dot(5))),
            None
        );
    }

    struct Fixture {
        state: StateHandle,
        inbound: UnboundedSender<Inbound>,
        outbox: tokio::sync::mpsc::UnboundedReceiver<String>,
    }

    async fn fixture(policy: AutoPolicy, local: Seat) -> Fixture {
        let state: StateHandle = Arc::new(Mutex::new(Shared::default()));
        state.lock().await.session.local_seat = local;
        let (transport, outbox) = TransportHandle::stub();
        let queue = MutationQueue::new(InputGate::default());
        let presenter: PresenterHandle = Arc::new(Mutex::new(Immediate));
        let machine = Machine::new(state.clone(), queue, presenter, transport, policy);
        let (inbound, inbound_rx) = unbounded_channel();
        tokio::spawn(machine.run(inbound_rx));
        Fixture {
            state,
            inbound,
            outbox,
        }
    }

    fn send(fx: &Fixture, message: ServerMessage) {
        fx.inbound.send(Inbound::Message(message)).unwrap();
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    fn deal() -> ServerMessage {
        ServerMessage::Deal {
            tiles: (0..13u8).map(Tile::from).collect(),
            counts: vec![13; SEATS],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn predeal_flowers_wait_for_the_deal() {
        let fx = fixture(AutoPolicy::default(), Seat::East).await;
        // flower broadcasts outrun our deal animation
        send(
            &fx,
            ServerMessage::Flower {
                seat: Seat::South,
                flower: Tile::Flower(2),
                replacement: None,
            },
        );
        send(
            &fx,
            ServerMessage::Flower {
                seat: Seat::East,
                flower: Tile::Flower(1),
                replacement: None,
            },
        );
        settle().await;
        assert_eq!(fx.state.lock().await.table.flowers, [0; SEATS]);
        send(&fx, deal());
        // paused time skips over the inter-seat pacing
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        settle().await;
        let shared = fx.state.lock().await;
        assert_eq!(shared.table.flowers[Relative::Own.index()], 1);
        assert_eq!(shared.table.flowers[Relative::Next.index()], 1);
        assert_eq!(shared.session.phase, Phase::Idle);
    }

    #[tokio::test]
    async fn own_draw_awaits_self_action() {
        let fx = fixture(AutoPolicy::default(), Seat::East).await;
        send(&fx, deal());
        send(
            &fx,
            ServerMessage::Draw {
                seat: Seat::East,
                tile: Some(Tile::Dot(5)),
                action_id: 3,
                wall: 70,
            },
        );
        settle().await;
        let shared = fx.state.lock().await;
        assert_eq!(shared.session.phase, Phase::AwaitingSelfAction);
        assert_eq!(shared.session.action_id, 3);
        assert_eq!(shared.table.hand.drawn(), Some(Tile::Dot(5)));
        assert_eq!(shared.table.wall, 70);
    }

    #[tokio::test]
    async fn auto_win_submits_on_discard_offer() {
        let mut fx = fixture(
            AutoPolicy {
                auto_win: true,
                ..AutoPolicy::default()
            },
            Seat::East,
        )
        .await;
        send(
            &fx,
            ServerMessage::DiscardOffers {
                choices: vec![ActionChoice::Pung, ActionChoice::Win, ActionChoice::Skip],
                timeout: 10,
                action_id: 5,
            },
        );
        settle().await;
        let sent = fx.outbox.recv().await.unwrap();
        assert!(sent.contains(r#""event":"choose""#));
        assert!(sent.contains(r#""kind":"win""#));
        assert!(sent.contains(r#""action_id":5"#));
    }

    #[tokio::test]
    async fn unresolved_offers_reach_the_user() {
        let fx = fixture(AutoPolicy::default(), Seat::East).await;
        send(
            &fx,
            ServerMessage::DiscardOffers {
                choices: vec![ActionChoice::Pung, ActionChoice::Skip],
                timeout: 10,
                action_id: 5,
            },
        );
        settle().await;
        let shared = fx.state.lock().await;
        assert_eq!(shared.session.phase, Phase::AwaitingDiscardReaction);
        assert_eq!(shared.session.offers.len(), 2);
    }

    #[tokio::test]
    async fn resync_marker_drops_stale_gameplay() {
        let fx = fixture(AutoPolicy::default(), Seat::East).await;
        send(&fx, deal());
        settle().await;
        fx.inbound.send(Inbound::ResyncPending).unwrap();
        // stale: dated before the snapshot
        send(
            &fx,
            ServerMessage::Draw {
                seat: Seat::East,
                tile: Some(Tile::Dot(5)),
                action_id: 4,
                wall: 69,
            },
        );
        settle().await;
        assert_eq!(fx.state.lock().await.table.hand.drawn(), None);
    }
}
