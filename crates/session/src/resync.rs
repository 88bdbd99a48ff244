use super::Inbound;
use super::Mutation;
use super::MutationQueue;
use super::Phase;
use super::PresenterHandle;
use super::StateHandle;
use super::Table;
use super::TransportHandle;
use mjs_protocol::ClientMessage;
use mjs_protocol::Snapshot;
use mjs_tiles::Hand;
use mjs_tiles::Relative;
use mjs_tiles::Seat;
use tokio::sync::mpsc::UnboundedSender;

/// Kicks off resynchronization from either trigger path: a payload that
/// failed typed decode, or a completed reconnection.
///
/// The marker reaches the turn machine ahead of the snapshot so every
/// incremental message dated before it is dropped, not replayed.
#[derive(Clone)]
pub struct ResyncRequester {
    gameplay: UnboundedSender<Inbound>,
    transport: TransportHandle,
}

impl ResyncRequester {
    pub fn new(gameplay: UnboundedSender<Inbound>, transport: TransportHandle) -> Self {
        Self { gameplay, transport }
    }
    pub fn request(&self) {
        log::info!("[resync] requesting full snapshot");
        let _ = self.gameplay.send(Inbound::ResyncPending);
        self.transport.send(&ClientMessage::Resync);
    }
}

/// Applies an authoritative snapshot, replacing incremental reasoning.
pub struct Resync;

impl Resync {
    /// Rebuild all local state from the snapshot. The rebuild is itself a
    /// queue submission, so it can never interleave with a running mutation.
    /// Applying the same snapshot twice yields identical state.
    pub async fn apply(
        state: &StateHandle,
        queue: &MutationQueue,
        presenter: &PresenterHandle,
        snapshot: Snapshot,
    ) {
        let state = state.clone();
        let presenter = presenter.clone();
        queue
            .submit(async move {
                {
                    let mut shared = state.lock().await;
                    let local = shared.session.local_seat;
                    shared.session.round = snapshot.round;
                    shared.session.action_id = snapshot.action_id;
                    shared.session.remaining = snapshot.remaining;
                    shared.session.current_turn = shared.session.relative(snapshot.turn);
                    shared.session.phase = Self::implied(&snapshot, local);
                    shared.session.offers = snapshot.choices.clone();
                    shared.table = Self::rebuild(&snapshot, local);
                }
                presenter.lock().await.begin_mutation(Mutation::Rebuild).await;
                Ok(())
            })
            .await;
        log::info!("[resync] snapshot applied");
    }

    /// The phase the snapshot's turn and open offers imply.
    fn implied(snapshot: &Snapshot, local: Seat) -> Phase {
        match (snapshot.choices.is_empty(), snapshot.turn == local) {
            (true, _) => Phase::Idle,
            (false, true) if snapshot.drawn.is_some() => Phase::AwaitingSelfAction,
            (false, _) => Phase::AwaitingDiscardReaction,
        }
    }

    /// Per-seat presentation state is rebuilt from counts, never deltas.
    fn rebuild(snapshot: &Snapshot, local: Seat) -> Table {
        let mut table = Table::default();
        table.wall = snapshot.wall;
        let mut own_blocks = Vec::new();
        for seat in &snapshot.seats {
            let relative = Relative::from((seat.seat, local));
            table.piles[relative.index()] = seat.discards.clone();
            table.scores[relative.index()] = seat.score;
            table.flowers[relative.index()] = seat.flowers;
            match relative {
                Relative::Own => own_blocks = seat.blocks.clone(),
                other => {
                    table.counts[other.index()] = seat.count;
                    table.blocks[other.index()] = seat.blocks.clone();
                }
            }
        }
        table.hand = Hand::rebuild(snapshot.hand.clone(), snapshot.drawn, own_blocks);
        table
    }
}
