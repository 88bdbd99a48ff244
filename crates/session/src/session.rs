use super::Phase;
use super::Table;
use mjs_core::ActionId;
use mjs_core::Round;
use mjs_core::Seconds;
use mjs_protocol::ActionChoice;
use mjs_tiles::Relative;
use mjs_tiles::Seat;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Per-connection game session bookkeeping.
///
/// `action_id` and `current_turn` are written only by the router/machine
/// path and read by everyone else. The session is reset explicitly by the
/// embedder (`Client::teardown`), never by a rendering-engine callback.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub room: Option<String>,
    pub local_seat: Seat,
    pub current_turn: Relative,
    pub round: Round,
    pub action_id: ActionId,
    pub remaining: Seconds,
    /// Current player-turn phase, written only by the turn machine.
    pub phase: Phase,
    /// Offers currently open for the local seat, empty outside a decision
    /// window. The embedder reads these to render choice buttons.
    pub offers: Vec<ActionChoice>,
}

impl Session {
    /// Relative seat of an absolute seat, from the local player's view.
    pub fn relative(&self, seat: Seat) -> Relative {
        Relative::from((seat, self.local_seat))
    }
    /// Absolute seat for a viewer-relative position.
    pub fn absolute(&self, relative: Relative) -> Seat {
        Seat::from((relative, self.local_seat))
    }
    /// Return every field to its pre-game value.
    pub fn reset(&mut self) {
        *self = Session::default();
    }
}

/// Everything the components share: session bookkeeping plus table state.
#[derive(Debug, Default)]
pub struct Shared {
    pub session: Session,
    pub table: Table,
}

/// Single lock over the shared state. Mutation-queue operations hold it
/// only across actual mutations, never across presenter awaits.
pub type StateHandle = Arc<Mutex<Shared>>;
