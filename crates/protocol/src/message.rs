use super::ActionChoice;
use mjs_core::ActionId;
use mjs_core::Count;
use mjs_core::Points;
use mjs_core::Round;
use mjs_core::Seconds;
use mjs_tiles::CallBlock;
use mjs_tiles::Seat;
use mjs_tiles::Tile;
use serde::Deserialize;
use serde::Serialize;

/// Messages sent from server to client over the persistent connection.
///
/// Wire shape is `{ "event": <tag>, "data": <fields> }`. Gameplay events
/// feed the turn machine in strict arrival order; session events are applied
/// inline by the router.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Initial connection confirmation with seat assignment.
    Joined { room: String, seat: Seat },
    /// Another player joined, left, or changed readiness.
    Peer {
        seat: Seat,
        name: String,
        present: bool,
        ready: bool,
    },
    /// Authoritative per-seat scores, in absolute seat order.
    Scores { scores: Vec<Points> },
    /// Advisory countdown tick for the acting seat.
    Timer { remaining: Seconds },
    /// Emoji broadcast from another seat.
    Emoji { seat: Seat, emoji: String },
    /// Generic acknowledgment of a client event.
    Ack { of: String },
    /// Generic server-side error report.
    Error { message: String },
    /// Terminal signal: the match is over. Stops reconnection for good.
    GameEnd { scores: Vec<Points> },

    /// A new round is starting.
    GameStart {
        round: Round,
        dealer: Seat,
        action_id: ActionId,
    },
    /// The local player's initial thirteen tiles plus per-seat hand counts
    /// in absolute seat order.
    Deal { tiles: Vec<Tile>, counts: Vec<Count> },
    /// A seat drew from the wall. `tile` is present only for the local seat.
    Draw {
        seat: Seat,
        tile: Option<Tile>,
        action_id: ActionId,
        wall: Count,
    },
    /// A seat discarded. `is_tsumogiri` marks a drawn-tile discard; the
    /// action id echoes the token the resolved request was tagged with.
    Discard {
        seat: Seat,
        tile: Tile,
        is_tsumogiri: bool,
        action_id: ActionId,
    },
    /// A seat exposed a call block (or promoted a Pung in place when the
    /// block kind is ExtendedKong).
    Meld {
        seat: Seat,
        block: CallBlock,
        action_id: ActionId,
    },
    /// A seat revealed a flower; `replacement` is present for the local seat.
    Flower {
        seat: Seat,
        flower: Tile,
        replacement: Option<Tile>,
    },
    /// Legal reactions to the discard just broadcast.
    DiscardOffers {
        choices: Vec<ActionChoice>,
        timeout: Seconds,
        action_id: ActionId,
    },
    /// Legal resolutions of the local player's own draw.
    DrawOffers {
        choices: Vec<ActionChoice>,
        timeout: Seconds,
        action_id: ActionId,
    },
    /// A seat won; carries the full revealed hand and score lines.
    Win {
        seat: Seat,
        tiles: Vec<Tile>,
        blocks: Vec<CallBlock>,
        winning: Tile,
        lines: Vec<ScoreLine>,
        scores: Vec<Points>,
    },
    /// The wall ran out with no winner.
    WallExhausted,
    /// Full-state reload replacing all incremental tracking.
    Snapshot(Snapshot),
}

/// One line of a win's score breakdown.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreLine {
    pub name: String,
    pub value: Points,
}

/// Authoritative table state for resynchronization.
///
/// Applying a snapshot atomically replaces every piece of local state it
/// covers; per-seat presentation state is rebuilt from counts, not deltas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub round: Round,
    pub turn: Seat,
    pub action_id: ActionId,
    pub remaining: Seconds,
    pub wall: Count,
    /// Per-seat public state in absolute seat order.
    pub seats: Vec<SeatSnapshot>,
    /// The local player's concealed tiles.
    pub hand: Vec<Tile>,
    pub drawn: Option<Tile>,
    /// Offers currently open for the local seat, if any.
    pub choices: Vec<ActionChoice>,
}

/// One seat's public state within a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeatSnapshot {
    pub seat: Seat,
    pub count: Count,
    pub blocks: Vec<CallBlock>,
    pub discards: Vec<Tile>,
    pub score: Points,
    pub flowers: Count,
}

impl ServerMessage {
    /// Static classification: gameplay events feed the turn machine, the
    /// rest is handled inline on the session path.
    pub fn is_gameplay(&self) -> bool {
        matches!(
            self,
            ServerMessage::GameStart { .. }
                | ServerMessage::Deal { .. }
                | ServerMessage::Draw { .. }
                | ServerMessage::Discard { .. }
                | ServerMessage::Meld { .. }
                | ServerMessage::Flower { .. }
                | ServerMessage::DiscardOffers { .. }
                | ServerMessage::DrawOffers { .. }
                | ServerMessage::Win { .. }
                | ServerMessage::WallExhausted
                | ServerMessage::Snapshot(_)
        )
    }
    /// True for the terminal end-of-game signal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ServerMessage::GameEnd { .. })
    }
}

impl std::fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ServerMessage::Joined { room, seat } => write!(f, "joined {} as {}", room, seat),
            ServerMessage::Draw { seat, wall, .. } => write!(f, "{} draws ({} left)", seat, wall),
            ServerMessage::Discard { seat, tile, .. } => write!(f, "{} discards {}", seat, tile),
            ServerMessage::Meld { seat, block, .. } => write!(f, "{} melds {}", seat, block),
            ServerMessage::Flower { seat, flower, .. } => write!(f, "{} flowers {}", seat, flower),
            ServerMessage::Win { seat, winning, .. } => write!(f, "{} wins on {}", seat, winning),
            ServerMessage::WallExhausted => write!(f, "wall exhausted"),
            ServerMessage::Snapshot(s) => write!(f, "snapshot (turn {})", s.turn),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Messages sent from client to server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Identify to the server right after the socket opens.
    Join { token: String, room: String },
    /// Scene is ready; also re-sent after every snapshot application.
    Ready,
    /// Discard a tile, tagged with the action id the decision was computed
    /// against.
    Discard {
        tile: Tile,
        is_tsumogiri: bool,
        action_id: ActionId,
    },
    /// Submit one of the server-provided choices.
    Choose {
        choice: ActionChoice,
        action_id: ActionId,
    },
    /// Request a full-state snapshot.
    Resync,
    /// Best-effort placeholder receipt for a frame that failed to decode.
    Ack { event: String },
    /// Emoji broadcast to the table.
    Emoji { emoji: String },
}

impl ClientMessage {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize client message")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gameplay_classification_is_static() {
        assert!(
            ServerMessage::Discard {
                seat: Seat::East,
                tile: Tile::Character(5),
                is_tsumogiri: false,
                action_id: 1,
            }
            .is_gameplay()
        );
        assert!(!ServerMessage::Timer { remaining: 10 }.is_gameplay());
        assert!(!ServerMessage::GameEnd { scores: vec![] }.is_gameplay());
        assert!(ServerMessage::WallExhausted.is_gameplay());
    }
    #[test]
    fn terminal_is_game_end_only() {
        assert!(ServerMessage::GameEnd { scores: vec![] }.is_terminal());
        assert!(!ServerMessage::WallExhausted.is_terminal());
    }
    #[test]
    fn client_message_wire_shape() {
        let json = ClientMessage::Discard {
            tile: Tile::Character(5),
            is_tsumogiri: true,
            action_id: 7,
        }
        .to_json();
        assert!(json.contains(r#""event":"discard""#));
        assert!(json.contains(r#""tile":"M5""#));
        assert!(json.contains(r#""action_id":7"#));
    }
    #[test]
    fn ready_has_no_data() {
        assert_eq!(ClientMessage::Ready.to_json(), r#"{"event":"ready"}"#);
    }
}
