use super::ClientMessage;
use super::ServerMessage;

/// Errors that can occur while decoding an inbound frame.
///
/// `Garbled` frames never held a valid envelope and are dropped at the
/// transport boundary. `Missing` frames carried a known event whose payload
/// failed typed decode; they signal that incremental state can no longer be
/// trusted and the session must resynchronize.
#[derive(Debug, Clone)]
pub enum ProtocolError {
    Garbled(String),
    Missing { event: String, detail: String },
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Garbled(s) => write!(f, "garbled frame: {}", s),
            Self::Missing { event, detail } => {
                write!(f, "bad payload for event {}: {}", event, detail)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// The raw frame envelope, before typed decode.
#[derive(Debug, serde::Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Outcome of decoding one inbound frame.
#[derive(Debug)]
pub enum Decoded {
    Message(ServerMessage),
    /// A well-formed frame for an event this client does not know.
    /// Skipped for forward compatibility.
    Unknown(String),
}

/// Handles the wire boundary: typed decode of server frames and encoding of
/// client messages.
pub struct Protocol;

impl Protocol {
    /// Event tags this client understands. A frame outside this set is
    /// skipped; a frame inside it must decode or it is a protocol error.
    const KNOWN: &'static [&'static str] = &[
        "joined",
        "peer",
        "scores",
        "timer",
        "emoji",
        "ack",
        "error",
        "game_end",
        "game_start",
        "deal",
        "draw",
        "discard",
        "meld",
        "flower",
        "discard_offers",
        "draw_offers",
        "win",
        "wall_exhausted",
        "snapshot",
    ];

    /// Decodes one inbound frame into a typed message.
    pub fn decode(text: &str) -> Result<Decoded, ProtocolError> {
        match serde_json::from_str::<ServerMessage>(text) {
            Ok(message) => Ok(Decoded::Message(message)),
            Err(detail) => match serde_json::from_str::<Frame>(text) {
                Err(_) => Err(ProtocolError::Garbled(text.chars().take(128).collect())),
                Ok(frame) if Self::KNOWN.contains(&frame.event.as_str()) => {
                    Err(ProtocolError::Missing {
                        event: frame.event,
                        detail: detail.to_string(),
                    })
                }
                Ok(frame) => Ok(Decoded::Unknown(frame.event)),
            },
        }
    }

    /// Encodes an outbound client message to its wire form.
    pub fn encode(message: &ClientMessage) -> String {
        message.to_json()
    }
}
