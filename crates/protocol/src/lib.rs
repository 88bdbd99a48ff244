//! Wire schema for the majsync session protocol.
//!
//! Every frame on the wire is `{ "event": <string>, "data": <object> }`.
//! Frames decode into tagged variants at the connection boundary: a missing
//! or malformed field is a typed [`ProtocolError`], never a latent null.
//!
//! - [`ServerMessage`] / [`ClientMessage`] — the full event vocabulary
//! - [`ActionChoice`] — one legal move offered to the local player
//! - [`Protocol`] — decode/encode and the gameplay/session classification

mod action;
mod frame;
mod message;

pub use action::*;
pub use frame::*;
pub use message::*;
