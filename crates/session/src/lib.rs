//! Client-side session synchronization for a four-seat tile game.
//!
//! This crate keeps a local view of the table consistent with an
//! authoritative server over a long-lived socket, while an animation-driven
//! presentation layer consumes state changes one at a time.
//!
//! ## Architecture
//!
//! - [`Transport`] — owns the socket, hides reconnection from every consumer
//! - [`Router`] — classifies inbound messages as gameplay or session traffic
//! - [`MutationQueue`] — serializes animation-bearing state mutations
//! - [`Machine`] — the turn/action state machine and auto-resolution policy
//! - [`Resync`] — full-state snapshot application
//! - [`Client`] — constructs the component graph and is the embedder facade
//!
//! ## Interfaces
//!
//! - [`Presenter`] — awaitable animation hooks supplied by the embedder
//! - [`Connector`] / [`SocketTx`] / [`SocketRx`] — pluggable socket seam

mod client;
mod machine;
mod presenter;
mod queue;
mod resync;
mod router;
mod session;
mod table;
mod transport;

pub use client::*;
pub use machine::*;
pub use presenter::*;
pub use queue::*;
pub use resync::*;
pub use router::*;
pub use session::*;
pub use table::*;
pub use transport::*;
