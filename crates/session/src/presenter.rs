use mjs_tiles::CallBlock;
use mjs_tiles::Relative;
use mjs_tiles::Tile;
use std::sync::Arc;
use tokio::sync::Mutex;

/// An animated transition the presentation layer plays for a state change.
///
/// Seats are viewer-relative; hidden information (an opponent's drawn tile)
/// is simply absent.
#[derive(Debug, Clone)]
pub enum Mutation {
    /// Lay out the local player's initial thirteen tiles.
    Deal { tiles: Vec<Tile> },
    Draw {
        seat: Relative,
        tile: Option<Tile>,
    },
    Discard {
        seat: Relative,
        tile: Tile,
        is_tsumogiri: bool,
    },
    Meld {
        seat: Relative,
        block: CallBlock,
    },
    FlowerSwap {
        seat: Relative,
        flower: Tile,
        replacement: Option<Tile>,
    },
    Win {
        seat: Relative,
        winning: Tile,
    },
    /// Tear down and re-lay the whole table after a snapshot.
    Rebuild,
}

/// The presentation layer, as seen from the synchronization core.
///
/// `begin_mutation` resolves exactly once, when the transition has visually
/// settled. It must not itself mutate hand or call-block state; the core does
/// that before or after invoking it.
#[async_trait::async_trait]
pub trait Presenter: Send {
    async fn begin_mutation(&mut self, mutation: Mutation);
}

/// Shared handle so queue operations can borrow the presenter in turn.
pub type PresenterHandle = Arc<Mutex<dyn Presenter>>;

/// Presenter that settles every transition immediately. Used headless and
/// in tests.
pub struct Immediate;

#[async_trait::async_trait]
impl Presenter for Immediate {
    async fn begin_mutation(&mut self, _: Mutation) {}
}
