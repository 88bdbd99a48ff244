use super::CallBlock;
use super::Tile;
use mjs_core::HAND_TILES;
use serde::Deserialize;
use serde::Serialize;

/// The local player's hand: an ordered multiset of concealed tiles, an
/// optional just-drawn tile held apart, and the exposed call blocks.
///
/// Only the mutation queue's current runner mutates a Hand; every other
/// component reads snapshots between queue operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    tiles: Vec<Tile>,
    drawn: Option<Tile>,
    blocks: Vec<CallBlock>,
}

impl Hand {
    /// Rebuild the hand wholesale, e.g. from a resynchronization snapshot.
    pub fn rebuild(tiles: Vec<Tile>, drawn: Option<Tile>, blocks: Vec<CallBlock>) -> Self {
        let mut hand = Self {
            tiles,
            drawn,
            blocks,
        };
        hand.tiles.sort();
        hand
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
    pub fn drawn(&self) -> Option<Tile> {
        self.drawn
    }
    pub fn blocks(&self) -> &[CallBlock] {
        &self.blocks
    }
    pub fn blocks_mut(&mut self) -> &mut Vec<CallBlock> {
        &mut self.blocks
    }

    /// Concealed tile count, drawn tile included.
    pub fn size(&self) -> usize {
        self.tiles.len() + self.drawn.iter().count()
    }
    /// True if the hand is at its settled size given its exposed blocks.
    pub fn is_settled(&self) -> bool {
        self.drawn.is_none() && self.tiles.len() + 3 * self.blocks.len() == HAND_TILES
    }

    /// Hold the drawn tile apart from the concealed tiles.
    pub fn draw(&mut self, tile: Tile) {
        debug_assert!(self.drawn.is_none(), "draw over an unresolved drawn tile");
        self.drawn = Some(tile);
    }
    /// Fold the drawn tile into the concealed tiles, e.g. after discarding
    /// a different tile or before a snapshot rebuild.
    pub fn settle(&mut self) {
        if let Some(tile) = self.drawn.take() {
            self.insert(tile);
        }
    }
    /// Take back the drawn tile without merging it, e.g. a flower headed
    /// for exchange.
    pub fn take_drawn(&mut self) -> Option<Tile> {
        self.drawn.take()
    }

    /// Remove one copy of `tile` for a discard. Prefers the drawn tile when
    /// `tsumogiri` is set. Returns false if the tile is not held.
    pub fn discard(&mut self, tile: Tile, tsumogiri: bool) -> bool {
        if tsumogiri && self.drawn == Some(tile) {
            self.drawn = None;
            return true;
        }
        match self.remove(tile) {
            true => {
                self.settle();
                true
            }
            false if self.drawn == Some(tile) => {
                self.drawn = None;
                true
            }
            false => false,
        }
    }

    /// Remove the tiles a new call block consumes from the concealed hand.
    /// The claimed tile itself came from another seat's discard and is not
    /// removed (concealed kongs consume all four copies from hand).
    pub fn expose(&mut self, block: &CallBlock) -> bool {
        let held: Vec<Tile> = block
            .tiles
            .iter()
            .enumerate()
            .filter(|(i, _)| block.kind == super::BlockKind::ConcealedKong || *i != block.claimed)
            .map(|(_, t)| *t)
            .collect();
        self.settle();
        let mut remaining = self.tiles.clone();
        for tile in &held {
            match remaining.iter().position(|t| t == tile) {
                Some(i) => {
                    remaining.remove(i);
                }
                None => return false,
            }
        }
        self.tiles = remaining;
        self.blocks.push(block.clone());
        true
    }

    fn insert(&mut self, tile: Tile) {
        let at = self.tiles.partition_point(|t| *t <= tile);
        self.tiles.insert(at, tile);
    }
    fn remove(&mut self, tile: Tile) -> bool {
        match self.tiles.iter().position(|t| *t == tile) {
            Some(i) => {
                self.tiles.remove(i);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let tiles = self
            .tiles
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        match self.drawn {
            Some(d) => write!(f, "{} +{}", tiles, d),
            None => write!(f, "{}", tiles),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlockKind;
    use crate::Seat;

    fn thirteen() -> Vec<Tile> {
        (0..13u8).map(Tile::from).collect()
    }

    #[test]
    fn settled_at_thirteen() {
        let hand = Hand::rebuild(thirteen(), None, vec![]);
        assert!(hand.is_settled());
        assert_eq!(hand.size(), 13);
    }
    #[test]
    fn draw_then_discard_other() {
        let mut hand = Hand::rebuild(thirteen(), None, vec![]);
        hand.draw(Tile::Dot(9));
        assert_eq!(hand.size(), 14);
        assert!(hand.discard(Tile::Character(1), false));
        assert!(hand.is_settled());
        // the drawn tile folded into the concealed tiles
        assert!(hand.tiles().contains(&Tile::Dot(9)));
    }
    #[test]
    fn tsumogiri_discards_drawn() {
        let mut hand = Hand::rebuild(thirteen(), None, vec![]);
        hand.draw(Tile::Dot(9));
        assert!(hand.discard(Tile::Dot(9), true));
        assert!(!hand.tiles().contains(&Tile::Dot(9)));
        assert!(hand.is_settled());
    }
    #[test]
    fn discard_unheld_tile_fails() {
        let mut hand = Hand::rebuild(thirteen(), None, vec![]);
        assert!(!hand.discard(Tile::Dragon(crate::Dragon::White), false));
        assert_eq!(hand.size(), 13);
    }
    #[test]
    fn expose_pung_consumes_two() {
        let mut tiles = thirteen();
        tiles[0] = Tile::Dot(5);
        tiles[1] = Tile::Dot(5);
        let mut hand = Hand::rebuild(tiles, None, vec![]);
        let block = CallBlock::new(BlockKind::Pung, vec![Tile::Dot(5); 3], Seat::West, 2);
        assert!(hand.expose(&block));
        assert_eq!(hand.tiles().len(), 11);
        assert_eq!(hand.blocks().len(), 1);
        // claiming leaves the hand one over its settled size until the
        // follow-up discard
        assert!(!hand.is_settled());
    }
    #[test]
    fn expose_needs_every_copy() {
        let mut tiles = thirteen();
        tiles[0] = Tile::Dot(5);
        let mut hand = Hand::rebuild(tiles, None, vec![]);
        let block = CallBlock::new(BlockKind::Pung, vec![Tile::Dot(5); 3], Seat::West, 2);
        // only one copy held, two required
        assert!(!hand.expose(&block));
        assert_eq!(hand.blocks().len(), 0);
        assert_eq!(hand.tiles().len(), 13);
    }
    #[test]
    fn insertion_keeps_order() {
        let mut hand = Hand::rebuild(vec![Tile::Character(1), Tile::Character(9)], None, vec![]);
        hand.draw(Tile::Character(5));
        hand.settle();
        assert_eq!(
            hand.tiles(),
            &[Tile::Character(1), Tile::Character(5), Tile::Character(9)]
        );
    }
}
