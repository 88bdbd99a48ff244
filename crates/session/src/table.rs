use mjs_core::Count;
use mjs_core::Points;
use mjs_core::SEATS;
use mjs_tiles::BlockKind;
use mjs_tiles::CallBlock;
use mjs_tiles::Hand;
use mjs_tiles::Relative;
use mjs_tiles::Tile;

/// The table as the local player sees it.
///
/// Per-seat arrays are laid out in relative order (`Relative::index`). The
/// local hand is tracked tile-by-tile; opponents are tracked as counts plus
/// their public discards and call blocks. Exclusively mutated by the
/// mutation queue's current runner.
#[derive(Debug, Default)]
pub struct Table {
    pub hand: Hand,
    pub counts: [Count; SEATS],
    pub piles: [Vec<Tile>; SEATS],
    pub blocks: [Vec<CallBlock>; SEATS],
    pub scores: [Points; SEATS],
    pub flowers: [Count; SEATS],
    pub wall: Count,
}

impl Table {
    pub fn reset(&mut self) {
        *self = Table::default();
    }

    /// Begin a round: the local thirteen tiles plus everyone's hand counts.
    pub fn deal(&mut self, tiles: Vec<Tile>, counts: [Count; SEATS]) {
        self.hand = Hand::rebuild(tiles, None, vec![]);
        self.counts = counts;
        self.piles.iter_mut().for_each(Vec::clear);
        self.blocks.iter_mut().for_each(Vec::clear);
        self.flowers = [0; SEATS];
    }

    /// A seat drew from the wall.
    pub fn draw(&mut self, seat: Relative, tile: Option<Tile>, wall: Count) {
        self.wall = wall;
        match (seat, tile) {
            (Relative::Own, Some(tile)) => self.hand.draw(tile),
            (Relative::Own, None) => log::warn!("[table] own draw without a tile"),
            (other, _) => self.counts[other.index()] += 1,
        }
    }

    /// A seat discarded onto its pile.
    pub fn discard(&mut self, seat: Relative, tile: Tile, is_tsumogiri: bool) -> anyhow::Result<()> {
        match seat {
            Relative::Own => {
                if !self.hand.discard(tile, is_tsumogiri) {
                    anyhow::bail!("discard of unheld tile {}", tile);
                }
            }
            other => self.counts[other.index()] = self.counts[other.index()].saturating_sub(1),
        }
        self.piles[seat.index()].push(tile);
        Ok(())
    }

    /// A seat exposed a call block; the claimed tile leaves the source
    /// seat's pile. An ExtendedKong promotes the seat's matching Pung in
    /// place instead of adding a new block.
    pub fn meld(&mut self, seat: Relative, from: Relative, block: CallBlock) -> anyhow::Result<()> {
        if block.kind == BlockKind::ExtendedKong {
            return self.extend(seat, block);
        }
        if from != seat && block.kind != BlockKind::ConcealedKong {
            match self.piles[from.index()].pop() {
                Some(_) => (),
                None => log::warn!("[table] claim from an empty pile"),
            }
        }
        let held = match block.kind {
            BlockKind::ConcealedKong => 4,
            _ if from == seat => block.kind.width(),
            _ => block.kind.width() - 1,
        };
        match seat {
            Relative::Own => {
                if !self.hand.expose(&block) {
                    anyhow::bail!("call block {} not covered by hand", block);
                }
            }
            other => {
                self.counts[other.index()] =
                    self.counts[other.index()].saturating_sub(held as Count);
                self.blocks[other.index()].push(block);
            }
        }
        Ok(())
    }

    /// A drawn flower was revealed and replaced.
    pub fn flower(&mut self, seat: Relative, flower: Tile, replacement: Option<Tile>) {
        self.flowers[seat.index()] += 1;
        if seat == Relative::Own {
            match self.hand.take_drawn() {
                Some(t) if t == flower => (),
                Some(t) => log::warn!("[table] flower {} but drawn tile was {}", flower, t),
                None => log::warn!("[table] flower {} with no drawn tile", flower),
            }
            if let Some(tile) = replacement {
                self.hand.draw(tile);
            }
        }
    }

    /// Replace per-seat scores wholesale, in relative order.
    pub fn set_scores(&mut self, scores: [Points; SEATS]) {
        self.scores = scores;
    }

    /// The exposed blocks of a seat, the local player's included.
    pub fn blocks_of(&self, seat: Relative) -> &[CallBlock] {
        match seat {
            Relative::Own => self.hand.blocks(),
            other => &self.blocks[other.index()],
        }
    }

    /// Visible hand size of a seat.
    pub fn count_of(&self, seat: Relative) -> usize {
        match seat {
            Relative::Own => self.hand.size(),
            other => self.counts[other.index()] as usize,
        }
    }

    fn extend(&mut self, seat: Relative, block: CallBlock) -> anyhow::Result<()> {
        let tile = block
            .tiles
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("empty extended kong"))?;
        let blocks = match seat {
            Relative::Own => self.hand.blocks_mut(),
            other => &mut self.blocks[other.index()],
        };
        let pung = blocks
            .iter_mut()
            .find(|b| b.upgradable(tile))
            .ok_or_else(|| anyhow::anyhow!("no pung of {} to extend", tile))?;
        pung.promote(tile)?;
        if seat == Relative::Own {
            self.hand.discard(tile, true);
        } else {
            self.counts[seat.index()] = self.counts[seat.index()].saturating_sub(1);
        }
        Ok(())
    }
}
