use super::Seat;
use super::Tile;
use serde::Deserialize;
use serde::Serialize;

/// The shape of an exposed call block.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Claimed sequence of three suited tiles.
    Chow,
    /// Claimed triplet.
    Pung,
    /// Quad claimed from a discard.
    ExposedKong,
    /// Quad declared from a concealed hand.
    ConcealedKong,
    /// Quad formed by adding the drawn tile to an exposed Pung.
    ExtendedKong,
}

impl BlockKind {
    /// Tiles the block exposes on the table.
    pub fn width(&self) -> usize {
        match self {
            BlockKind::Chow | BlockKind::Pung => 3,
            _ => 4,
        }
    }
}

/// An exposed tile group with its provenance.
///
/// Immutable once created, with a single exception: an exposed Pung may be
/// promoted to an ExtendedKong in place when the owner draws the fourth tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallBlock {
    pub kind: BlockKind,
    pub tiles: Vec<Tile>,
    /// Seat the claimed tile came from (the owner itself for concealed kongs).
    pub from: Seat,
    /// Index of the claimed tile within `tiles`.
    pub claimed: usize,
}

impl CallBlock {
    pub fn new(kind: BlockKind, tiles: Vec<Tile>, from: Seat, claimed: usize) -> Self {
        Self {
            kind,
            tiles,
            from,
            claimed,
        }
    }
    /// The tile this block is made of, for claim matching. Chows are matched
    /// by their claimed tile instead.
    pub fn anchor(&self) -> Option<Tile> {
        match self.kind {
            BlockKind::Chow => self.tiles.get(self.claimed).copied(),
            _ => self.tiles.first().copied(),
        }
    }
    /// True if this is an exposed Pung of `tile`, eligible for promotion.
    pub fn upgradable(&self, tile: Tile) -> bool {
        self.kind == BlockKind::Pung && self.tiles.contains(&tile)
    }
    /// Promote an exposed Pung to an ExtendedKong in place.
    pub fn promote(&mut self, tile: Tile) -> anyhow::Result<()> {
        if !self.upgradable(tile) {
            anyhow::bail!("cannot promote {:?} with {}", self.kind, tile);
        }
        self.kind = BlockKind::ExtendedKong;
        self.tiles.push(tile);
        Ok(())
    }
}

impl std::fmt::Display for CallBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let tiles = self
            .tiles
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "[{:?}: {}]", self.kind, tiles)
    }
}
