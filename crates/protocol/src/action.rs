use mjs_tiles::Tile;
use serde::Deserialize;
use serde::Serialize;

/// One legal move offered to the local player by the server.
///
/// Choices arrive in offer lists; the client may only ever submit a choice
/// that appeared in such a list. Reactions to another seat's discard are
/// Skip, Chow, Pung, ExposedKong, and Win; resolutions of the player's own
/// draw are SelfWin, ConcealedKong, ExtendedKong, and Flower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionChoice {
    Skip,
    /// Claim the discard into a sequence using these two hand tiles.
    Chow { tiles: [Tile; 2] },
    Pung,
    ExposedKong,
    ConcealedKong { tile: Tile },
    ExtendedKong { tile: Tile },
    /// Win on the discard.
    Win,
    /// Win on the drawn tile.
    SelfWin,
    /// Exchange the drawn flower for a replacement.
    Flower { tile: Tile },
}

impl ActionChoice {
    /// True for either winning action.
    pub fn is_win(&self) -> bool {
        matches!(self, ActionChoice::Win | ActionChoice::SelfWin)
    }
    /// True for a reaction that interrupts another seat's discard.
    pub fn is_interrupt(&self) -> bool {
        matches!(
            self,
            ActionChoice::Chow { .. } | ActionChoice::Pung | ActionChoice::ExposedKong
        )
    }
    /// True for a flower exchange.
    pub fn is_flower(&self) -> bool {
        matches!(self, ActionChoice::Flower { .. })
    }
    pub fn is_skip(&self) -> bool {
        matches!(self, ActionChoice::Skip)
    }
    /// Ranking used to pick a default when several choices are offered.
    /// Wins outrank quads outrank triplets outrank sequences.
    pub fn priority(&self) -> u8 {
        match self {
            ActionChoice::SelfWin => 8,
            ActionChoice::Win => 7,
            ActionChoice::ConcealedKong { .. } => 6,
            ActionChoice::ExtendedKong { .. } => 5,
            ActionChoice::ExposedKong => 4,
            ActionChoice::Pung => 3,
            ActionChoice::Chow { .. } => 2,
            ActionChoice::Flower { .. } => 1,
            ActionChoice::Skip => 0,
        }
    }
    /// The highest-priority choice in an offer list, ties resolved by offer
    /// order. Returns None for an empty list; never invents a choice.
    pub fn default_of(choices: &[ActionChoice]) -> Option<&ActionChoice> {
        choices.iter().fold(None, |best, c| match best {
            Some(b) if Self::priority(b) >= c.priority() => Some(b),
            _ => Some(c),
        })
    }
}

impl std::fmt::Display for ActionChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ActionChoice::Skip => write!(f, "SKIP"),
            ActionChoice::Chow { tiles } => write!(f, "CHOW {} {}", tiles[0], tiles[1]),
            ActionChoice::Pung => write!(f, "PUNG"),
            ActionChoice::ExposedKong => write!(f, "KONG"),
            ActionChoice::ConcealedKong { tile } => write!(f, "KONG* {}", tile),
            ActionChoice::ExtendedKong { tile } => write!(f, "KONG+ {}", tile),
            ActionChoice::Win => write!(f, "WIN"),
            ActionChoice::SelfWin => write!(f, "TSUMO"),
            ActionChoice::Flower { tile } => write!(f, "FLOWER {}", tile),
        }
    }
}
