use mjs_core::SEATS;
use serde::Deserialize;
use serde::Serialize;

/// Absolute seat at the table, one of four fixed ring positions assigned by
/// the server. Turn order proceeds East → South → West → North → East.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seat {
    #[default]
    East = 0,
    South = 1,
    West = 2,
    North = 3,
}

impl Seat {
    pub const ALL: [Seat; SEATS] = [Seat::East, Seat::South, Seat::West, Seat::North];

    /// The seat acting after this one in ring order.
    pub fn next(&self) -> Seat {
        Seat::from((u8::from(*self) + 1) % SEATS as u8)
    }
}

impl From<u8> for Seat {
    fn from(n: u8) -> Seat {
        match n {
            0 => Seat::East,
            1 => Seat::South,
            2 => Seat::West,
            3 => Seat::North,
            _ => panic!("invalid seat"),
        }
    }
}
impl From<Seat> for u8 {
    fn from(s: Seat) -> u8 {
        s as u8
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Seat::East => "E",
                Seat::South => "S",
                Seat::West => "W",
                Seat::North => "N",
            }
        )
    }
}

/// A seat expressed from the local player's perspective, in turn order:
/// the local player, the player acting next, the player across, and the
/// player acting just before.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relative {
    #[default]
    Own = 0,
    Next = 1,
    Across = 2,
    Prev = 3,
}

impl Relative {
    pub const ALL: [Relative; SEATS] = [
        Relative::Own,
        Relative::Next,
        Relative::Across,
        Relative::Prev,
    ];

    /// Index into per-seat arrays laid out in relative order.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl From<u8> for Relative {
    fn from(n: u8) -> Relative {
        match n {
            0 => Relative::Own,
            1 => Relative::Next,
            2 => Relative::Across,
            3 => Relative::Prev,
            _ => panic!("invalid relative seat"),
        }
    }
}

/// (absolute, local) → relative. Total over all seat pairs.
impl From<(Seat, Seat)> for Relative {
    fn from((seat, local): (Seat, Seat)) -> Self {
        let offset = (u8::from(seat) + SEATS as u8 - u8::from(local)) % SEATS as u8;
        Relative::from(offset)
    }
}

/// (relative, local) → absolute. Inverse of the mapping above.
impl From<(Relative, Seat)> for Seat {
    fn from((relative, local): (Relative, Seat)) -> Self {
        Seat::from((u8::from(local) + relative as u8) % SEATS as u8)
    }
}

impl std::fmt::Display for Relative {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Relative::Own => "own",
                Relative::Next => "next",
                Relative::Across => "across",
                Relative::Prev => "prev",
            }
        )
    }
}

impl mjs_core::Arbitrary for Seat {
    fn random() -> Self {
        Seat::from(rand::random_range(0..SEATS as u8))
    }
}
